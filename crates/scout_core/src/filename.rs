use url::Url;

pub const FALLBACK_FILE_NAME: &str = "download";

const MAX_FILE_NAME_LEN: usize = 120;

/// File name for a download: last path segment, query and fragment dropped,
/// made safe for common filesystems. Falls back to [`FALLBACK_FILE_NAME`].
pub fn download_file_name(url: &str) -> String {
    let segment = match Url::parse(url.trim()) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_string(),
        Err(_) => raw_last_segment(url),
    };
    sanitize(&segment)
}

fn raw_last_segment(url: &str) -> String {
    let without_query = url
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    without_query
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn sanitize(input: &str) -> String {
    let replaced: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();

    // Collapse runs of underscores
    let mut compacted = String::with_capacity(replaced.len());
    let mut prev_underscore = false;
    for c in replaced.chars() {
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }

    let mut name = compacted.trim_matches(&['_', ' ', '.'][..]).to_string();
    if name.len() > MAX_FILE_NAME_LEN {
        let mut end = MAX_FILE_NAME_LEN;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        name.truncate(end);
    }
    if name.is_empty() {
        return FALLBACK_FILE_NAME.to_string();
    }
    if is_reserved_windows_name(&name) {
        name.push('_');
    }
    name
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::{download_file_name, FALLBACK_FILE_NAME};

    #[test]
    fn takes_last_segment_without_query() {
        assert_eq!(download_file_name("https://x.test/a/b/file.pdf?tok=1"), "file.pdf");
    }

    #[test]
    fn no_path_segment_falls_back() {
        assert_eq!(download_file_name("https://x.test"), FALLBACK_FILE_NAME);
        assert_eq!(download_file_name("https://x.test/dir/"), FALLBACK_FILE_NAME);
    }

    #[test]
    fn unparseable_url_still_yields_segment() {
        assert_eq!(download_file_name("cdn/path/book.epub#frag"), "book.epub");
        assert_eq!(download_file_name(""), FALLBACK_FILE_NAME);
    }

    #[test]
    fn forbidden_characters_are_replaced() {
        assert_eq!(
            download_file_name("https://x.test/a/what%3Cis%3E%20this.mobi"),
            "what%3Cis%3E%20this.mobi"
        );
        assert_eq!(download_file_name("x/a:b*c.zip"), "a_b_c.zip");
    }

    #[test]
    fn reserved_names_are_suffixed() {
        assert_eq!(download_file_name("https://x.test/con"), "con_");
    }

    #[test]
    fn long_names_are_truncated_on_char_boundary() {
        let long = "é".repeat(100);
        let name = download_file_name(&format!("https://x.test/{long}"));
        assert!(name.len() <= 120);
        assert!(!name.is_empty());
    }
}
