//! Site-owned constants and URL shapes.

pub const DEFAULT_BASE_URL: &str = "https://annas-archive.org";

/// The search page never lists more than this many records per page.
pub const MAX_RESULTS: usize = 10;

/// Terminal value for a result whose detail page has no slow download link.
pub const NOT_FOUND: &str = "Not found";

/// Substring identifying the free/slow download path in a detail page link.
pub const SLOW_LINK_MARKER: &str = "slow_download";

/// Search-results page for `query`. Spaces become `+`.
pub fn search_url(base_url: &str, query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.trim().as_bytes()).collect();
    format!("{}/search?q={}", base_url.trim_end_matches('/'), encoded)
}

#[cfg(test)]
mod tests {
    use super::search_url;

    #[test]
    fn spaces_become_plus() {
        assert_eq!(
            search_url("https://site.test", "rust for rustaceans"),
            "https://site.test/search?q=rust+for+rustaceans"
        );
    }

    #[test]
    fn trailing_slash_and_padding_are_dropped() {
        assert_eq!(
            search_url("https://site.test/", "  foo "),
            "https://site.test/search?q=foo"
        );
    }

    #[test]
    fn reserved_characters_are_escaped() {
        assert_eq!(
            search_url("https://site.test", "c&c"),
            "https://site.test/search?q=c%26c"
        );
    }
}
