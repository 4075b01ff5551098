//! Native evaluation of the page scripts over a parsed document.
//!
//! These follow the same rules as the JavaScript in [`crate::scripts`]; the
//! HTTP surface runs these because it has no script engine.

use scout_core::site::{MAX_RESULTS, NOT_FOUND, SLOW_LINK_MARKER};
use scout_core::SearchResult;
use scraper::{ElementRef, Html, Selector};
use url::Url;

pub const RESULTS_CONTAINER_SELECTOR: &str = "#aarecord-list";
pub const COVER_ID_PREFIX: &str = "list_cover_aarecord_id__md5:";
pub const DOWNLOAD_BUTTON_SELECTOR: &str = "p.mb-4.text-xl.font-bold a";
pub const COUNTDOWN_SELECTOR: &str = "span.js-partner-countdown";
pub const CDN_MARKERS: &[&str] = &["cdn", "/d3/"];
pub const DOWNLOAD_KEYWORDS: &[&str] = &["download", ".zip", ".epub", ".pdf", ".mobi"];

/// Query parameters, in order, that carry the record identifier on a gated page.
const IDENTIFIER_PARAMS: &[&str] = &["md5", "id"];
/// Path segments whose successor is the record identifier.
const IDENTIFIER_PATH_MARKERS: &[&str] = &[SLOW_LINK_MARKER, "md5"];

/// Which rule of the discovery chain produced a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryRule {
    DownloadButton,
    CdnIdentifier,
    Keyword,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub url: String,
    pub rule: DiscoveryRule,
}

pub fn extract_initial_results(html: &str, page_url: &str) -> Vec<SearchResult> {
    let doc = Html::parse_document(html);
    let base = Url::parse(page_url).ok();
    let (Some(container_sel), Some(link_sel), Some(title_sel), Some(img_sel)) = (
        selector(RESULTS_CONTAINER_SELECTOR),
        selector("a"),
        selector("h3"),
        selector("img"),
    ) else {
        return Vec::new();
    };
    let Some(container) = doc.select(&container_sel).next() else {
        return Vec::new();
    };

    container
        .select(&link_sel)
        .take(MAX_RESULTS)
        .map(|item| {
            let title = item
                .select(&title_sel)
                .next()
                .map(visible_text)
                .unwrap_or_else(|| visible_text(item));
            let url = item
                .value()
                .attr("href")
                .and_then(|href| resolve_url(href, base.as_ref()))
                .unwrap_or_default();
            let image = item
                .descendants()
                .filter_map(ElementRef::wrap)
                .find(|el| {
                    el.value().name() == "div"
                        && el
                            .value()
                            .id()
                            .is_some_and(|id| id.starts_with(COVER_ID_PREFIX))
                })
                .and_then(|cover| cover.select(&img_sel).next())
                .and_then(|img| img.value().attr("src"))
                .and_then(|src| resolve_url(src, base.as_ref()));
            SearchResult {
                title,
                url,
                image,
                slow_link: None,
            }
        })
        .collect()
}

/// First slow download link on a detail page, or the not-found marker.
pub fn extract_slow_link(html: &str, page_url: &str) -> String {
    let doc = Html::parse_document(html);
    let base = Url::parse(page_url).ok();
    links(&doc, base.as_ref())
        .into_iter()
        .find(|link| link.contains(SLOW_LINK_MARKER))
        .unwrap_or_else(|| NOT_FOUND.to_string())
}

/// One tick of the discovery chain: download button, then CDN link carrying
/// the page's identifier, then any keyword link. First match wins.
pub fn discover_download_link(html: &str, page_url: &str) -> Option<Discovery> {
    let doc = Html::parse_document(html);
    let base = Url::parse(page_url).ok();

    if let Some(url) = selector(DOWNLOAD_BUTTON_SELECTOR)
        .and_then(|sel| doc.select(&sel).next())
        .and_then(|button| button.value().attr("href"))
        .and_then(|href| resolve_url(href, base.as_ref()))
    {
        return Some(Discovery {
            url,
            rule: DiscoveryRule::DownloadButton,
        });
    }

    if let Some(identifier) = page_identifier(page_url) {
        let identifier = identifier.to_ascii_lowercase();
        if let Some(url) = links(&doc, base.as_ref()).into_iter().find(|link| {
            let lower = link.to_ascii_lowercase();
            lower.contains(&identifier) && CDN_MARKERS.iter().any(|m| lower.contains(m))
        }) {
            return Some(Discovery {
                url,
                rule: DiscoveryRule::CdnIdentifier,
            });
        }
    }

    links(&doc, base.as_ref())
        .into_iter()
        .find(|link| {
            let lower = link.to_ascii_lowercase();
            DOWNLOAD_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .map(|url| Discovery {
            url,
            rule: DiscoveryRule::Keyword,
        })
}

/// Countdown text exactly as rendered, not parsed.
pub fn find_countdown(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let sel = selector(COUNTDOWN_SELECTOR)?;
    doc.select(&sel).next().map(visible_text)
}

/// Record identifier of a gated page: a known query parameter, else the path
/// segment after a known marker.
pub fn page_identifier(page_url: &str) -> Option<String> {
    let url = Url::parse(page_url).ok()?;
    for name in IDENTIFIER_PARAMS {
        if let Some((_, value)) = url.query_pairs().find(|(key, _)| key.as_ref() == *name) {
            if !value.is_empty() {
                return Some(value.into_owned());
            }
        }
    }

    let segments: Vec<&str> = url.path_segments()?.collect();
    segments
        .windows(2)
        .find(|pair| IDENTIFIER_PATH_MARKERS.contains(&pair[0]) && !pair[1].is_empty())
        .map(|pair| pair[1].to_string())
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Resolved hrefs of every usable anchor, in document order.
fn links(doc: &Html, base: Option<&Url>) -> Vec<String> {
    let Some(sel) = selector("a[href]") else {
        return Vec::new();
    };
    doc.select(&sel)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_url(href, base))
        .collect()
}

fn visible_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn resolve_url(reference: &str, base: Option<&Url>) -> Option<String> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url.into());
    }
    base.and_then(|base| base.join(trimmed).ok()).map(Into::into)
}

#[cfg(test)]
mod tests {
    use super::{page_identifier, resolve_url};
    use url::Url;

    #[test]
    fn identifier_prefers_query_parameter() {
        assert_eq!(
            page_identifier("https://x.test/slow_download/aaa/0/2?md5=bbb"),
            Some("bbb".to_string())
        );
    }

    #[test]
    fn identifier_falls_back_to_path_segment() {
        assert_eq!(
            page_identifier("https://x.test/slow_download/aaa/0/2"),
            Some("aaa".to_string())
        );
        assert_eq!(
            page_identifier("https://x.test/md5/ccc"),
            Some("ccc".to_string())
        );
        assert_eq!(page_identifier("https://x.test/about"), None);
    }

    #[test]
    fn fragment_and_script_links_are_skipped() {
        let base = Url::parse("https://x.test/a/").unwrap();
        assert_eq!(resolve_url("#top", Some(&base)), None);
        assert_eq!(resolve_url("javascript:void(0)", Some(&base)), None);
        assert_eq!(
            resolve_url("../b.pdf", Some(&base)),
            Some("https://x.test/b.pdf".to_string())
        );
    }
}
