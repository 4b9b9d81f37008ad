//! Utility functions and helpers.

pub mod http;
pub mod text;

use std::sync::LazyLock;

use url::Url;

static SEGMENT_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("http://localhost/").unwrap());

/// Extract the host from a URL string.
pub fn get_domain(url_str: &str) -> Option<String> {
    Url::parse(url_str)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_string()))
}

/// Percent-encode a single URL path segment.
///
/// Uses the URL path-segment set: space, `/`, `%`, `?`, `#` and non-ASCII
/// characters are encoded as UTF-8 bytes.
pub fn encode_path_segment(segment: &str) -> String {
    let mut url = SEGMENT_BASE.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(segment);
    }
    url.path().trim_start_matches('/').to_string()
}
