// src/utils/text.rs

//! Text cleanup helpers shared by normalization and page rescans.

use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NON_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());

/// Ellipsis marker appended to truncated summaries.
pub const ELLIPSIS: char = '…';

/// Fallback slug body for titles with no usable characters.
pub const EMPTY_SLUG: &str = "post";

/// Turn an HTML fragment into a single line of plain text.
///
/// Tags become a space, entities are decoded, whitespace runs collapse.
pub fn strip_tags(html: &str) -> String {
    let text = TAG_RE.replace_all(html, " ");
    let text = html_escape::decode_html_entities(&text);
    WS_RE.replace_all(&text, " ").trim().to_string()
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `…`.
///
/// Text already within the limit is returned unchanged.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => {
            let mut out = text[..cut].trim_end().to_string();
            out.push(ELLIPSIS);
            out
        }
    }
}

/// Plain-text summary of an HTML body, at most `max_chars` long (plus marker).
pub fn summarize(html: &str, max_chars: usize) -> String {
    truncate_chars(&strip_tags(html), max_chars)
}

/// Filename-safe form of a title.
///
/// Drops everything except word characters, whitespace and hyphens, turns
/// whitespace runs into a single `-` and trims hyphens from both ends.
pub fn slugify(title: &str) -> String {
    let kept = NON_SLUG_RE.replace_all(title, "");
    let dashed = WS_RE.replace_all(&kept, "-");
    let slug = dashed.trim_matches('-');
    if slug.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// Escape text for HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    html_escape::encode_quoted_attribute(text).into_owned()
}
