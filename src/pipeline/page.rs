// src/pipeline/page.rs

//! HTML page rendering and the matching read-back parser.
//!
//! Detail pages are also the generator's history: a later run may rebuild
//! the index from them. The markers below are the only contract between
//! [`render_detail`] and [`parse_detail`], so both live here.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{IndexCard, NormalizedPost, SiteConfig};
use crate::services::NO_TITLE;
use crate::utils::text::{escape_html, strip_tags, summarize};

/// Opening tag of the detail body container.
pub const SUMMARY_OPEN: &str = r#"<div class="summary">"#;
/// Closing marker of the detail body container.
pub const SUMMARY_CLOSE: &str = "</div><!-- /summary -->";

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title>(.*?)</title>").unwrap());
static LEGACY_SUMMARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<div class="summary">(.*?)</div>"#).unwrap());
static FILE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{8})-([^-]+)-(.+)\.html$").unwrap());

/// Parts of a detail page file name: `YYYYMMDD-<source>-<slug>.html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageName {
    pub ymd: String,
    pub source: String,
    pub slug: String,
}

impl PageName {
    /// Parse a file name, `None` if it doesn't follow the page naming scheme.
    pub fn parse(file_name: &str) -> Option<Self> {
        let caps = FILE_NAME_RE.captures(file_name)?;
        Some(Self {
            ymd: caps[1].to_string(),
            source: caps[2].to_string(),
            slug: caps[3].to_string(),
        })
    }

    /// `YYYY-MM-DD`
    pub fn display_date(&self) -> String {
        format!("{}-{}-{}", &self.ymd[..4], &self.ymd[4..6], &self.ymd[6..])
    }
}

/// Render the standalone page for one post.
///
/// The body is embedded verbatim; everything else is escaped.
pub fn render_detail(post: &NormalizedPost) -> String {
    let title = escape_html(&post.title);
    let source = post.source.label();
    let date = post.display_date();
    let link = escape_html(&post.outbound_link);
    let body = &post.detail_body;

    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
  <meta charset="UTF-8">
  <title>{title}</title>
  <meta name="robots" content="index,follow">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <style>
    body {{ font-family: system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial, sans-serif; max-width: 800px; margin: auto; padding: 2em; }}
    .title {{ font-size: 1.8em; font-weight: 800; margin-bottom: 0.5em; }}
    .meta {{ color: #777; margin-bottom: 1em; }}
    .summary {{ font-size: 1em; color: #333; margin-bottom: 2em; }}
    .badge {{ display:inline-block; font-size: 0.85em; padding: 2px 8px; border-radius: 999px; background:#eef; margin-right:8px; }}
    .summary img {{ max-width: 100%; height: auto; }}
    a.button {{ background: #0077cc; color: white; padding: 0.6em 1em; text-decoration: none; border-radius: 6px; }}
    a.button:hover {{ background: #005fa3; }}
  </style>
</head>
<body>
  <div class="title">{title}</div>
  <div class="meta"><span class="badge">{source}</span>🗓 {date}</div>
  {SUMMARY_OPEN}{body}{SUMMARY_CLOSE}
  <a class="button" href="{link}" target="_blank" rel="noopener">{source} 블로그에서 전체 글 보기</a>
</body>
</html>
"#
    )
}

/// Recover an index card from a previously rendered detail page.
///
/// Returns `None` when the file name doesn't follow the page scheme.
/// Pages from older runs lack [`SUMMARY_CLOSE`]; for those the body ends
/// at the first `</div>`.
pub fn parse_detail(file_name: &str, html: &str, summary_len: usize) -> Option<IndexCard> {
    let name = PageName::parse(file_name)?;

    let title = TITLE_RE
        .captures(html)
        .map(|caps| strip_tags(&caps[1]))
        .unwrap_or_else(|| NO_TITLE.to_string());

    let body = extract_body(html).unwrap_or_default();

    Some(IndexCard {
        date: name.display_date(),
        source: name.source,
        title,
        file_name: file_name.to_string(),
        short_summary: summarize(body, summary_len),
    })
}

fn extract_body(html: &str) -> Option<&str> {
    if let Some(start) = html.find(SUMMARY_OPEN) {
        let rest = &html[start + SUMMARY_OPEN.len()..];
        if let Some(end) = rest.find(SUMMARY_CLOSE) {
            return Some(&rest[..end]);
        }
    }
    LEGACY_SUMMARY_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Render the index page listing every card in order.
pub fn render_index(site: &SiteConfig, cards: &[IndexCard]) -> String {
    let site_title = escape_html(&site.title);
    let description = escape_html(&site.description);

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
  <meta charset="UTF-8">
  <title>{site_title}</title>
  <meta name="description" content="{description}">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <style>
    body {{ font-family: system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial, sans-serif; background: #f9f9f9; padding: 2em; max-width: 900px; margin: auto; }}
    .card {{ background: white; padding: 1.5em; margin-bottom: 1.5em; border-radius: 12px; box-shadow: 0 4px 10px rgba(0,0,0,0.05); }}
    .card-title {{ font-size: 1.3em; font-weight: 700; margin-bottom: 0.5em; }}
    .card-title a {{ color: #111; text-decoration: none; }}
    .card-date {{ color: #888; font-size: 0.9em; margin-bottom: 0.6em; }}
    .badge {{ display:inline-block; font-size: 0.8em; padding: 2px 8px; border-radius: 999px; background:#eef; margin-right:8px; }}
    .card-summary {{ font-size: 1em; color: #333; margin-bottom: 1em; }}
    .card-link a {{ background: #0077cc; color: white; padding: 0.5em 1em; text-decoration: none; border-radius: 6px; font-size: 0.95em; }}
    .card-link a:hover {{ background: #005fa3; }}
  </style>
</head>
<body>
  <h1>{site_title}</h1>
"#
    );

    for card in cards {
        html.push_str(&render_card(card));
    }

    html.push_str("</body></html>");
    html
}

/// Render one index card fragment.
pub fn render_card(card: &IndexCard) -> String {
    let source = escape_html(&card.source);
    let href = escape_html(&card.href());
    let title = escape_html(&card.title);
    let date = escape_html(&card.date);
    let summary = escape_html(&card.short_summary);

    format!(
        r#"
  <div class="card">
    <div class="card-title"><span class="badge">{source}</span><a href="{href}">{title}</a></div>
    <div class="card-date">🗓 {date}</div>
    <div class="card-summary">{summary}</div>
    <div class="card-link">
      <a href="{href}">상세 보기</a>
    </div>
  </div>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceLabel;
    use chrono::DateTime;

    fn post(title: &str, body: &str) -> NormalizedPost {
        NormalizedPost {
            published_at: DateTime::parse_from_rfc3339("2024-03-01T00:00:00Z").unwrap(),
            source: SourceLabel::Naver,
            title: title.to_string(),
            slug: format!("20240301-네이버-{}", crate::utils::text::slugify(title)),
            short_summary: summarize(body, 160),
            detail_body: body.to_string(),
            outbound_link: "https://m.blog.naver.com/abc/123".to_string(),
        }
    }

    #[test]
    fn page_name_parsing() {
        let name = PageName::parse("20240301-네이버-Hello-World.html").unwrap();
        assert_eq!(name.ymd, "20240301");
        assert_eq!(name.source, "네이버");
        assert_eq!(name.slug, "Hello-World");
        assert_eq!(name.display_date(), "2024-03-01");

        assert!(PageName::parse("index.html").is_none());
        assert!(PageName::parse("2024031-네이버-x.html").is_none());
        assert!(PageName::parse("20240301-네이버-x.html.tmp").is_none());
        assert!(PageName::parse("20240301-네이버-.html").is_none());
        assert!(PageName::parse("२०२४०३०१-네이버-x.html").is_none());
    }

    #[test]
    fn detail_embeds_body_verbatim_and_escapes_title() {
        let html = render_detail(&post("A <b> & \"C\"", "<p>Test <i>post</i></p>"));
        assert!(html.contains("<p>Test <i>post</i></p>"));
        assert!(html.contains("<title>A &lt;b&gt; &amp; &quot;C&quot;</title>"));
        assert!(html.contains(r#"href="https://m.blog.naver.com/abc/123""#));
        assert!(html.contains("🗓 2024-03-01"));
    }

    #[test]
    fn rendered_detail_parses_back_to_same_card() {
        let original = post("Hello & <World>", "<div><p>nested</p></div> tail");
        let html = render_detail(&original);

        let card = parse_detail(&original.file_name(), &html, 160).unwrap();
        assert_eq!(card, IndexCard::from(&original));
    }

    #[test]
    fn legacy_pages_without_close_marker_still_parse() {
        let html = r#"<html><head><title>옛 글 &amp; 기록</title></head>
<body><div class="summary"><p>legacy body</p></div>
<a class="button" href="x">go</a></body></html>"#;
        let card = parse_detail("20230105-티스토리-옛-글.html", html, 160).unwrap();
        assert_eq!(card.title, "옛 글 & 기록");
        assert_eq!(card.source, "티스토리");
        assert_eq!(card.date, "2023-01-05");
        assert_eq!(card.short_summary, "legacy body");
        assert_eq!(card.href(), "posts/20230105-티스토리-옛-글.html");
    }

    #[test]
    fn page_without_markers_gets_placeholders() {
        let card = parse_detail("20230105-기타-x.html", "<html></html>", 160).unwrap();
        assert_eq!(card.title, NO_TITLE);
        assert_eq!(card.short_summary, "");
    }

    #[test]
    fn index_lists_cards_in_given_order() {
        let a = IndexCard::from(&post("First", "<p>one</p>"));
        let mut b = IndexCard::from(&post("Second", "<p>two</p>"));
        b.file_name = "20240201-네이버-Second.html".into();

        let html = render_index(&SiteConfig::default(), &[a, b]);
        let first = html.find("First").unwrap();
        let second = html.find("Second").unwrap();
        assert!(first < second);
        assert_eq!(html.matches(r#"<div class="card">"#).count(), 2);
        assert!(html.contains(r#"href="posts/20240301-네이버-First.html""#));
        assert!(html.ends_with("</body></html>"));
    }
}
