// src/services/normalizer.rs

//! Entry normalization.
//!
//! Turns a raw [`FeedEntry`] into a [`NormalizedPost`]. Never fails: every
//! missing or malformed field has a fallback.

use chrono::{DateTime, FixedOffset, Utc};

use crate::models::{FeedEntry, NormalizedPost, SourceLabel};
use crate::utils::text::{slugify, summarize};

/// Title used when the feed entry has none.
pub const NO_TITLE: &str = "(제목 없음)";

/// Summary and body used when the feed entry has no body at all.
pub const NO_SUMMARY: &str = "(요약 없음)";

/// Link used when the feed entry has none.
const NO_LINK: &str = "#";

/// Normalizes entries against a fixed "now" and summary length.
#[derive(Debug, Clone)]
pub struct Normalizer {
    summary_len: usize,
    now: DateTime<Utc>,
}

impl Normalizer {
    pub fn new(summary_len: usize, now: DateTime<Utc>) -> Self {
        Self { summary_len, now }
    }

    /// Build the normalized post for one entry.
    pub fn normalize(&self, entry: &FeedEntry) -> NormalizedPost {
        let title = entry.title.clone().unwrap_or_else(|| NO_TITLE.to_string());
        let link = entry.link.as_deref().unwrap_or(NO_LINK);

        // Classification decides whether the link gets rewritten.
        let source = SourceLabel::classify(link);
        let outbound_link = source.outbound_link(link);

        let published_at = self.resolve_timestamp(entry);
        let slug = format!(
            "{}-{}-{}",
            published_at.format("%Y%m%d"),
            source.label(),
            slugify(&title)
        );

        let (short_summary, detail_body) = match entry.body() {
            Some(html) => (summarize(html, self.summary_len), html.to_string()),
            None => (NO_SUMMARY.to_string(), NO_SUMMARY.to_string()),
        };

        NormalizedPost {
            published_at,
            source,
            title,
            slug,
            short_summary,
            detail_body,
            outbound_link,
        }
    }

    /// Best-effort publish time.
    ///
    /// Order: structured published, updated, created; then the textual
    /// published and updated dates; then the run's "now".
    pub fn resolve_timestamp(&self, entry: &FeedEntry) -> DateTime<FixedOffset> {
        if let Some(ts) = entry.published.or(entry.updated).or(entry.created) {
            return ts.fixed_offset();
        }
        [&entry.published_text, &entry.updated_text]
            .into_iter()
            .flatten()
            .find_map(|text| parse_date_text(text))
            .unwrap_or_else(|| {
                log::debug!("No usable timestamp for {:?}, using now", entry.title);
                self.now.fixed_offset()
            })
    }
}

/// Parse an RFC 2822 date (RSS `pubDate`), falling back to RFC 3339.
fn parse_date_text(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(text)
        .or_else(|_| DateTime::parse_from_rfc3339(text))
        .ok()
}
