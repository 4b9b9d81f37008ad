//! Normalized post and its index-card projection.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::models::SourceLabel;
use crate::utils::encode_path_segment;

/// Directory (relative to the site root) holding detail pages.
pub const POSTS_DIR: &str = "posts";

/// A feed entry with every field resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPost {
    pub published_at: DateTime<FixedOffset>,
    pub source: SourceLabel,
    /// Unescaped title text
    pub title: String,
    /// `YYYYMMDD-<source>-<title slug>`
    pub slug: String,
    /// Plain text, truncated
    pub short_summary: String,
    /// Original body HTML, embedded verbatim
    pub detail_body: String,
    pub outbound_link: String,
}

impl NormalizedPost {
    pub fn file_name(&self) -> String {
        format!("{}.html", self.slug)
    }

    /// Site-relative key of the detail page.
    pub fn page_key(&self) -> String {
        format!("{POSTS_DIR}/{}", self.file_name())
    }

    /// Date shown on pages (`YYYY-MM-DD`).
    pub fn display_date(&self) -> String {
        self.published_at.format("%Y-%m-%d").to_string()
    }
}

/// Everything the index page needs about one post.
///
/// Built either from a freshly normalized post or by reading back a
/// rendered detail page, so it carries plain strings only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexCard {
    /// Badge text (source label)
    pub source: String,
    /// Unescaped title text
    pub title: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// Detail page file name inside `posts/`
    pub file_name: String,
    /// Plain text summary
    pub short_summary: String,
}

impl IndexCard {
    /// Link from the index page to the detail page.
    pub fn href(&self) -> String {
        format!("{POSTS_DIR}/{}", self.file_name)
    }

    /// Absolute, percent-encoded URL of the detail page.
    pub fn absolute_url(&self, base_url: &str) -> String {
        format!(
            "{}/{POSTS_DIR}/{}",
            base_url.trim_end_matches('/'),
            encode_path_segment(&self.file_name)
        )
    }
}

impl From<&NormalizedPost> for IndexCard {
    fn from(post: &NormalizedPost) -> Self {
        Self {
            source: post.source.label().to_string(),
            title: post.title.clone(),
            date: post.display_date(),
            file_name: post.file_name(),
            short_summary: post.short_summary.clone(),
        }
    }
}

/// Sort cards newest first by file name (date-prefixed).
pub fn sort_cards(cards: &mut [IndexCard]) {
    cards.sort_by(|a, b| b.file_name.cmp(&a.file_name));
}
