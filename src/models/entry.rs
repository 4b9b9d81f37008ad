//! Raw feed entry as handed over by the feed parser.

use chrono::{DateTime, Utc};

/// One syndicated article before normalization.
///
/// Every field is optional; feeds in the wild omit any of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,

    /// Structured timestamps, most reliable first
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub created: Option<DateTime<Utc>>,

    /// Textual dates kept for when no structured timestamp resolved
    pub published_text: Option<String>,
    pub updated_text: Option<String>,

    /// Rich content block (`content:encoded`, Atom `<content>`)
    pub content: Option<String>,
    /// RSS `<description>`
    pub description: Option<String>,
    /// Atom `<summary>`
    pub summary: Option<String>,
}

impl FeedEntry {
    /// Body HTML by priority: content, then description, then summary.
    ///
    /// Empty content blocks are skipped; a present description wins over
    /// the summary even when empty.
    pub fn body(&self) -> Option<&str> {
        self.content
            .as_deref()
            .filter(|c| !c.is_empty())
            .or(self.description.as_deref())
            .or(self.summary.as_deref())
            .filter(|b| !b.is_empty())
    }
}
