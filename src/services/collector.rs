// src/services/collector.rs

//! Feed collector service.
//!
//! Downloads every configured feed in order and parses it into
//! [`FeedEntry`] values. A feed that cannot be fetched or parsed is logged
//! and counted; it never aborts the run.

use std::time::Duration;

use feed_rs::model::{Entry, FeedType};
use rand::Rng;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{FeedEntry, FetchConfig};
use crate::utils::http::{create_client, fetch_bytes};

/// Summary of a collection run.
#[derive(Debug, Default)]
pub struct CollectOutcome {
    pub entries: Vec<FeedEntry>,
    pub feed_total: usize,
    pub feed_failures: usize,
}

impl CollectOutcome {
    /// Outcome built from already parsed entries (no network involved).
    pub fn from_entries(entries: Vec<FeedEntry>) -> Self {
        Self {
            entries,
            feed_total: 0,
            feed_failures: 0,
        }
    }
}

/// Service for downloading and parsing feeds.
pub struct FeedCollector {
    config: FetchConfig,
    client: Client,
}

impl FeedCollector {
    /// Create a new collector with the given fetch settings.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            client: create_client(config)?,
        })
    }

    /// Fetch and parse all feeds one after another.
    pub async fn collect_all(&self, feeds: &[String]) -> CollectOutcome {
        let mut outcome = CollectOutcome {
            feed_total: feeds.len(),
            ..CollectOutcome::default()
        };

        for url in feeds {
            match self.collect_one(url).await {
                Ok(entries) => {
                    log::info!("[FEED] {} -> entries={}", url, entries.len());
                    outcome.entries.extend(entries);
                }
                Err(e) => {
                    outcome.feed_failures += 1;
                    log::error!("Feed fetch/parse failed for {}: {}", url, e);
                }
            }
        }

        outcome
    }

    async fn collect_one(&self, url: &str) -> Result<Vec<FeedEntry>> {
        let raw = self.fetch_with_retry(url).await?;
        parse_feed_bytes(&raw)
    }

    /// Fetch a feed, retrying with linear backoff plus jitter.
    pub async fn fetch_with_retry(&self, url: &str) -> Result<Vec<u8>> {
        let attempts = self.config.max_retries.max(1);
        let polite = self.config.is_polite_host(url);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            if polite {
                tokio::time::sleep(self.polite_delay()).await;
            }

            match fetch_bytes(&self.client, url).await {
                Ok(bytes) => return Ok(bytes),
                Err(AppError::Fetch { message, .. }) => last_error = message,
                Err(e) => last_error = e.to_string(),
            }

            log::warn!(
                "Fetch attempt {}/{} failed for {}: {}",
                attempt,
                attempts,
                url,
                last_error
            );
            tokio::time::sleep(self.backoff_delay(attempt)).await;
        }

        Err(AppError::fetch(url, last_error))
    }

    fn polite_delay(&self) -> Duration {
        let (min, max) = (
            self.config.polite_delay_min_ms,
            self.config.polite_delay_max_ms.max(self.config.polite_delay_min_ms),
        );
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let jitter_max = self.config.backoff_jitter_secs;
        let jitter = if jitter_max > 0.0 {
            rand::thread_rng().gen_range(0.0..jitter_max)
        } else {
            0.0
        };
        let secs = self.config.backoff_secs.max(0.0) * f64::from(attempt) + jitter;
        Duration::from_secs_f64(secs)
    }
}

/// Parse an RSS, Atom or JSON feed document into entries.
pub fn parse_feed_bytes(raw: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = feed_rs::parser::parse(raw)?;
    let summary_is_description = matches!(
        feed.feed_type,
        FeedType::RSS0 | FeedType::RSS1 | FeedType::RSS2
    );
    Ok(feed
        .entries
        .into_iter()
        .map(|entry| entry_from_feed(entry, summary_is_description))
        .collect())
}

fn entry_from_feed(entry: Entry, summary_is_description: bool) -> FeedEntry {
    let link = entry
        .links
        .iter()
        .find(|l| l.rel.as_deref().map_or(true, |rel| rel == "alternate"))
        .or(entry.links.first())
        .map(|l| l.href.clone());
    let summary = entry.summary.map(|text| text.content);
    let (description, summary) = if summary_is_description {
        (summary, None)
    } else {
        (None, summary)
    };

    FeedEntry {
        title: entry.title.map(|text| text.content),
        link,
        published: entry.published,
        updated: entry.updated,
        // feed-rs exposes parsed dates only and drops a date it cannot
        // parse, so no raw text is left for the textual fallback.
        created: None,
        published_text: None,
        updated_text: None,
        content: entry.content.and_then(|content| content.body),
        description,
        summary,
    }
}
