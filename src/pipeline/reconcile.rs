//! Index reconciliation.
//!
//! Decides whether this run's freshly built cards are published, or
//! whether the index and sitemap are rebuilt from the detail pages already
//! on disk.
//!
//! > A run where any required source returned nothing (or nothing came
//! > back at all) never publishes its partial index. If `posts/` holds at
//! > least one page, the rescan replaces the fresh cards completely.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::{IndexCard, POSTS_DIR, ReconcileConfig, SourceLabel, sort_cards};
use crate::pipeline::page::parse_detail;
use crate::storage::SiteStorage;

/// Why a rescan was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RescanReason {
    /// No cards at all this run
    NoEntries,
    /// These required sources contributed nothing
    MissingSources(Vec<SourceLabel>),
}

/// Result of reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileDecision {
    /// Fresh cards are complete enough to publish
    Fresh { card_count: usize },
    /// Fresh cards were replaced by the pages found on disk
    Rescanned {
        reason: RescanReason,
        fresh_count: usize,
        scanned_count: usize,
    },
    /// Rescan was needed but found no pages; fresh cards kept
    RescanEmpty {
        reason: RescanReason,
        fresh_count: usize,
    },
}

impl ReconcileDecision {
    pub fn used_rescan(&self) -> bool {
        matches!(self, Self::Rescanned { .. })
    }
}

/// Reconciles fresh cards against previously rendered pages.
#[derive(Debug, Clone)]
pub struct Reconciler {
    required_sources: Vec<SourceLabel>,
    summary_len: usize,
}

impl Reconciler {
    pub fn new(config: &ReconcileConfig, summary_len: usize) -> Self {
        Self {
            required_sources: config.required_sources.clone(),
            summary_len,
        }
    }

    /// Check whether the fresh run needs a rescan. Pure; no I/O.
    pub fn needs_rescan(
        &self,
        fresh: &[IndexCard],
        source_counts: &BTreeMap<SourceLabel, usize>,
    ) -> Option<RescanReason> {
        if fresh.is_empty() {
            return Some(RescanReason::NoEntries);
        }
        let missing: Vec<SourceLabel> = self
            .required_sources
            .iter()
            .copied()
            .filter(|src| source_counts.get(src).copied().unwrap_or(0) == 0)
            .collect();
        if missing.is_empty() {
            None
        } else {
            Some(RescanReason::MissingSources(missing))
        }
    }

    /// Apply reconciliation, replacing `cards` with the scan result if needed.
    pub async fn reconcile(
        &self,
        storage: &dyn SiteStorage,
        cards: &mut Vec<IndexCard>,
        source_counts: &BTreeMap<SourceLabel, usize>,
    ) -> Result<ReconcileDecision> {
        let fresh_count = cards.len();
        let Some(reason) = self.needs_rescan(cards, source_counts) else {
            log::info!("Reconcile: FRESH ({} cards)", fresh_count);
            return Ok(ReconcileDecision::Fresh {
                card_count: fresh_count,
            });
        };

        log::info!(
            "Reconcile: rebuilding index from {}/ ({:?})",
            POSTS_DIR,
            reason
        );
        let scanned = self.scan(storage).await?;

        if scanned.is_empty() {
            log::warn!(
                "Reconcile: no rendered pages to recover from, keeping {} fresh cards",
                fresh_count
            );
            return Ok(ReconcileDecision::RescanEmpty {
                reason,
                fresh_count,
            });
        }

        let scanned_count = scanned.len();
        log::info!(
            "Reconcile: RESCANNED ({} fresh cards replaced by {} pages)",
            fresh_count,
            scanned_count
        );
        *cards = scanned;
        Ok(ReconcileDecision::Rescanned {
            reason,
            fresh_count,
            scanned_count,
        })
    }

    /// Read back every detail page, newest file name first.
    pub async fn scan(&self, storage: &dyn SiteStorage) -> Result<Vec<IndexCard>> {
        let mut cards = Vec::new();
        for file_name in storage.list_dir(POSTS_DIR).await? {
            let key = format!("{POSTS_DIR}/{file_name}");
            let Some(html) = storage.read_text(&key).await? else {
                continue;
            };
            match parse_detail(&file_name, &html, self.summary_len) {
                Some(card) => cards.push(card),
                None => log::debug!("Skipping non-page file {}", key),
            }
        }
        sort_cards(&mut cards);
        Ok(cards)
    }
}
