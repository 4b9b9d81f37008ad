// src/models/mod.rs

//! Domain models for the site generator.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod entry;
mod post;
mod source;

// Re-export all public types
pub use config::{
    Config, FetchConfig, ReconcileConfig, RenderConfig, SiteConfig, SitemapConfig,
};
pub use entry::FeedEntry;
pub use post::{IndexCard, NormalizedPost, POSTS_DIR, sort_cards};
pub use source::SourceLabel;
