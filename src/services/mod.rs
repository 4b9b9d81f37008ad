//! Service layer for the site generator.
//!
//! This module contains the business logic for:
//! - Feed download and parsing (`FeedCollector`)
//! - Entry normalization (`Normalizer`)

mod collector;
mod normalizer;

pub use collector::{CollectOutcome, FeedCollector, parse_feed_bytes};
pub use normalizer::{NO_SUMMARY, NO_TITLE, Normalizer};
