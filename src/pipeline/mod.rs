//! Pipeline entry points for site generation.
//!
//! - `run_build`: Normalize collected entries and publish the whole site
//! - `run_rescan`: Rebuild index and sitemaps from rendered pages only

pub mod build;
pub mod page;
pub mod reconcile;
pub mod sitemap;

pub use build::{BuildReport, prepare_posts, run_build, run_rescan};
pub use reconcile::{ReconcileDecision, Reconciler, RescanReason};
