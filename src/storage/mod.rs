//! Storage abstractions for the generated site.
//!
//! ## Directory Structure
//!
//! ```text
//! site/
//! ├── config.toml           # Generator configuration
//! ├── index.html            # Rewritten every run
//! ├── posts/                # One page per post, accumulates across runs
//! │   └── YYYYMMDD-<source>-<slug>.html
//! ├── sitemap.xml
//! ├── sitemap-1.xml         # Optional byte-identical copy
//! ├── sitemap_index.xml
//! └── robots.txt
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for site output backends.
///
/// Keys are `/`-separated paths relative to the site root.
#[async_trait]
pub trait SiteStorage: Send + Sync {
    /// Write (or overwrite) a text file.
    async fn write_text(&self, key: &str, contents: &str) -> Result<()>;

    /// Read a text file, `None` if it does not exist.
    async fn read_text(&self, key: &str) -> Result<Option<String>>;

    /// File names directly inside `dir`, empty if the directory is missing.
    async fn list_dir(&self, dir: &str) -> Result<Vec<String>>;
}
