//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::SourceLabel;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Feed URLs to mirror
    #[serde(default = "defaults::feeds")]
    pub feeds: Vec<String>,

    /// Published site identity
    #[serde(default)]
    pub site: SiteConfig,

    /// HTTP and politeness settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Page rendering settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Sitemap emission settings
    #[serde(default)]
    pub sitemap: SitemapConfig,

    /// Index reconciliation rules
    #[serde(default)]
    pub reconcile: ReconcileConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Serialize configuration back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let base = self.site.base_url.trim();
        if base.is_empty() {
            return Err(AppError::validation("site.base_url is empty"));
        }
        let parsed = Url::parse(base)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "site.base_url must be http(s), got {}",
                parsed.scheme()
            )));
        }
        if self.feeds.is_empty() {
            return Err(AppError::validation("No feeds defined"));
        }
        if let Some(bad) = self.feeds.iter().find(|f| Url::parse(f).is_err()) {
            return Err(AppError::validation(format!("Invalid feed URL: {bad}")));
        }
        if self.render.summary_len == 0 {
            return Err(AppError::validation("render.summary_len must be > 0"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        if self.fetch.max_retries == 0 {
            return Err(AppError::validation("fetch.max_retries must be > 0"));
        }
        if self.fetch.polite_delay_min_ms > self.fetch.polite_delay_max_ms {
            return Err(AppError::validation(
                "fetch.polite_delay_min_ms must not exceed fetch.polite_delay_max_ms",
            ));
        }
        if self.fetch.backoff_secs < 0.0 || self.fetch.backoff_jitter_secs < 0.0 {
            return Err(AppError::validation("fetch backoff values must be >= 0"));
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.site.base_url.trim().trim_end_matches('/')
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feeds: defaults::feeds(),
            site: SiteConfig::default(),
            fetch: FetchConfig::default(),
            render: RenderConfig::default(),
            sitemap: SitemapConfig::default(),
            reconcile: ReconcileConfig::default(),
        }
    }
}

/// Identity of the published site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute URL the site is served from
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Index page heading and `<title>`
    #[serde(default = "defaults::site_title")]
    pub title: String,

    /// Index page meta description
    #[serde(default = "defaults::site_description")]
    pub description: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            title: defaults::site_title(),
            description: defaults::site_description(),
        }
    }
}

/// HTTP client and politeness settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    #[serde(default = "defaults::accept")]
    pub accept: String,

    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    #[serde(default = "defaults::referer")]
    pub referer: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Attempts per feed before giving up
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Linear backoff step between attempts
    #[serde(default = "defaults::backoff")]
    pub backoff_secs: f64,

    /// Upper bound of the random jitter added to each backoff
    #[serde(default = "defaults::backoff_jitter")]
    pub backoff_jitter_secs: f64,

    /// Feed URLs containing one of these get a random pause before each request
    #[serde(default = "defaults::polite_hosts")]
    pub polite_hosts: Vec<String>,

    #[serde(default = "defaults::polite_delay_min")]
    pub polite_delay_min_ms: u64,

    #[serde(default = "defaults::polite_delay_max")]
    pub polite_delay_max_ms: u64,
}

impl FetchConfig {
    /// Whether requests to this URL should be spaced out.
    pub fn is_polite_host(&self, url: &str) -> bool {
        self.polite_hosts.iter().any(|host| url.contains(host.as_str()))
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            accept: defaults::accept(),
            accept_language: defaults::accept_language(),
            referer: defaults::referer(),
            timeout_secs: defaults::timeout(),
            max_retries: defaults::max_retries(),
            backoff_secs: defaults::backoff(),
            backoff_jitter_secs: defaults::backoff_jitter(),
            polite_hosts: defaults::polite_hosts(),
            polite_delay_min_ms: defaults::polite_delay_min(),
            polite_delay_max_ms: defaults::polite_delay_max(),
        }
    }
}

/// Page rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Maximum characters of the plain-text summary on index cards
    #[serde(default = "defaults::summary_len")]
    pub summary_len: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            summary_len: defaults::summary_len(),
        }
    }
}

/// Sitemap emission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapConfig {
    /// Also write the byte-identical `sitemap-1.xml`
    #[serde(default = "defaults::mirror")]
    pub mirror: bool,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            mirror: defaults::mirror(),
        }
    }
}

/// Rules deciding when the index is rebuilt from rendered pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// A run where any of these sources yields no entries rebuilds from `posts/`
    #[serde(default = "defaults::required_sources")]
    pub required_sources: Vec<SourceLabel>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            required_sources: defaults::required_sources(),
        }
    }
}

mod defaults {
    use crate::models::SourceLabel;

    // Site defaults
    pub fn base_url() -> String {
        "https://didroql123.github.io/nbsm".into()
    }
    pub fn site_title() -> String {
        "경수 블로그 최신 글 모음".into()
    }
    pub fn site_description() -> String {
        "네이버/티스토리 최신글 요약".into()
    }
    pub fn feeds() -> Vec<String> {
        vec![
            "https://rss.blog.naver.com/rudtn668.xml".into(),
            "https://ksp668.tistory.com/rss".into(),
            "https://rss.blog.naver.com/syslogbook.xml".into(),
        ]
    }

    // Fetch defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            .into()
    }
    pub fn accept() -> String {
        "application/rss+xml, application/xml;q=0.9, text/xml;q=0.8, */*;q=0.7".into()
    }
    pub fn accept_language() -> String {
        "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7".into()
    }
    pub fn referer() -> String {
        "https://blog.naver.com/".into()
    }
    pub fn timeout() -> u64 {
        15
    }
    pub fn max_retries() -> u32 {
        3
    }
    pub fn backoff() -> f64 {
        2.0
    }
    pub fn backoff_jitter() -> f64 {
        0.6
    }
    pub fn polite_hosts() -> Vec<String> {
        vec!["naver.com".into()]
    }
    pub fn polite_delay_min() -> u64 {
        800
    }
    pub fn polite_delay_max() -> u64 {
        1600
    }

    // Render defaults
    pub fn summary_len() -> usize {
        160
    }

    // Sitemap defaults
    pub fn mirror() -> bool {
        true
    }

    // Reconcile defaults
    pub fn required_sources() -> Vec<SourceLabel> {
        vec![SourceLabel::Naver, SourceLabel::Tistory]
    }
}
