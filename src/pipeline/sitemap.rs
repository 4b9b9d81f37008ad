// src/pipeline/sitemap.rs

//! Sitemap, sitemap index and robots.txt emission.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Config, IndexCard};
use crate::storage::SiteStorage;

pub const SITEMAP_FILE: &str = "sitemap.xml";
pub const SITEMAP_MIRROR_FILE: &str = "sitemap-1.xml";
pub const SITEMAP_INDEX_FILE: &str = "sitemap_index.xml";
pub const ROBOTS_FILE: &str = "robots.txt";
pub const INDEX_FILE: &str = "index.html";

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// `lastmod` value shared by every entry of a run (UTC, trailing `Z`).
pub fn lastmod(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Index page URL followed by one URL per card, in card order.
pub fn page_urls(base_url: &str, cards: &[IndexCard]) -> Vec<String> {
    let base = base_url.trim_end_matches('/');
    std::iter::once(format!("{base}/{INDEX_FILE}"))
        .chain(cards.iter().map(|card| card.absolute_url(base)))
        .collect()
}

/// `<urlset>` document listing every URL.
pub fn build_sitemap(urls: &[String], lastmod: &str) -> String {
    let mut out = vec![
        r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string(),
        format!(r#"<urlset xmlns="{SITEMAP_NS}">"#),
    ];
    for url in urls {
        out.push("  <url>".to_string());
        out.push(format!("    <loc>{}</loc>", escape_xml(url)));
        out.push(format!("    <lastmod>{lastmod}</lastmod>"));
        out.push("  </url>".to_string());
    }
    out.push("</urlset>".to_string());
    out.join("\n")
}

/// `<sitemapindex>` document referencing the given sitemap files.
pub fn build_sitemap_index(base_url: &str, files: &[&str], lastmod: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!("<sitemapindex xmlns=\"{SITEMAP_NS}\">\n"));
    for file in files {
        out.push_str("  <sitemap>\n");
        out.push_str(&format!("    <loc>{base}/{file}</loc>\n"));
        out.push_str(&format!("    <lastmod>{lastmod}</lastmod>\n"));
        out.push_str("  </sitemap>\n");
    }
    out.push_str("</sitemapindex>\n");
    out
}

/// robots.txt allowing everything and pointing at every sitemap document.
pub fn build_robots(base_url: &str, files: &[&str]) -> String {
    let base = base_url.trim_end_matches('/');
    let mut out = String::from("User-agent: *\nAllow: /\n");
    for file in files {
        out.push_str(&format!("Sitemap: {base}/{file}\n"));
    }
    out
}

/// Names of the generated files, for logging and reports.
#[derive(Debug, Clone)]
pub struct SitemapOutput {
    pub url_count: usize,
    pub files: Vec<&'static str>,
}

/// Write sitemap(s), the sitemap index and robots.txt.
pub async fn write_sitemaps(
    config: &Config,
    storage: &dyn SiteStorage,
    urls: &[String],
    now: DateTime<Utc>,
) -> Result<SitemapOutput> {
    let base = config.base_url();
    let lastmod = lastmod(now);
    let sitemap = build_sitemap(urls, &lastmod);

    let mut sitemaps = vec![SITEMAP_FILE];
    storage.write_text(SITEMAP_FILE, &sitemap).await?;
    if config.sitemap.mirror {
        storage.write_text(SITEMAP_MIRROR_FILE, &sitemap).await?;
        sitemaps.push(SITEMAP_MIRROR_FILE);
    }

    storage
        .write_text(
            SITEMAP_INDEX_FILE,
            &build_sitemap_index(base, &sitemaps, &lastmod),
        )
        .await?;

    let mut robots_targets = sitemaps.clone();
    robots_targets.push(SITEMAP_INDEX_FILE);
    storage
        .write_text(ROBOTS_FILE, &build_robots(base, &robots_targets))
        .await?;

    let mut files = robots_targets;
    files.push(ROBOTS_FILE);
    Ok(SitemapOutput {
        url_count: urls.len(),
        files,
    })
}

fn escape_xml(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 1, 2, 3).unwrap()
    }

    #[test]
    fn lastmod_is_utc_with_z() {
        assert_eq!(lastmod(now()), "2024-03-02T01:02:03Z");
    }

    #[test]
    fn sitemap_lists_every_url() {
        let urls = vec![
            "https://ex.com/index.html".to_string(),
            "https://ex.com/posts/a.html".to_string(),
        ];
        let xml = build_sitemap(&urls, "2024-03-02T01:02:03Z");
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert_eq!(xml.matches("<url>").count(), 2);
        assert!(xml.contains("    <loc>https://ex.com/posts/a.html</loc>"));
        assert_eq!(xml.matches("<lastmod>2024-03-02T01:02:03Z</lastmod>").count(), 2);
        assert!(xml.ends_with("</urlset>"));
    }

    #[test]
    fn loc_is_xml_escaped() {
        let urls = vec!["https://ex.com/a?x=1&y=<2>".to_string()];
        let xml = build_sitemap(&urls, "2024-03-02T01:02:03Z");
        assert!(xml.contains("<loc>https://ex.com/a?x=1&amp;y=&lt;2&gt;</loc>"));
    }

    #[test]
    fn robots_points_at_all_sitemaps() {
        let robots = build_robots("https://ex.com/", &["sitemap.xml", "sitemap_index.xml"]);
        assert_eq!(
            robots,
            "User-agent: *\nAllow: /\nSitemap: https://ex.com/sitemap.xml\nSitemap: https://ex.com/sitemap_index.xml\n"
        );
    }

    #[tokio::test]
    async fn writes_mirror_and_index() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let config = Config::default();
        let urls = vec![format!("{}/index.html", config.base_url())];

        let output = write_sitemaps(&config, &storage, &urls, now()).await.unwrap();
        assert_eq!(output.url_count, 1);

        let main = storage.read_text(SITEMAP_FILE).await.unwrap().unwrap();
        let mirror = storage.read_text(SITEMAP_MIRROR_FILE).await.unwrap().unwrap();
        assert_eq!(main, mirror);

        let index = storage.read_text(SITEMAP_INDEX_FILE).await.unwrap().unwrap();
        assert!(index.contains("<loc>https://didroql123.github.io/nbsm/sitemap.xml</loc>"));
        assert!(index.contains("<loc>https://didroql123.github.io/nbsm/sitemap-1.xml</loc>"));

        let robots = storage.read_text(ROBOTS_FILE).await.unwrap().unwrap();
        assert_eq!(robots.matches("Sitemap: ").count(), 3);
    }

    #[tokio::test]
    async fn mirror_can_be_disabled() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let mut config = Config::default();
        config.sitemap.mirror = false;

        write_sitemaps(&config, &storage, &[], now()).await.unwrap();

        assert!(storage.read_text(SITEMAP_MIRROR_FILE).await.unwrap().is_none());
        let index = storage.read_text(SITEMAP_INDEX_FILE).await.unwrap().unwrap();
        assert_eq!(index.matches("<sitemap>").count(), 1);
        let robots = storage.read_text(ROBOTS_FILE).await.unwrap().unwrap();
        assert_eq!(robots.matches("Sitemap: ").count(), 2);
    }
}
