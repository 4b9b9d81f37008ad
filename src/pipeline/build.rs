// src/pipeline/build.rs

//! Site build pipeline.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::models::{Config, IndexCard, NormalizedPost, SourceLabel, sort_cards};
use crate::pipeline::page::{render_detail, render_index};
use crate::pipeline::reconcile::Reconciler;
use crate::pipeline::sitemap::{INDEX_FILE, page_urls, write_sitemaps};
use crate::services::{CollectOutcome, Normalizer};
use crate::storage::SiteStorage;

/// What a build run produced.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub generated_at: DateTime<Utc>,
    pub fetched_entries: usize,
    pub feed_total: usize,
    pub feed_failures: usize,
    pub source_counts: BTreeMap<SourceLabel, usize>,
    pub rendered_pages: usize,
    pub slug_collisions: usize,
    pub index_cards: usize,
    pub sitemap_urls: usize,
    pub used_rescan: bool,
    pub files: Vec<String>,
}

/// Normalize entries, newest first, keeping one post per slug.
///
/// When two posts share a slug only one detail page can exist; the one
/// kept is the one that would have been written last.
pub fn prepare_posts(
    config: &Config,
    outcome: &CollectOutcome,
    now: DateTime<Utc>,
) -> (Vec<NormalizedPost>, usize) {
    let normalizer = Normalizer::new(config.render.summary_len, now);
    let mut posts: Vec<NormalizedPost> = outcome
        .entries
        .iter()
        .map(|entry| normalizer.normalize(entry))
        .collect();
    posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));

    let mut last_index: HashMap<&str, usize> = HashMap::new();
    for (i, post) in posts.iter().enumerate() {
        last_index.insert(post.slug.as_str(), i);
    }
    let keep: Vec<bool> = posts
        .iter()
        .enumerate()
        .map(|(i, post)| last_index[post.slug.as_str()] == i)
        .collect();

    let collisions = keep.iter().filter(|k| !**k).count();
    let mut kept = Vec::with_capacity(posts.len() - collisions);
    for (post, keep) in posts.into_iter().zip(keep) {
        if keep {
            kept.push(post);
        } else {
            log::warn!(
                "Slug collision: {} is overwritten by a later entry",
                post.page_key()
            );
        }
    }
    (kept, collisions)
}

/// Run the full build from already collected entries.
///
/// Writes detail pages, reconciles the index against pages on disk, then
/// writes `index.html`, the sitemaps and robots.txt. Any write failure
/// aborts the run.
pub async fn run_build(
    config: &Config,
    storage: &dyn SiteStorage,
    outcome: &CollectOutcome,
    now: DateTime<Utc>,
) -> Result<BuildReport> {
    let (posts, slug_collisions) = prepare_posts(config, outcome, now);

    let mut source_counts: BTreeMap<SourceLabel, usize> =
        SourceLabel::ALL.iter().map(|src| (*src, 0)).collect();
    for post in &posts {
        storage.write_text(&post.page_key(), &render_detail(post)).await?;
        *source_counts.entry(post.source).or_default() += 1;
    }
    log::info!(
        "[SRC COUNTS] {}",
        source_counts
            .iter()
            .map(|(src, n)| format!("{src}={n}"))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut cards: Vec<IndexCard> = posts.iter().map(IndexCard::from).collect();
    sort_cards(&mut cards);

    let reconciler = Reconciler::new(&config.reconcile, config.render.summary_len);
    let decision = reconciler
        .reconcile(storage, &mut cards, &source_counts)
        .await?;

    let files = publish(config, storage, &cards, now).await?;
    let sitemap_urls = cards.len() + 1;

    Ok(BuildReport {
        generated_at: now,
        fetched_entries: outcome.entries.len(),
        feed_total: outcome.feed_total,
        feed_failures: outcome.feed_failures,
        source_counts,
        rendered_pages: posts.len(),
        slug_collisions,
        index_cards: cards.len(),
        sitemap_urls,
        used_rescan: decision.used_rescan(),
        files,
    })
}

/// Rebuild index, sitemaps and robots.txt from `posts/` alone.
pub async fn run_rescan(
    config: &Config,
    storage: &dyn SiteStorage,
    now: DateTime<Utc>,
) -> Result<Vec<IndexCard>> {
    let reconciler = Reconciler::new(&config.reconcile, config.render.summary_len);
    let cards = reconciler.scan(storage).await?;
    log::info!("Rescan found {} rendered pages", cards.len());
    publish(config, storage, &cards, now).await?;
    Ok(cards)
}

/// Write the index page and everything derived from the final card list.
async fn publish(
    config: &Config,
    storage: &dyn SiteStorage,
    cards: &[IndexCard],
    now: DateTime<Utc>,
) -> Result<Vec<String>> {
    storage
        .write_text(INDEX_FILE, &render_index(&config.site, cards))
        .await?;

    let urls = page_urls(config.base_url(), cards);
    let sitemaps = write_sitemaps(config, storage, &urls, now).await?;
    log::info!(
        "Index: {} cards, sitemap: {} urls",
        cards.len(),
        sitemaps.url_count
    );

    let mut files = vec![INDEX_FILE.to_string()];
    files.extend(sitemaps.files.iter().map(|f| f.to_string()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeedEntry, POSTS_DIR};
    use crate::pipeline::sitemap::SITEMAP_FILE;
    use crate::storage::LocalStorage;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn entry(title: &str, link: &str, day: u32) -> FeedEntry {
        FeedEntry {
            title: Some(title.into()),
            link: Some(link.into()),
            published: Some(Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap()),
            description: Some(format!("<p>{title} day {day}</p>")),
            ..Default::default()
        }
    }

    #[test]
    fn posts_sorted_newest_first() {
        let outcome = CollectOutcome::from_entries(vec![
            entry("a", "https://blog.naver.com/x/1", 1),
            entry("b", "https://x.tistory.com/2", 3),
            entry("c", "https://blog.naver.com/x/3", 2),
        ]);
        let (posts, collisions) = prepare_posts(&Config::default(), &outcome, Utc::now());
        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "c", "a"]);
        assert_eq!(collisions, 0);
    }

    #[test]
    fn slug_collision_keeps_last_written() {
        let mut first = entry("Same", "https://blog.naver.com/x/1", 1);
        first.description = Some("<p>first</p>".into());
        let mut second = entry("Same", "https://blog.naver.com/x/2", 1);
        second.description = Some("<p>second</p>".into());

        let outcome = CollectOutcome::from_entries(vec![first, second]);
        let (posts, collisions) = prepare_posts(&Config::default(), &outcome, Utc::now());

        assert_eq!(collisions, 1);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].detail_body, "<p>second</p>");
    }

    fn run_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn sitemap_locs(xml: &str) -> Vec<String> {
        xml.lines()
            .filter_map(|line| {
                let line = line.trim();
                line.strip_prefix("<loc>")
                    .and_then(|rest| rest.strip_suffix("</loc>"))
                    .map(str::to_string)
            })
            .collect()
    }

    #[tokio::test]
    async fn hello_world_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let config = Config::default();
        let outcome = CollectOutcome::from_entries(vec![
            FeedEntry {
                title: Some("Hello World".into()),
                link: Some("https://blog.naver.com/u/1".into()),
                published: Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
                description: Some("<p>Test post</p>".into()),
                ..Default::default()
            },
            entry("Tistory post", "https://u.tistory.com/5", 2),
        ]);

        let report = run_build(&config, &storage, &outcome, run_now()).await.unwrap();
        assert!(!report.used_rescan);
        assert_eq!(report.rendered_pages, 2);

        let page = storage
            .read_text("posts/20240301-네이버-Hello-World.html")
            .await
            .unwrap()
            .unwrap();
        assert!(page.contains("<p>Test post</p>"));
        assert!(page.contains("https://m.blog.naver.com/u/1"));

        let index = storage.read_text(INDEX_FILE).await.unwrap().unwrap();
        assert!(index.contains("Test post"));
        assert!(index.contains("posts/20240301-네이버-Hello-World.html"));

        let sitemap = storage.read_text(SITEMAP_FILE).await.unwrap().unwrap();
        assert!(sitemap.contains(
            "https://didroql123.github.io/nbsm/posts/20240301-%EB%84%A4%EC%9D%B4%EB%B2%84-Hello-World.html"
        ));
        assert!(sitemap.contains("<lastmod>2024-03-10T12:00:00Z</lastmod>"));
    }

    #[tokio::test]
    async fn files_cards_and_urls_stay_in_lockstep() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let config = Config::default();
        let outcome = CollectOutcome::from_entries(vec![
            entry("a", "https://blog.naver.com/x/1", 1),
            entry("b", "https://x.tistory.com/2", 3),
            entry("c", "https://example.com/3", 2),
        ]);

        let report = run_build(&config, &storage, &outcome, run_now()).await.unwrap();
        let on_disk = storage.list_dir(POSTS_DIR).await.unwrap();
        assert_eq!(on_disk.len(), 3);
        assert_eq!(report.index_cards, 3);
        assert_eq!(report.sitemap_urls, 4);

        let sitemap = storage.read_text(SITEMAP_FILE).await.unwrap().unwrap();
        let locs = sitemap_locs(&sitemap);
        assert_eq!(locs[0], format!("{}/index.html", config.base_url()));

        let cards = Reconciler::new(&config.reconcile, config.render.summary_len)
            .scan(&storage)
            .await
            .unwrap();
        let expected = page_urls(config.base_url(), &cards);
        assert_eq!(locs, expected);
    }

    #[tokio::test]
    async fn missing_source_publishes_scanned_pages() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let config = Config::default();

        let first = CollectOutcome::from_entries(vec![
            entry("old naver", "https://blog.naver.com/x/1", 1),
            entry("old tistory", "https://x.tistory.com/2", 2),
        ]);
        run_build(&config, &storage, &first, run_now()).await.unwrap();

        // Tistory returns nothing this time.
        let second =
            CollectOutcome::from_entries(vec![entry("new naver", "https://blog.naver.com/x/9", 5)]);
        let report = run_build(&config, &storage, &second, run_now()).await.unwrap();
        assert!(report.used_rescan);
        assert_eq!(report.index_cards, 3);

        let scanned = Reconciler::new(&config.reconcile, config.render.summary_len)
            .scan(&storage)
            .await
            .unwrap();
        let sitemap = storage.read_text(SITEMAP_FILE).await.unwrap().unwrap();
        assert_eq!(sitemap_locs(&sitemap), page_urls(config.base_url(), &scanned));

        let index = storage.read_text(INDEX_FILE).await.unwrap().unwrap();
        assert!(index.contains("old tistory"));
        assert!(index.contains("new naver"));
    }

    #[tokio::test]
    async fn complete_run_ignores_old_pages() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let config = Config::default();
        storage
            .write_text(
                "posts/20200101-네이버-stale.html",
                "<title>stale</title><div class=\"summary\">old</div>",
            )
            .await
            .unwrap();

        let outcome = CollectOutcome::from_entries(vec![
            entry("a", "https://blog.naver.com/x/1", 1),
            entry("b", "https://x.tistory.com/2", 3),
        ]);
        let report = run_build(&config, &storage, &outcome, run_now()).await.unwrap();
        assert!(!report.used_rescan);
        assert_eq!(report.index_cards, 2);

        let sitemap = storage.read_text(SITEMAP_FILE).await.unwrap().unwrap();
        assert!(!sitemap.contains("stale"));
        let index = storage.read_text(INDEX_FILE).await.unwrap().unwrap();
        assert!(!index.contains("stale"));
    }

    #[tokio::test]
    async fn rescan_rebuilds_from_pages_only() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let config = Config::default();
        let outcome = CollectOutcome::from_entries(vec![
            entry("a", "https://blog.naver.com/x/1", 1),
            entry("b", "https://x.tistory.com/2", 3),
        ]);
        run_build(&config, &storage, &outcome, run_now()).await.unwrap();

        let cards = run_rescan(&config, &storage, run_now()).await.unwrap();
        let names: Vec<_> = cards.iter().map(|c| c.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["20240303-티스토리-b.html", "20240301-네이버-a.html"]
        );
        assert_eq!(cards[0].short_summary, "b day 3");
    }
}
