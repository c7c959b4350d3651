use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use chrono_tz::Tz;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::models::cache_entry::is_fresh;
use crate::models::{
    Article, ArticleList, ArticleRecord, CacheEntry, DEFAULT_SECTION, DEFAULT_TTL,
};
use crate::service::caching::{KeyValueStore, StoreError};
use crate::service::source::{ArticleSource, SourceError};

pub fn list_key(section: &str) -> String {
    format!("articleList-{section}")
}

pub fn timestamp_key(section: &str) -> String {
    format!("articleList-{section}-timestamp")
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

enum Lookup {
    Hit(CacheEntry),
    Miss,
    Unusable,
}

/// Serves a section's articles from local storage while they are fresh and
/// from the remote source otherwise.
pub struct ArticleCache {
    store: Arc<dyn KeyValueStore>,
    source: Arc<dyn ArticleSource>,
    ttl: Duration,
    timezone: Tz,
    cache_appended_pages: bool,
}

impl ArticleCache {
    pub fn new(store: Arc<dyn KeyValueStore>, source: Arc<dyn ArticleSource>) -> Self {
        Self {
            store,
            source,
            ttl: DEFAULT_TTL,
            timezone: crate::config::DEFAULT_TIMEZONE,
            cache_appended_pages: false,
        }
    }

    pub fn from_config(
        store: Arc<dyn KeyValueStore>,
        source: Arc<dyn ArticleSource>,
        config: &AppConfig,
    ) -> Self {
        Self::new(store, source)
            .with_ttl(config.cache.ttl)
            .with_timezone(config.timezone)
            .with_appended_pages(config.cache.cache_appended_pages)
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Also persist pages fetched by [`ArticleCache::load_more`].
    pub fn with_appended_pages(mut self, enabled: bool) -> Self {
        self.cache_appended_pages = enabled;
        self
    }

    /// Articles for `section` (`"all"` when blank): cached if fresh and
    /// usable, otherwise page 0 from the source, persisted with the current time.
    pub async fn get_articles(&self, section: &str) -> Result<ArticleList, FetchError> {
        let section = normalize_section(section);

        match self.lookup(&section).await {
            Lookup::Hit(entry) => {
                info!(
                    "Loading {} articles for section {} from local storage",
                    entry.records.len(),
                    section
                );
                return Ok(self.build_list(&section, entry.records));
            }
            Lookup::Miss => {}
            Lookup::Unusable => {
                info!("Cached articles for section {} are unusable; refetching", section);
                self.discard(&section).await;
            }
        }

        self.fetch_first_page(&section).await
    }

    /// Fetch the next page and append the articles not already in `list`.
    /// The cursor only advances when the fetch succeeds.
    pub async fn load_more(&self, list: &mut ArticleList) -> Result<usize, FetchError> {
        let page = list.current_page + 1;
        info!("Fetching more articles for section {} (page {})", list.section, page);

        let records = self.source.fetch_page(&list.section, page).await?;
        list.current_page = page;

        let mut appended = 0;
        for record in records {
            if list.push_unique(Article::from_record(record, self.timezone)) {
                appended += 1;
            }
        }
        debug!("Appended {} articles to section {}", appended, list.section);

        if self.cache_appended_pages && appended > 0 {
            if let Err(err) = self.store_appended(list).await {
                warn!(?err, "failed to persist appended articles for {}", list.section);
            }
        }

        Ok(appended)
    }

    /// Drop the cached entry so the next request for `section` hits the network.
    pub async fn invalidate(&self, section: &str) -> Result<(), FetchError> {
        let section = normalize_section(section);
        self.store.remove(&timestamp_key(&section)).await?;
        self.store.remove(&list_key(&section)).await?;
        Ok(())
    }

    pub async fn read_entry(&self, section: &str) -> Result<Option<CacheEntry>, StoreError> {
        let Some(raw_ts) = self.store.get(&timestamp_key(section)).await? else {
            return Ok(None);
        };
        let Some(raw_list) = self.store.get(&list_key(section)).await? else {
            return Ok(None);
        };
        let Ok(fetched_at_ms) = raw_ts.trim().parse::<i64>() else {
            return Ok(None);
        };
        let records: Vec<ArticleRecord> = serde_json::from_str(&raw_list)?;

        Ok(Some(CacheEntry {
            section: section.to_string(),
            records,
            fetched_at_ms,
        }))
    }

    pub async fn write_entry(&self, entry: &CacheEntry) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&entry.records)?;
        self.store.set(&list_key(&entry.section), payload).await?;
        self.store
            .set(&timestamp_key(&entry.section), entry.fetched_at_ms.to_string())
            .await
    }

    async fn lookup(&self, section: &str) -> Lookup {
        let raw_ts = match self.store.get(&timestamp_key(section)).await {
            Ok(Some(ts)) => ts,
            Ok(None) => {
                debug!("No cached articles for section {}", section);
                return Lookup::Miss;
            }
            Err(err) => {
                warn!(?err, "failed to read cache timestamp for {}", section);
                return Lookup::Miss;
            }
        };

        let Ok(fetched_at_ms) = raw_ts.trim().parse::<i64>() else {
            return Lookup::Unusable;
        };
        if !is_fresh(fetched_at_ms, now_millis(), self.ttl) {
            info!("Cached articles for section {} are stale", section);
            return Lookup::Miss;
        }

        let entry = match self.read_entry(section).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return Lookup::Unusable,
            Err(StoreError::Serde(err)) => {
                warn!(?err, "cached article list for {} is malformed", section);
                return Lookup::Unusable;
            }
            Err(err) => {
                warn!(?err, "failed to read cached articles for {}", section);
                return Lookup::Miss;
            }
        };

        // One or zero articles means an earlier fetch went wrong.
        if entry.records.len() <= 1 {
            return Lookup::Unusable;
        }
        Lookup::Hit(entry)
    }

    async fn fetch_first_page(&self, section: &str) -> Result<ArticleList, FetchError> {
        info!("Fetching latest articles from section: {}", section);
        let records = self.source.fetch_page(section, 0).await?;

        let entry = CacheEntry {
            section: section.to_string(),
            records,
            fetched_at_ms: now_millis(),
        };
        if let Err(err) = self.write_entry(&entry).await {
            warn!(?err, "failed to persist articles for section {}", section);
        }

        Ok(self.build_list(section, entry.records))
    }

    async fn discard(&self, section: &str) {
        if let Err(err) = self.invalidate(section).await {
            warn!(?err, "failed to remove cached articles for {}", section);
        }
    }

    async fn store_appended(&self, list: &ArticleList) -> Result<(), StoreError> {
        // Freshness stays anchored to the first page's fetch time.
        if self.store.get(&timestamp_key(&list.section)).await?.is_none() {
            return Ok(());
        }
        let payload = serde_json::to_string(&list.records())?;
        self.store.set(&list_key(&list.section), payload).await
    }

    fn build_list(&self, section: &str, records: Vec<ArticleRecord>) -> ArticleList {
        let articles = records
            .into_iter()
            .map(|record| Article::from_record(record, self.timezone))
            .collect();
        ArticleList::from_articles(section, articles)
    }
}

fn normalize_section(section: &str) -> String {
    let section = section.trim();
    if section.is_empty() {
        DEFAULT_SECTION.to_string()
    } else {
        section.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::caching::MemoryStore;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MockSource {
        pages: Mutex<HashMap<(String, u32), Vec<ArticleRecord>>>,
        calls: Mutex<Vec<(String, u32)>>,
        fail: Mutex<bool>,
    }

    impl MockSource {
        async fn with_page(self, section: &str, page: u32, nids: &[&str]) -> Self {
            self.pages
                .lock()
                .await
                .insert((section.to_string(), page), records(nids));
            self
        }

        async fn calls(&self) -> Vec<(String, u32)> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl ArticleSource for MockSource {
        async fn fetch_page(
            &self,
            section: &str,
            page: u32,
        ) -> Result<Vec<ArticleRecord>, SourceError> {
            self.calls.lock().await.push((section.to_string(), page));
            if *self.fail.lock().await {
                return Err(SourceError::Http("connection refused".to_string()));
            }
            Ok(self
                .pages
                .lock()
                .await
                .get(&(section.to_string(), page))
                .cloned()
                .unwrap_or_default())
        }
    }

    fn records(nids: &[&str]) -> Vec<ArticleRecord> {
        nids.iter()
            .map(|nid| ArticleRecord {
                nid: nid.to_string(),
                title: format!("Article {nid}"),
                body: "<p>Body text for the article</p>".to_string(),
                article_date: Some("2013-02-14 10:30:00".to_string()),
                issue_date: None,
                image: None,
            })
            .collect()
    }

    async fn seed(store: &MemoryStore, section: &str, nids: &[&str], age: Duration) {
        let payload = serde_json::to_string(&records(nids)).unwrap();
        store.set(&list_key(section), payload).await.unwrap();
        let ts = now_millis() - age.as_millis() as i64;
        store.set(&timestamp_key(section), ts.to_string()).await.unwrap();
    }

    fn cache(store: &Arc<MemoryStore>, source: &Arc<MockSource>) -> ArticleCache {
        ArticleCache::new(store.clone(), source.clone())
    }

    #[tokio::test]
    async fn empty_cache_fetches_once_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(MockSource::default().with_page("all", 0, &["1", "2", "3"]).await);

        let before = now_millis();
        let list = cache(&store, &source).get_articles("all").await.unwrap();
        let after = now_millis();

        assert_eq!(list.nids(), vec!["1", "2", "3"]);
        assert_eq!(list.current_page, 0);
        assert_eq!(source.calls().await, vec![("all".to_string(), 0)]);

        let ts: i64 = store
            .get(&timestamp_key("all"))
            .await
            .unwrap()
            .unwrap()
            .parse()
            .unwrap();
        assert!(before <= ts && ts <= after);
        let stored: Vec<ArticleRecord> =
            serde_json::from_str(&store.get(&list_key("all")).await.unwrap().unwrap()).unwrap();
        assert_eq!(stored, records(&["1", "2", "3"]));
    }

    #[tokio::test]
    async fn fresh_cache_is_served_without_fetching() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "sports", &["1", "2", "3", "4", "5"], Duration::from_secs(600)).await;
        let source = Arc::new(MockSource::default());

        let list = cache(&store, &source).get_articles("sports").await.unwrap();

        assert_eq!(list.nids(), vec!["1", "2", "3", "4", "5"]);
        assert_eq!(list.section, "sports");
        assert!(source.calls().await.is_empty());
    }

    #[tokio::test]
    async fn stale_cache_is_refetched() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "news", &["1", "2", "3"], Duration::from_secs(2 * 60 * 60)).await;
        let source = Arc::new(MockSource::default().with_page("news", 0, &["7", "8"]).await);

        let list = cache(&store, &source).get_articles("news").await.unwrap();

        assert_eq!(list.nids(), vec!["7", "8"]);
        assert_eq!(source.calls().await.len(), 1);
        let stored: Vec<ArticleRecord> =
            serde_json::from_str(&store.get(&list_key("news")).await.unwrap().unwrap()).unwrap();
        assert_eq!(stored, records(&["7", "8"]));
    }

    #[tokio::test]
    async fn shorter_ttl_makes_entries_stale_sooner() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "all", &["1", "2"], Duration::from_secs(120)).await;
        let source = Arc::new(MockSource::default().with_page("all", 0, &["3", "4"]).await);

        let list = cache(&store, &source)
            .with_ttl(Duration::from_secs(60))
            .get_articles("all")
            .await
            .unwrap();
        assert_eq!(list.nids(), vec!["3", "4"]);
    }

    #[tokio::test]
    async fn single_article_cache_is_discarded_and_retried_once() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "all", &["1"], Duration::from_secs(60)).await;
        // The network also returns a single article; no second retry happens.
        let source = Arc::new(MockSource::default().with_page("all", 0, &["9"]).await);

        let list = cache(&store, &source).get_articles("all").await.unwrap();

        assert_eq!(list.nids(), vec!["9"]);
        assert_eq!(source.calls().await, vec![("all".to_string(), 0)]);
    }

    #[tokio::test]
    async fn discarded_entry_stays_removed_when_refetch_fails() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "all", &["1"], Duration::from_secs(60)).await;
        let source = Arc::new(MockSource::default());
        *source.fail.lock().await = true;

        let err = cache(&store, &source).get_articles("all").await.unwrap_err();

        assert!(matches!(err, FetchError::Source(_)));
        assert_eq!(source.calls().await.len(), 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn out_of_range_timestamps_are_refetched() {
        for ts in [i64::MIN, i64::MAX] {
            let store = Arc::new(MemoryStore::new());
            let payload = serde_json::to_string(&records(&["1", "2", "3"])).unwrap();
            store.set(&list_key("all"), payload).await.unwrap();
            store.set(&timestamp_key("all"), ts.to_string()).await.unwrap();
            let source = Arc::new(MockSource::default().with_page("all", 0, &["7", "8"]).await);

            let list = cache(&store, &source).get_articles("all").await.unwrap();

            assert_eq!(list.nids(), vec!["7", "8"]);
            assert_eq!(source.calls().await.len(), 1);
        }
    }

    #[tokio::test]
    async fn empty_cache_entry_is_discarded() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "all", &[], Duration::from_secs(60)).await;
        let source = Arc::new(MockSource::default().with_page("all", 0, &["1", "2"]).await);

        let list = cache(&store, &source).get_articles("all").await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(source.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn malformed_cache_is_a_miss() {
        let store = Arc::new(MemoryStore::new());
        store.set(&list_key("all"), "{oops".to_string()).await.unwrap();
        store
            .set(&timestamp_key("all"), now_millis().to_string())
            .await
            .unwrap();
        let source = Arc::new(MockSource::default().with_page("all", 0, &["1", "2"]).await);

        let list = cache(&store, &source).get_articles("all").await.unwrap();
        assert_eq!(list.nids(), vec!["1", "2"]);
        assert_eq!(source.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn timestamp_without_list_is_a_miss() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(&timestamp_key("all"), now_millis().to_string())
            .await
            .unwrap();
        let source = Arc::new(MockSource::default().with_page("all", 0, &["1", "2"]).await);

        let list = cache(&store, &source).get_articles("all").await.unwrap();
        assert_eq!(list.len(), 2);
    }

    #[tokio::test]
    async fn network_failure_persists_nothing() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(MockSource::default());
        *source.fail.lock().await = true;

        let err = cache(&store, &source).get_articles("all").await.unwrap_err();
        assert!(matches!(err, FetchError::Source(SourceError::Http(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn empty_network_result_is_explicit() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(MockSource::default());

        let list = cache(&store, &source).get_articles("").await.unwrap();
        assert!(list.is_empty());
        assert_eq!(list.section, "all");
        assert_eq!(source.calls().await, vec![("all".to_string(), 0)]);
    }

    #[tokio::test]
    async fn load_more_appends_after_existing() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(
            MockSource::default()
                .with_page("all", 0, &["1", "2", "3"])
                .await
                .with_page("all", 1, &["3", "4", "5"])
                .await,
        );
        let cache = cache(&store, &source);

        let mut list = cache.get_articles("all").await.unwrap();
        let before: Vec<String> = list.nids().iter().map(|s| s.to_string()).collect();
        let appended = cache.load_more(&mut list).await.unwrap();

        assert_eq!(appended, 2);
        assert_eq!(list.current_page, 1);
        assert_eq!(list.nids(), vec!["1", "2", "3", "4", "5"]);
        assert!(list.nids().starts_with(&before.iter().map(String::as_str).collect::<Vec<_>>()));

        // Appended pages are not written back by default.
        let stored: Vec<ArticleRecord> =
            serde_json::from_str(&store.get(&list_key("all")).await.unwrap().unwrap()).unwrap();
        assert_eq!(stored.len(), 3);
    }

    #[tokio::test]
    async fn load_more_failure_keeps_cursor_and_list() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(MockSource::default().with_page("all", 0, &["1", "2"]).await);
        let cache = cache(&store, &source);

        let mut list = cache.get_articles("all").await.unwrap();
        *source.fail.lock().await = true;

        assert!(cache.load_more(&mut list).await.is_err());
        assert_eq!(list.current_page, 0);
        assert_eq!(list.nids(), vec!["1", "2"]);
    }

    #[tokio::test]
    async fn appended_pages_can_be_persisted() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(
            MockSource::default()
                .with_page("all", 0, &["1", "2"])
                .await
                .with_page("all", 1, &["3"])
                .await,
        );
        let cache = cache(&store, &source).with_appended_pages(true);

        let mut list = cache.get_articles("all").await.unwrap();
        let ts_before = store.get(&timestamp_key("all")).await.unwrap();
        cache.load_more(&mut list).await.unwrap();

        let entry = cache.read_entry("all").await.unwrap().unwrap();
        assert_eq!(entry.records, records(&["1", "2", "3"]));
        assert_eq!(Some(entry.fetched_at_ms.to_string()), ts_before);
    }

    #[tokio::test]
    async fn invalidate_forces_a_fetch() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "all", &["1", "2"], Duration::from_secs(10)).await;
        let source = Arc::new(MockSource::default().with_page("all", 0, &["5", "6"]).await);
        let cache = cache(&store, &source);

        cache.invalidate("all").await.unwrap();
        let list = cache.get_articles("all").await.unwrap();
        assert_eq!(list.nids(), vec!["5", "6"]);
    }
}
