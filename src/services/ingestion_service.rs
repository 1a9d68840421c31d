use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::Client;
use tracing::{debug, error, info, warn};

use crate::errors::AppError;
use crate::models::{CreateNewsItem, IngestSummary, RawArticle};
use crate::services::scrape::{self, ScrapeConfig, SourceConfig};
use crate::services::tagging::Tagger;

/// Storage seam for ingested news. The Postgres implementation lives in
/// `db::news_queries`; tests substitute an in-memory double.
#[async_trait]
pub trait NewsStore: Send + Sync {
    /// Insert a single item, stamped with the run's publish instant.
    /// `Ok(false)` means the row was skipped as a duplicate.
    async fn insert(
        &self,
        item: &CreateNewsItem,
        published_at: DateTime<Utc>,
    ) -> Result<bool, AppError>;
}

/// Runs the scrape → tag → persist pipeline for one ingestion request.
pub struct IngestionService {
    client: Client,
    timeout: Duration,
    max_articles: usize,
    sources: Vec<SourceConfig>,
    tagger: Tagger,
}

impl IngestionService {
    pub fn new(config: ScrapeConfig, tagger: Tagger) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            timeout: config.timeout,
            max_articles: config.max_articles,
            sources: config.sources,
            tagger,
        })
    }

    pub fn source_labels(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.label.clone()).collect()
    }

    /// Fetch every configured source concurrently and tag the merged
    /// result. The barrier waits for all sources; merge order follows the
    /// static source configuration order, never completion order.
    pub async fn collect(&self) -> Vec<CreateNewsItem> {
        let fetches = self.sources.iter().map(|source| async move {
            let fetch = scrape::fetch_source(&self.client, source, self.max_articles);
            match tokio::time::timeout(self.timeout, fetch).await {
                Ok(articles) => articles,
                Err(_) => {
                    warn!(
                        "Source {} timed out after {:?}",
                        source.label, self.timeout
                    );
                    Vec::new()
                }
            }
        });

        join_all(fetches)
            .await
            .into_iter()
            .flatten()
            .filter(|raw| !raw.headline.is_empty())
            .map(|raw| self.tag(raw))
            .collect()
    }

    fn tag(&self, raw: RawArticle) -> CreateNewsItem {
        let text = format!("{} {}", raw.headline, raw.content);
        let symbol = self.tagger.extract_symbol(&text);
        let sentiment = self.tagger.classify_sentiment(&text);
        let ai_summary = format!(
            "Market news about {} showing {} sentiment based on content analysis.",
            symbol, sentiment
        );

        CreateNewsItem {
            headline: raw.headline,
            content: raw.content,
            source: raw.source,
            url: raw.url,
            symbol,
            sentiment,
            ai_summary,
        }
    }

    /// One full ingestion run: collect, persist, summarize
    pub async fn run(&self, store: &dyn NewsStore) -> Result<IngestSummary, AppError> {
        info!(
            "Starting news ingestion across {} sources",
            self.sources.len()
        );

        let items = self.collect().await;
        let inserted = persist(store, &items).await;

        info!(
            "Ingestion run complete: scraped {}, inserted {}",
            items.len(),
            inserted
        );

        Ok(IngestSummary {
            success: true,
            scraped: items.len(),
            inserted,
            sources: self.source_labels(),
        })
    }
}

/// Insert items one at a time, sharing a single publish instant for the
/// run. A failed insert is logged and skipped; later items are still
/// attempted and no transaction spans the batch.
pub async fn persist(store: &dyn NewsStore, items: &[CreateNewsItem]) -> usize {
    let published_at = Utc::now();
    let mut inserted = 0;

    for item in items {
        match store.insert(item, published_at).await {
            Ok(true) => inserted += 1,
            Ok(false) => debug!(
                "Skipping duplicate article '{}' from {}",
                item.headline, item.source
            ),
            Err(e) => error!("Failed to insert article '{}': {}", item.headline, e),
        }
    }

    inserted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sentiment;
    use crate::services::tagging::TaggingConfig;
    use httpmock::prelude::*;
    use std::sync::Mutex;

    const PAGE: &str = r#"
        <li class="clearfix">
            <h2><a href="/a1">INFY profit rises on strong deal wins</a></h2>
            <p>Margins expanded during the quarter.</p>
        </li>
        <li class="clearfix">
            <h2><a href="/a2">ADANI stock falls after weak update</a></h2>
            <p>Volumes declined across ports.</p>
        </li>
    "#;

    const OTHER_PAGE: &str = r#"
        <li class="clearfix">
            <h2><a href="/b1">Markets await policy decision</a></h2>
            <p>Traders stay on the sidelines.</p>
        </li>
    "#;

    #[derive(Default)]
    struct MemStore {
        /// (headline, published_at) per successful insert
        rows: Mutex<Vec<(String, DateTime<Utc>)>>,
        /// headlines that fail with a storage error
        failing: Vec<String>,
        /// headlines reported as duplicates
        duplicates: Vec<String>,
        attempts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NewsStore for MemStore {
        async fn insert(
            &self,
            item: &CreateNewsItem,
            published_at: DateTime<Utc>,
        ) -> Result<bool, AppError> {
            self.attempts.lock().unwrap().push(item.headline.clone());
            if self.failing.contains(&item.headline) {
                return Err(AppError::Validation("boom".to_string()));
            }
            if self.duplicates.contains(&item.headline) {
                return Ok(false);
            }
            self.rows
                .lock()
                .unwrap()
                .push((item.headline.clone(), published_at));
            Ok(true)
        }
    }

    fn item(headline: &str) -> CreateNewsItem {
        CreateNewsItem {
            headline: headline.to_string(),
            content: headline.to_string(),
            source: "Test".to_string(),
            url: String::new(),
            symbol: "NIFTY".to_string(),
            sentiment: Sentiment::Neutral,
            ai_summary: String::new(),
        }
    }

    fn service_for(sources: Vec<SourceConfig>) -> IngestionService {
        let config = ScrapeConfig {
            timeout: Duration::from_secs(5),
            max_articles: 10,
            user_agent: "test-agent".to_string(),
            sources,
        };
        let tagger = Tagger::new(TaggingConfig::default()).unwrap();
        IngestionService::new(config, tagger).unwrap()
    }

    fn mock_source(server: &MockServer, path: &str, label: &str) -> SourceConfig {
        SourceConfig {
            label: label.to_string(),
            base_url: server.base_url(),
            page_path: path.to_string(),
            ..SourceConfig::moneycontrol()
        }
    }

    #[tokio::test]
    async fn test_persist_isolates_individual_failures() {
        let items = vec![item("one"), item("two"), item("three")];
        let store = MemStore {
            failing: vec!["two".to_string()],
            ..MemStore::default()
        };

        let inserted = persist(&store, &items).await;

        assert_eq!(inserted, items.len() - 1);
        // the failure of item two never prevents item three from being tried
        assert_eq!(
            *store.attempts.lock().unwrap(),
            vec!["one", "two", "three"]
        );
    }

    #[tokio::test]
    async fn test_persist_counts_duplicates_as_not_inserted() {
        let items = vec![item("fresh"), item("already-seen")];
        let store = MemStore {
            duplicates: vec!["already-seen".to_string()],
            ..MemStore::default()
        };

        let inserted = persist(&store, &items).await;

        assert_eq!(inserted, 1);
        assert_eq!(store.attempts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_persist_shares_one_publish_instant() {
        let items = vec![item("one"), item("two"), item("three")];
        let store = MemStore::default();

        persist(&store, &items).await;

        let rows = store.rows.lock().unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|(_, ts)| *ts == rows[0].1));
    }

    #[tokio::test]
    async fn test_collect_tags_articles() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/one");
                then.status(200).body(PAGE);
            })
            .await;

        let service = service_for(vec![mock_source(&server, "/one", "One")]);
        let items = service.collect().await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].symbol, "INFY");
        assert_eq!(items[0].sentiment, Sentiment::Positive);
        assert_eq!(
            items[0].ai_summary,
            "Market news about INFY showing positive sentiment based on content analysis."
        );
        assert_eq!(items[1].symbol, "ADANI");
        assert_eq!(items[1].sentiment, Sentiment::Negative);
    }

    #[tokio::test]
    async fn test_collect_failing_source_equals_absent_source() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/good");
                then.status(200).body(PAGE);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/broken");
                then.status(500);
            })
            .await;

        let with_broken = service_for(vec![
            mock_source(&server, "/good", "Good"),
            mock_source(&server, "/broken", "Broken"),
        ]);
        let without_broken = service_for(vec![mock_source(&server, "/good", "Good")]);

        let a: Vec<String> = with_broken
            .collect()
            .await
            .into_iter()
            .map(|i| i.headline)
            .collect();
        let b: Vec<String> = without_broken
            .collect()
            .await
            .into_iter()
            .map(|i| i.headline)
            .collect();

        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_collect_merge_follows_source_order() {
        let server = MockServer::start_async().await;
        // first source answers slower than the second
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow");
                then.status(200)
                    .body(PAGE)
                    .delay(Duration::from_millis(200));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/fast");
                then.status(200).body(OTHER_PAGE);
            })
            .await;

        let service = service_for(vec![
            mock_source(&server, "/slow", "Slow"),
            mock_source(&server, "/fast", "Fast"),
        ]);
        let items = service.collect().await;

        let sources: Vec<&str> = items.iter().map(|i| i.source.as_str()).collect();
        assert_eq!(sources, vec!["Slow", "Slow", "Fast"]);
    }

    #[tokio::test]
    async fn test_run_with_all_sources_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/a");
                then.status(404);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/b");
                then.status(200).body("<html><body></body></html>");
            })
            .await;

        let service = service_for(vec![
            mock_source(&server, "/a", "A"),
            mock_source(&server, "/b", "B"),
        ]);
        let store = MemStore::default();

        let summary = service.run(&store).await.unwrap();

        assert!(summary.success);
        assert_eq!(summary.scraped, 0);
        assert_eq!(summary.inserted, 0);
        assert_eq!(summary.sources, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_slow_source_is_bounded_by_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/hang");
                then.status(200)
                    .body(PAGE)
                    .delay(Duration::from_secs(5));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/ok");
                then.status(200).body(OTHER_PAGE);
            })
            .await;

        let config = ScrapeConfig {
            timeout: Duration::from_millis(300),
            max_articles: 10,
            user_agent: "test-agent".to_string(),
            sources: vec![
                mock_source(&server, "/hang", "Hang"),
                mock_source(&server, "/ok", "Ok"),
            ],
        };
        let tagger = Tagger::new(TaggingConfig::default()).unwrap();
        let service = IngestionService::new(config, tagger).unwrap();

        let items = service.collect().await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source, "Ok");
    }
}
