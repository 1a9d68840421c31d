use std::time::Duration;

use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{info, warn};
use url::Url;

use crate::errors::AppError;
use crate::models::RawArticle;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Scraper-wide settings plus the configured source list
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Per-source wall-clock budget; bounds the fan-in barrier
    pub timeout: Duration,
    /// Candidate articles kept per source page
    pub max_articles: usize,
    pub user_agent: String,
    pub sources: Vec<SourceConfig>,
}

impl ScrapeConfig {
    pub fn from_env() -> Self {
        let timeout_secs = std::env::var("SCRAPE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);
        let max_articles = std::env::var("SCRAPE_MAX_ARTICLES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(10);

        Self {
            timeout: Duration::from_secs(timeout_secs),
            max_articles,
            user_agent: BROWSER_USER_AGENT.to_string(),
            sources: SourceConfig::defaults(),
        }
    }
}

/// Extraction rules for one external news page. Each source differs only
/// in its URL and structural selectors; fetching and parsing are shared.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub label: String,
    pub base_url: String,
    pub page_path: String,
    /// Selects one element per candidate article
    pub article_selector: String,
    pub headline_selector: String,
    pub content_selector: String,
    /// Attribute on the headline element carrying the article link
    pub link_attr: String,
}

impl SourceConfig {
    pub fn moneycontrol() -> Self {
        Self {
            label: "Moneycontrol".to_string(),
            base_url: "https://www.moneycontrol.com".to_string(),
            page_path: "/news/business/stocks/".to_string(),
            article_selector: "li.clearfix".to_string(),
            headline_selector: "h2 a".to_string(),
            content_selector: "p".to_string(),
            link_attr: "href".to_string(),
        }
    }

    pub fn economic_times() -> Self {
        Self {
            label: "Economic Times".to_string(),
            base_url: "https://economictimes.indiatimes.com".to_string(),
            page_path: "/markets/stocks/news".to_string(),
            article_selector: "div[data-articleid]".to_string(),
            headline_selector: "h3 a, h4 a".to_string(),
            content_selector: "p".to_string(),
            link_attr: "href".to_string(),
        }
    }

    pub fn defaults() -> Vec<Self> {
        vec![Self::moneycontrol(), Self::economic_times()]
    }

    pub fn page_url(&self) -> String {
        format!("{}{}", self.base_url, self.page_path)
    }
}

/// Fetch one source page and extract up to `cap` candidate articles.
///
/// Any network error, non-success status or parse problem degrades to an
/// empty list: one failing source must never sink the whole run.
pub async fn fetch_source(client: &Client, source: &SourceConfig, cap: usize) -> Vec<RawArticle> {
    match try_fetch_source(client, source, cap).await {
        Ok(articles) => {
            info!(
                "Scraped {} articles from {} ({})",
                articles.len(),
                source.label,
                source.page_url()
            );
            articles
        }
        Err(e) => {
            warn!("Skipping source {}: {}", source.label, e);
            Vec::new()
        }
    }
}

async fn try_fetch_source(
    client: &Client,
    source: &SourceConfig,
    cap: usize,
) -> Result<Vec<RawArticle>, AppError> {
    let response = client
        .get(source.page_url())
        .send()
        .await
        .map_err(|e| AppError::External(format!("request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::External(format!("HTTP status {}", status)));
    }

    let html = response
        .text()
        .await
        .map_err(|e| AppError::External(format!("failed to read body: {}", e)))?;

    Ok(parse_articles(&html, source, cap))
}

/// Extract candidate articles from raw page markup.
///
/// Synchronous on purpose: `scraper::Html` is not `Send`, so the parsed
/// document must never be held across an await point.
pub fn parse_articles(html: &str, source: &SourceConfig, cap: usize) -> Vec<RawArticle> {
    let (Ok(article_sel), Ok(headline_sel), Ok(content_sel)) = (
        Selector::parse(&source.article_selector),
        Selector::parse(&source.headline_selector),
        Selector::parse(&source.content_selector),
    ) else {
        warn!("Invalid selector configuration for source {}", source.label);
        return Vec::new();
    };

    let base_url = Url::parse(&source.base_url).ok();
    let document = Html::parse_document(html);

    let mut articles = Vec::new();
    for element in document.select(&article_sel).take(cap) {
        let Some(headline_el) = element.select(&headline_sel).next() else {
            continue;
        };

        let headline = collect_text(headline_el);
        if headline.is_empty() {
            continue;
        }

        let content = element
            .select(&content_sel)
            .next()
            .map(collect_text)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| headline.clone());

        let href = headline_el.value().attr(&source.link_attr).unwrap_or("");
        let url = resolve_link(base_url.as_ref(), href);

        articles.push(RawArticle {
            headline,
            content,
            url,
            source: source.label.clone(),
        });
    }

    articles
}

fn collect_text(element: scraper::ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ").trim().to_string()
}

/// Resolve a possibly-relative link against the source base URL. An href
/// that is already absolute passes through unchanged.
fn resolve_link(base: Option<&Url>, href: &str) -> String {
    if href.is_empty() {
        return String::new();
    }
    match base.and_then(|b| b.join(href).ok()) {
        Some(resolved) => resolved.to_string(),
        None => href.to_string(),
    }
}
