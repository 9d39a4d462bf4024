use anyhow::{Context, Result};
use async_trait::async_trait;
use feed_rs::parser;
use reqwest::Client;
use tracing::{debug, info};

use crate::models::FeedItem;

pub const DEFAULT_FEED_URL: &str = "https://tanizawaseitai.substack.com/feed";

/// Lists newsletter posts, newest first as the feed orders them.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_items(&self) -> Result<Vec<FeedItem>>;
}

pub struct RssFeed {
    client: Client,
    url: String,
}

impl RssFeed {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl FeedSource for RssFeed {
    async fn fetch_items(&self) -> Result<Vec<FeedItem>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch feed {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Feed returned error: {}", status);
        }

        let body = response.bytes().await.context("Failed to read feed body")?;
        let items = parse_feed(&body)?;
        info!(url = %self.url, count = items.len(), "feed fetched");
        Ok(items)
    }
}

/// Entries without a link are dropped.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedItem>> {
    let feed = parser::parse(bytes).context("Failed to parse feed")?;

    Ok(feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let link = entry.links.first()?.href.clone();
            let title = entry
                .title
                .map(|t| t.content)
                .unwrap_or_else(|| "Untitled".to_string());
            debug!(title = %title, link = %link, "feed entry");
            Some(FeedItem { title, link })
        })
        .collect())
}
