use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::models::Article;

const TITLE_SELECTORS: &[&str] = &["h1", "[data-testid=\"post-title\"]", ".post-title"];

const BODY_SELECTORS: &[&str] = &[
    ".body.markup",
    "[data-testid=\"post-content\"]",
    ".post-content",
    "article",
    ".subtitle",
];

/// Fetches one newsletter post. `None` means "no usable content".
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<Article>;
}

pub struct ContentExtractor {
    client: Client,
}

impl ContentExtractor {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; SeitaiBlog/1.0)")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    async fn try_fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send HTTP request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP error: {}", status);
        }

        response.text().await.context("Failed to read response body")
    }
}

#[async_trait]
impl ArticleSource for ContentExtractor {
    async fn fetch(&self, url: &str) -> Option<Article> {
        let html = match self.try_fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(url, "failed to fetch article: {:#}", e);
                return None;
            }
        };

        let article = extract_article(&html, url);
        if article.is_none() {
            warn!(url, "no title found in page");
        }
        article
    }
}

/// Pulls title and body HTML out of a post page. Selectors are tried in
/// order; the first one with non-empty text wins. Pages matching none of
/// them fall back to every `<p>` on the page.
pub fn extract_article(html: &str, url: &str) -> Option<Article> {
    let document = Html::parse_document(html);

    let title = TITLE_SELECTORS.iter().find_map(|s| {
        let selector = Selector::parse(s).ok()?;
        let text: String = document.select(&selector).next()?.text().collect();
        let text = text.trim().to_string();
        (!text.is_empty()).then_some(text)
    })?;

    let content = BODY_SELECTORS
        .iter()
        .find_map(|s| {
            let selector = Selector::parse(s).ok()?;
            let element = document.select(&selector).next()?;
            let text: String = element.text().collect();
            (!text.trim().is_empty()).then(|| element.inner_html().trim().to_string())
        })
        .or_else(|| paragraphs(&document))
        .unwrap_or_default();

    debug!(url, title = %title, content_len = content.len(), "extracted article");

    Some(Article {
        title,
        content,
        url: url.to_string(),
    })
}

fn paragraphs(document: &Html) -> Option<String> {
    let selector = Selector::parse("p").ok()?;
    let parts: Vec<String> = document
        .select(&selector)
        .filter(|p| !p.text().collect::<String>().trim().is_empty())
        .map(|p| p.html())
        .collect();
    (!parts.is_empty()).then(|| parts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_substack_markup() {
        let html = r#"<html><body>
            <h1 class="post-title">  肩こりの原因とは </h1>
            <div class="body markup"><p>姿勢が大切です。</p></div>
        </body></html>"#;
        let article = extract_article(html, "https://x/p/a").unwrap();
        assert_eq!(article.title, "肩こりの原因とは");
        assert_eq!(article.content, "<p>姿勢が大切です。</p>");
        assert_eq!(article.url, "https://x/p/a");
    }

    #[test]
    fn test_falls_back_to_later_selectors() {
        let html = r#"<html><body>
            <div data-testid="post-title">腰痛</div>
            <div class="body markup">   </div>
            <article><p>本文</p></article>
        </body></html>"#;
        let article = extract_article(html, "https://x/p/b").unwrap();
        assert_eq!(article.title, "腰痛");
        assert_eq!(article.content, "<p>本文</p>");
    }

    #[test]
    fn test_missing_title_is_none() {
        let html = "<html><body><article>本文だけ</article></body></html>";
        assert!(extract_article(html, "https://x/p/c").is_none());
    }

    #[test]
    fn test_falls_back_to_paragraphs() {
        let html = r#"<html><body>
            <h1>姿勢の話</h1>
            <div class="wrapper"><p>猫背を直すには</p><p> </p></div>
            <section><p>毎日のストレッチ</p></section>
        </body></html>"#;
        let article = extract_article(html, "https://x/p/e").unwrap();
        assert_eq!(article.content, "<p>猫背を直すには</p>\n<p>毎日のストレッチ</p>");
    }

    #[test]
    fn test_missing_body_is_empty_content() {
        let html = "<html><body><h1>タイトル</h1></body></html>";
        let article = extract_article(html, "https://x/p/d").unwrap();
        assert!(article.content.is_empty());
    }
}
