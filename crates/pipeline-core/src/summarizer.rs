use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Article;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Characters of article text sent to the model.
pub const MAX_INPUT_CHARS: usize = 2000;

const TITLE_MARKER: &str = "タイトル:";
const BODY_MARKER: &str = "本文:";

/// Rewrites a newsletter post as a blog post. Returns the raw model output.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, article: &Article) -> Result<String>;
}

/// Title and body pulled out of the summarizer output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizedPost {
    pub title: String,
    pub body: String,
}

/// Splits `タイトル: ...` / `本文: ...` output. A missing title falls back to
/// `fallback_title`, a missing body to the whole output.
pub fn parse_summary(raw: &str, fallback_title: &str) -> SummarizedPost {
    let title = raw
        .find(TITLE_MARKER)
        .map(|i| {
            let rest = &raw[i + TITLE_MARKER.len()..];
            rest.lines().next().unwrap_or("").trim().to_string()
        })
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| fallback_title.to_string());

    let body = raw
        .find(BODY_MARKER)
        .map(|i| raw[i + BODY_MARKER.len()..].trim().to_string())
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| raw.trim().to_string());

    SummarizedPost { title, body }
}

/// Truncates to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<Content>,
}

#[derive(Deserialize)]
struct Content {
    text: String,
}

pub struct ClaudeSummarizer {
    client: Client,
    api_key: String,
    model: String,
}

impl ClaudeSummarizer {
    pub fn new(api_key: String, model: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    fn build_prompt(article: &Article) -> String {
        let text = html2text::from_read(article.content.as_bytes(), 200);
        let truncated = truncate_chars(text.trim(), MAX_INPUT_CHARS);

        format!(
            r#"以下のメルマガ記事を印西市の整体院のブログ用に要約してください。

記事タイトル: {}
記事内容: {}...

要約の要件:
- 印西市の地域性を自然に盛り込む（不自然なキーワード詰め込みは避ける）
- 肩こり、腰痛、整体などの専門用語は文脈に合わせて自然に使用
- 500文字程度で要約
- 整体院の19年の実績を適切にアピール
- 読者にとって価値のある健康情報として提供
- 読みやすさを最優先にし、SEOは二次的に考慮

以下の形式で出力してください:
タイトル: [自然で読みやすいタイトル]
本文: [500文字程度の要約]"#,
            article.title, truncated
        )
    }
}

#[async_trait]
impl Summarizer for ClaudeSummarizer {
    async fn summarize(&self, article: &Article) -> Result<String> {
        let request = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: 1000,
            messages: vec![Message {
                role: "user".to_string(),
                content: Self::build_prompt(article),
            }],
        };

        debug!(url = %article.url, model = %self.model, "requesting summary");

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Claude API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Claude API error {}: {}", status, error_text);
        }

        let claude_response = response
            .json::<ClaudeResponse>()
            .await
            .context("Failed to parse Claude API response")?;

        let text = claude_response
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .unwrap_or_default();

        if text.trim().is_empty() {
            anyhow::bail!("Claude API returned an empty response");
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_summary_with_both_markers() {
        let raw = "タイトル: 印西市で肩こりを和らげる3つの習慣\n本文: デスクワークの合間に\n肩を回しましょう。";
        let post = parse_summary(raw, "元のタイトル");
        assert_eq!(post.title, "印西市で肩こりを和らげる3つの習慣");
        assert_eq!(post.body, "デスクワークの合間に\n肩を回しましょう。");
    }

    #[test]
    fn test_parse_summary_without_markers_falls_back() {
        let raw = "  要約だけが返ってきました。  ";
        let post = parse_summary(raw, "元のタイトル");
        assert_eq!(post.title, "元のタイトル");
        assert_eq!(post.body, "要約だけが返ってきました。");
    }

    #[test]
    fn test_parse_summary_title_only() {
        let raw = "タイトル: 腰痛の新常識\n本文がありません";
        let post = parse_summary(raw, "fallback");
        assert_eq!(post.title, "腰痛の新常識");
        assert_eq!(post.body, raw);
    }

    #[test]
    fn test_parse_summary_empty_title_uses_fallback() {
        let post = parse_summary("タイトル:\n本文: 中身", "fallback");
        assert_eq!(post.title, "fallback");
        assert_eq!(post.body, "中身");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("整体院です", 2), "整体");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_prompt_uses_plain_text_of_body() {
        let article = Article::new("肩こりの原因", "<p>肩こり</p>", "https://x/a");
        let prompt = ClaudeSummarizer::build_prompt(&article);
        assert!(prompt.contains("記事タイトル: 肩こりの原因"));
        assert!(prompt.contains("記事内容: 肩こり..."));
        assert!(!prompt.contains("<p>"));
    }
}
