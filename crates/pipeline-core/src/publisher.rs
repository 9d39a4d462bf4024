use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::PublishedPost;

/// Creates posts in the CMS. Implementations must only ever create drafts.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, title: &str, html: &str) -> Result<PublishedPost>;
}

#[derive(Serialize)]
struct CreatePost<'a> {
    title: &'a str,
    content: &'a str,
    status: &'static str,
}

#[derive(Deserialize)]
struct CreatedPost {
    #[serde(default)]
    id: serde_json::Value,
}

/// WordPress REST API (`/wp-json/wp/v2/posts`) with an application password.
pub struct WordPressClient {
    client: Client,
    site_url: String,
    username: String,
    app_password: String,
}

impl WordPressClient {
    pub fn new(site_url: &str, username: String, app_password: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            site_url: site_url.trim_end_matches('/').to_string(),
            username,
            app_password,
        })
    }

    pub fn posts_endpoint(&self) -> String {
        format!("{}/wp-json/wp/v2/posts", self.site_url)
    }

    pub fn edit_url(&self, id: &str) -> String {
        format!("{}/wp-admin/post.php?post={}&action=edit", self.site_url, id)
    }
}

/// WordPress returns a numeric id; accept strings too.
fn id_to_string(id: &serde_json::Value) -> Option<String> {
    match id {
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

#[async_trait]
impl Publisher for WordPressClient {
    async fn publish(&self, title: &str, html: &str) -> Result<PublishedPost> {
        let body = CreatePost {
            title,
            content: html,
            status: "draft",
        };

        let response = self
            .client
            .post(self.posts_endpoint())
            .basic_auth(&self.username, Some(&self.app_password))
            .json(&body)
            .send()
            .await
            .context("Failed to send request to WordPress")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("WordPress API returned error: {} - {}", status, error_text);
        }

        let created = response
            .json::<CreatedPost>()
            .await
            .context("Failed to parse WordPress API response")?;

        let id = id_to_string(&created.id).context("WordPress response has no post id")?;
        info!(post_id = %id, "draft created");

        Ok(PublishedPost {
            edit_url: self.edit_url(&id),
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_urls_from_site() {
        let wp = WordPressClient::new("https://tanizawaseitai.com/", "u".into(), "p".into()).unwrap();
        assert_eq!(wp.posts_endpoint(), "https://tanizawaseitai.com/wp-json/wp/v2/posts");
        assert_eq!(
            wp.edit_url("123"),
            "https://tanizawaseitai.com/wp-admin/post.php?post=123&action=edit"
        );
    }

    #[test]
    fn test_request_body_is_always_draft() {
        let body = CreatePost {
            title: "腰痛",
            content: "<p>x</p>",
            status: "draft",
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["status"], "draft");
        assert_eq!(value["title"], "腰痛");
    }

    #[test]
    fn test_id_to_string() {
        assert_eq!(id_to_string(&json!(57)), Some("57".to_string()));
        assert_eq!(id_to_string(&json!("abc")), Some("abc".to_string()));
        assert_eq!(id_to_string(&json!("")), None);
        assert_eq!(id_to_string(&json!(null)), None);
    }
}
