use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ItemError;

/// A scraped newsletter post. `url` is the dedup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub content: String,
    pub url: String,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            url: url.into(),
        }
    }
}

/// One entry from the newsletter feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleKind {
    Notice,
    Article,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub is_notice: bool,
    pub is_article: bool,
    pub kind: ArticleKind,
}

impl Classification {
    pub fn from_notice(is_notice: bool) -> Self {
        Self {
            is_notice,
            is_article: !is_notice,
            kind: if is_notice {
                ArticleKind::Notice
            } else {
                ArticleKind::Article
            },
        }
    }
}

/// One successfully published article, as stored in the ledger file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedRecord {
    pub url: String,
    pub title: String,
    pub remote_id: String,
    pub posted_at: DateTime<Utc>,
}

/// What the CMS hands back after creating a draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub id: String,
    pub edit_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub success: bool,
    pub remote_id: Option<String>,
    pub edit_reference: Option<String>,
    pub error: Option<ItemError>,
}

impl PublishOutcome {
    pub fn published(post: &PublishedPost) -> Self {
        Self {
            success: true,
            remote_id: Some(post.id.clone()),
            edit_reference: Some(post.edit_url.clone()),
            error: None,
        }
    }

    pub fn failed(error: ItemError) -> Self {
        Self {
            success: false,
            remote_id: None,
            edit_reference: None,
            error: Some(error),
        }
    }
}

/// Result for one attempted article. `title` is the title sent to the CMS
/// (the summarized one when summarization ran).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub original: Article,
    pub title: String,
    pub outcome: PublishOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub results: Vec<BatchResult>,
    pub skipped_posted: usize,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &BatchResult> {
        self.results.iter().filter(|r| r.outcome.success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &BatchResult> {
        self.results.iter().filter(|r| !r.outcome.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_flags_are_complementary() {
        let notice = Classification::from_notice(true);
        assert!(notice.is_notice);
        assert!(!notice.is_article);
        assert_eq!(notice.kind, ArticleKind::Notice);

        let article = Classification::from_notice(false);
        assert!(!article.is_notice);
        assert!(article.is_article);
        assert_eq!(article.kind, ArticleKind::Article);
    }

    #[test]
    fn test_report_partitions_results() {
        let article = Article::new("t", "c", "https://x/a");
        let ok = BatchResult {
            original: article.clone(),
            title: "t".to_string(),
            outcome: PublishOutcome::published(&PublishedPost {
                id: "1".to_string(),
                edit_url: "https://cms/edit/1".to_string(),
            }),
        };
        let bad = BatchResult {
            original: article,
            title: "t".to_string(),
            outcome: PublishOutcome::failed(ItemError::Publish("401".to_string())),
        };
        let report = BatchReport {
            results: vec![ok, bad],
            skipped_posted: 0,
        };

        assert_eq!(report.succeeded().count(), 1);
        assert_eq!(report.failed().count(), 1);
    }
}
