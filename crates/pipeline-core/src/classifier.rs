use tracing::debug;

use crate::models::{Article, Classification, FeedItem};

/// Keywords marking an operational notice (closures, hours, holidays, shrine events).
pub const DEFAULT_NOTICE_KEYWORDS: &[&str] = &[
    "お知らせ",
    "休業",
    "営業時間",
    "臨時",
    "神獅子舞",
    "年末年始",
    "ゴールデンウィーク",
    "夏季休暇",
    "定休日",
    "変更",
    "休診",
    "休館",
    "神社",
    "奉納",
];

/// Title-only keywords used to drop feed entries before anything is fetched.
pub const DEFAULT_FEED_KEYWORDS: &[&str] = &["お知らせ", "休業", "営業時間"];

/// Decides whether a post is a notice or content worth publishing.
pub trait Classify: Send + Sync {
    fn classify(&self, title: &str, content: &str) -> Classification;
}

/// Case-insensitive substring match against a fixed keyword list.
///
/// A keyword hidden inside an unrelated word still counts as a hit.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

impl KeywordClassifier {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: lowercase_all(keywords),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_KEYWORDS)
    }
}

impl Classify for KeywordClassifier {
    fn classify(&self, title: &str, content: &str) -> Classification {
        let title_lower = title.to_lowercase();
        let content_lower = content.to_lowercase();

        let hit = self
            .keywords
            .iter()
            .find(|k| title_lower.contains(k.as_str()) || content_lower.contains(k.as_str()));

        if let Some(keyword) = hit {
            debug!(keyword = %keyword, title, "classified as notice");
        }

        Classification::from_notice(hit.is_some())
    }
}

/// Splits articles into (content, notices), keeping input order in both.
pub fn split_notices(
    classifier: &dyn Classify,
    articles: Vec<Article>,
) -> (Vec<Article>, Vec<Article>) {
    articles
        .into_iter()
        .partition(|a| classifier.classify(&a.title, &a.content).is_article)
}

/// Cheap title-only filter applied to feed entries.
#[derive(Debug, Clone)]
pub struct FeedFilter {
    keywords: Vec<String>,
}

impl FeedFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: lowercase_all(keywords),
        }
    }

    pub fn retain_content(&self, items: Vec<FeedItem>) -> Vec<FeedItem> {
        items
            .into_iter()
            .filter(|item| {
                let title = item.title.to_lowercase();
                !self.keywords.iter().any(|k| title.contains(k.as_str()))
            })
            .collect()
    }
}

impl Default for FeedFilter {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_KEYWORDS)
    }
}

fn lowercase_all<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|k| k.as_ref().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            link: format!("https://example.com/{}", title.len()),
        }
    }

    #[test]
    fn test_keyword_in_title_is_notice() {
        let c = KeywordClassifier::default();
        let result = c.classify("定休日のお知らせ", "来週はお休みです");
        assert!(result.is_notice);
        assert!(!result.is_article);
    }

    #[test]
    fn test_keyword_in_content_only_is_notice() {
        let c = KeywordClassifier::default();
        let result = c.classify("今月の予定", "年末年始は12月29日から休みます");
        assert!(result.is_notice);
    }

    #[test]
    fn test_health_article_is_article() {
        let c = KeywordClassifier::default();
        let result = c.classify("肩こりの原因とは", "デスクワークで固まった筋肉をほぐす方法");
        assert!(result.is_article);
    }

    #[test]
    fn test_matching_ignores_ascii_case() {
        let c = KeywordClassifier::new(["Closed"]);
        assert!(c.classify("WE ARE CLOSED TODAY", "").is_notice);
        assert!(c.classify("", "shop closed on monday").is_notice);
        assert!(c.classify("Open as usual", "see you").is_article);
    }

    #[test]
    fn test_substring_inside_other_word_still_matches() {
        // "変更" inside "変更点" is a hit even when the post is a health article
        let c = KeywordClassifier::default();
        assert!(c.classify("ストレッチの変更点", "").is_notice);
    }

    #[test]
    fn test_empty_keyword_list_never_flags() {
        let c = KeywordClassifier::new(Vec::<String>::new());
        assert!(c.classify("お知らせ", "休業").is_article);
    }

    #[test]
    fn test_empty_keywords_are_dropped() {
        let c = KeywordClassifier::new(["", "休業"]);
        assert_eq!(c.keywords(), &["休業".to_string()]);
        assert!(c.classify("腰痛", "").is_article);
    }

    #[test]
    fn test_split_notices_keeps_second_only() {
        let c = KeywordClassifier::default();
        let articles = vec![
            Article::new("定休日のお知らせ", "", "https://x/1"),
            Article::new("肩こりの原因とは", "姿勢の話", "https://x/2"),
        ];
        let (content, notices) = split_notices(&c, articles);
        assert_eq!(content.len(), 1);
        assert_eq!(content[0].title, "肩こりの原因とは");
        assert_eq!(notices.len(), 1);
    }

    #[test]
    fn test_feed_filter_uses_title_only() {
        let filter = FeedFilter::default();
        let kept = filter.retain_content(vec![
            item("営業時間変更のお知らせ"),
            item("腰痛とストレッチ"),
            item("臨時休業について"),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "腰痛とストレッチ");
    }
}
