use chrono::Utc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::classifier::{split_notices, Classify, FeedFilter};
use crate::error::ItemError;
use crate::extractor::ArticleSource;
use crate::feed::FeedSource;
use crate::ledger::{is_posted, Ledger, RecordOutcome};
use crate::models::{Article, BatchReport, BatchResult, PostedRecord, PublishOutcome};
use crate::pacing::Pacer;
use crate::publisher::Publisher;
use crate::sources::Source;
use crate::summarizer::{parse_summary, Summarizer};
use crate::transform::{ContentTransformer, PublishableArticle};

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Attempted articles per run; already-posted ones don't count.
    pub batch_limit: usize,
    /// Upper bound for each summarize or publish call.
    pub call_timeout: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_limit: 3,
            call_timeout: Duration::from_secs(60),
        }
    }
}

/// Turns candidate articles into CMS drafts, one at a time.
pub struct BatchProcessor<'a> {
    publisher: &'a dyn Publisher,
    summarizer: Option<&'a dyn Summarizer>,
    transformer: &'a ContentTransformer,
    pacer: &'a dyn Pacer,
    options: BatchOptions,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(
        publisher: &'a dyn Publisher,
        transformer: &'a ContentTransformer,
        pacer: &'a dyn Pacer,
        options: BatchOptions,
    ) -> Self {
        Self {
            publisher,
            summarizer: None,
            transformer,
            pacer,
            options,
        }
    }

    pub fn with_summarizer(mut self, summarizer: &'a dyn Summarizer) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Never aborts: every attempted article gets a result entry, and
    /// successes are persisted to the ledger as they happen.
    pub async fn process_batch(&self, ledger: &mut Ledger<'_>, articles: &[Article]) -> BatchReport {
        let mut report = BatchReport::default();
        let limit = self.options.batch_limit;

        info!(candidates = articles.len(), limit, "starting batch");

        for article in articles {
            if report.results.len() >= limit {
                break;
            }

            if ledger.contains(&article.url) {
                info!(url = %article.url, "already posted, skipping");
                report.skipped_posted += 1;
                continue;
            }

            if !report.results.is_empty() {
                self.pacer.pause().await;
            }

            info!(
                "[{}/{}] processing: {}",
                report.results.len() + 1,
                limit.min(articles.len()),
                article.title
            );

            let result = self.process_one(ledger, article).await;
            match &result.outcome.error {
                None => info!(
                    edit_url = result.outcome.edit_reference.as_deref().unwrap_or(""),
                    "draft created: {}", result.title
                ),
                Some(e) => warn!(url = %article.url, "{}", e),
            }
            report.results.push(result);
        }

        info!(
            attempted = report.results.len(),
            succeeded = report.succeeded().count(),
            skipped = report.skipped_posted,
            "batch finished"
        );
        report
    }

    async fn process_one(&self, ledger: &mut Ledger<'_>, article: &Article) -> BatchResult {
        let ready = match self.prepare(article).await {
            Ok(ready) => ready,
            Err(e) => {
                return BatchResult {
                    original: article.clone(),
                    title: article.title.clone(),
                    outcome: PublishOutcome::failed(e),
                }
            }
        };

        let outcome = match timeout(
            self.options.call_timeout,
            self.publisher.publish(&ready.title, &ready.body),
        )
        .await
        {
            Ok(Ok(post)) => {
                let record = PostedRecord {
                    url: article.url.clone(),
                    title: ready.title.clone(),
                    remote_id: post.id.clone(),
                    posted_at: Utc::now(),
                };
                match ledger.record(record) {
                    RecordOutcome::Saved => {}
                    RecordOutcome::Unsaved => error!(
                        url = %article.url,
                        "draft created but ledger not saved; it may be posted again next run"
                    ),
                    RecordOutcome::Duplicate => {
                        warn!(url = %article.url, "draft created for a url that was already recorded")
                    }
                }
                PublishOutcome::published(&post)
            }
            Ok(Err(e)) => PublishOutcome::failed(ItemError::Publish(format!("{:#}", e))),
            Err(_) => PublishOutcome::failed(ItemError::Timeout {
                stage: "publish",
                after: self.options.call_timeout,
            }),
        };

        BatchResult {
            original: article.clone(),
            title: ready.title,
            outcome,
        }
    }

    /// Nothing is published when promotion stripping leaves an empty body.
    async fn prepare(&self, article: &Article) -> Result<PublishableArticle, ItemError> {
        let ready = self.render(article).await?;
        if !ready.has_content {
            return Err(ItemError::EmptyBody);
        }
        Ok(ready)
    }

    async fn render(&self, article: &Article) -> Result<PublishableArticle, ItemError> {
        let Some(summarizer) = self.summarizer else {
            return Ok(self.transformer.prepare_for_publish(article));
        };

        let raw = match timeout(self.options.call_timeout, summarizer.summarize(article)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => return Err(ItemError::Summarize(format!("{:#}", e))),
            Err(_) => {
                return Err(ItemError::Timeout {
                    stage: "summarize",
                    after: self.options.call_timeout,
                })
            }
        };

        let summary = parse_summary(&raw, &article.title);
        Ok(self
            .transformer
            .prepare_summary(&summary.title, &summary.body))
    }
}

/// Fetched and classified posts, ready for the batch.
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    pub articles: Vec<Article>,
    pub notices: Vec<Article>,
    /// URLs that produced no usable content
    pub unavailable: Vec<String>,
    /// URLs dropped before fetching because the ledger has them
    pub already_posted: usize,
}

impl Candidates {
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty() && self.notices.is_empty() && self.unavailable.is_empty()
    }
}

/// Resolves a [`Source`] into classified articles.
pub struct Collector<'a> {
    fetcher: &'a dyn ArticleSource,
    classifier: &'a dyn Classify,
    pacer: &'a dyn Pacer,
    feed: Option<(&'a dyn FeedSource, FeedFilter)>,
    posted: &'a [PostedRecord],
}

impl<'a> Collector<'a> {
    pub fn new(
        fetcher: &'a dyn ArticleSource,
        classifier: &'a dyn Classify,
        pacer: &'a dyn Pacer,
    ) -> Self {
        Self {
            fetcher,
            classifier,
            pacer,
            feed: None,
            posted: &[],
        }
    }

    pub fn with_feed(mut self, feed: &'a dyn FeedSource, filter: FeedFilter) -> Self {
        self.feed = Some((feed, filter));
        self
    }

    /// URLs already in `records` are never fetched.
    pub fn skip_posted(mut self, records: &'a [PostedRecord]) -> Self {
        self.posted = records;
        self
    }

    /// URLs for the source. Feed errors are logged and yield nothing.
    pub async fn urls(&self, source: &Source) -> Vec<String> {
        match source {
            Source::Urls(urls) => urls.clone(),
            Source::Feed => {
                let Some((feed, filter)) = &self.feed else {
                    error!("feed source requested but no feed is configured");
                    return Vec::new();
                };
                match feed.fetch_items().await {
                    Ok(items) => {
                        let total = items.len();
                        let kept = filter.retain_content(items);
                        info!(total, kept = kept.len(), "feed items after title filter");
                        kept.into_iter().map(|item| item.link).collect()
                    }
                    Err(e) => {
                        error!("{:#}", e);
                        Vec::new()
                    }
                }
            }
        }
    }

    /// Fetches up to `max` URLs in order, pausing between fetches, and
    /// splits the results into articles and notices.
    pub async fn collect(&self, source: &Source, max: Option<usize>) -> Candidates {
        let mut urls = self.urls(source).await;
        let before = urls.len();
        urls.retain(|url| !is_posted(self.posted, url));
        let already_posted = before - urls.len();
        if already_posted > 0 {
            info!(already_posted, "skipping URLs already in the ledger");
        }

        if urls.is_empty() {
            warn!("no candidate URLs, nothing to do");
            return Candidates {
                already_posted,
                ..Default::default()
            };
        }

        let take = max.unwrap_or(urls.len()).min(urls.len());
        info!(total = urls.len(), fetching = take, "collecting articles");

        let mut fetched = Vec::new();
        let mut unavailable = Vec::new();
        for (i, url) in urls.iter().take(take).enumerate() {
            if i > 0 {
                self.pacer.pause().await;
            }
            match self.fetcher.fetch(url).await {
                Some(article) => fetched.push(article),
                None => unavailable.push(url.clone()),
            }
        }

        let (articles, notices) = split_notices(self.classifier, fetched);
        for notice in &notices {
            info!("notice excluded: {}", notice.title);
        }

        Candidates {
            articles,
            notices,
            unavailable,
            already_posted,
        }
    }
}
