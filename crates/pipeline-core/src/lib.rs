// Public modules
pub mod classifier;
pub mod config;
pub mod error;
pub mod extractor;
pub mod feed;
pub mod ledger;
pub mod models;
pub mod pacing;
pub mod pipeline;
pub mod publisher;
pub mod report;
pub mod sources;
pub mod summarizer;
pub mod transform;

// Re-export commonly used types
pub use classifier::{Classify, FeedFilter, KeywordClassifier};
pub use config::Config;
pub use error::ItemError;
pub use extractor::{ArticleSource, ContentExtractor};
pub use feed::{FeedSource, RssFeed};
pub use ledger::{filter_unposted, is_posted, Ledger, LedgerPersistence, LedgerStore, RecordOutcome};
pub use models::{Article, BatchReport, BatchResult, Classification, FeedItem, PostedRecord};
pub use pacing::{FixedDelay, Pacer};
pub use pipeline::{BatchOptions, BatchProcessor, Candidates, Collector};
pub use publisher::{Publisher, WordPressClient};
pub use report::ReportGenerator;
pub use sources::{load_url_list, Source};
pub use summarizer::{ClaudeSummarizer, Summarizer};
pub use transform::{ContentTransformer, RemovalRule};
