use anyhow::Result;
use clap::Parser;
use pipeline_core::{
    filter_unposted, load_url_list, BatchOptions, BatchProcessor, ClaudeSummarizer, Collector,
    Config, ContentExtractor, ContentTransformer, FeedFilter, FixedDelay, KeywordClassifier,
    Ledger, LedgerStore, ReportGenerator, RssFeed, Source, WordPressClient,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "publish-drafts")]
#[command(about = "Turn newsletter posts into WordPress drafts, skipping anything already posted")]
struct Args {
    /// File with one post URL per line (defaults to the RSS feed)
    #[arg(short, long)]
    urls_file: Option<PathBuf>,

    /// Maximum number of articles to attempt in this run
    #[arg(short, long, default_value = "3")]
    limit: usize,

    /// Rewrite each post with Claude before publishing
    #[arg(short, long)]
    summarize: bool,

    /// Seconds to wait between external calls
    #[arg(long, default_value = "2")]
    delay_secs: u64,

    /// Give up on a summarize or publish call after this many seconds
    #[arg(long, default_value = "60")]
    timeout_secs: u64,

    /// Ledger file of already-published URLs
    #[arg(long)]
    ledger: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let wp = config.require_wordpress()?;
    let publisher = WordPressClient::new(&wp.site_url, wp.username.clone(), wp.app_password.clone())?;

    let summarizer = if args.summarize {
        let key = config.require_anthropic_key()?;
        Some(ClaudeSummarizer::new(key.to_string(), config.claude_model.clone())?)
    } else {
        None
    };

    let ledger_path = match args.ledger.or_else(|| config.ledger_path.clone()) {
        Some(path) => path,
        None => LedgerStore::default_path()?,
    };

    let source = match &args.urls_file {
        Some(path) => {
            let urls = load_url_list(path)?;
            println!("📄 Loaded {} URLs from {}", urls.len(), path.display());
            Source::Urls(urls)
        }
        None => {
            println!("📰 Reading feed {}", config.feed_url);
            Source::Feed
        }
    };

    let store = LedgerStore::new(&ledger_path);
    let mut ledger = Ledger::open(&store);
    println!("✓ Ledger {} has {} entries", ledger_path.display(), ledger.len());

    let pacer = FixedDelay::from_secs(args.delay_secs);
    let extractor = ContentExtractor::new()?;
    let classifier = KeywordClassifier::default();
    let feed = RssFeed::new(config.feed_url.clone())?;
    let collector = Collector::new(&extractor, &classifier, &pacer)
        .with_feed(&feed, FeedFilter::default())
        .skip_posted(ledger.records());

    println!("\n🌐 Fetching and classifying posts...");
    let candidates = collector.collect(&source, None).await;

    println!(
        "✓ {} articles, {} notices excluded, {} unavailable, {} already posted",
        candidates.articles.len(),
        candidates.notices.len(),
        candidates.unavailable.len(),
        candidates.already_posted
    );

    if candidates.articles.is_empty() {
        println!("No publishable articles found.");
        return Ok(());
    }

    let unposted = filter_unposted(ledger.records(), &candidates.articles);

    if unposted.is_empty() {
        println!("Everything is already posted.");
        return Ok(());
    }

    let transformer = ContentTransformer::default();
    let options = BatchOptions {
        batch_limit: args.limit,
        call_timeout: Duration::from_secs(args.timeout_secs),
    };
    let mut processor = BatchProcessor::new(&publisher, &transformer, &pacer, options);
    if let Some(summarizer) = &summarizer {
        processor = processor.with_summarizer(summarizer);
    }

    println!("\n📝 Publishing up to {} drafts...", args.limit);
    let report = processor.process_batch(&mut ledger, &unposted).await;

    println!("\n{}", ReportGenerator::render_batch(&report));

    if report.succeeded().count() > 0 {
        println!("Next: review the drafts in the WordPress admin and publish the ones that look right.");
    }

    Ok(())
}
