use anyhow::Result;
use clap::Parser;
use pipeline_core::{
    load_url_list, Collector, Config, ContentExtractor, FeedFilter, FixedDelay, KeywordClassifier,
    ReportGenerator, RssFeed, Source,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "classify-posts")]
#[command(about = "Fetch newsletter posts and show which are articles and which are notices, without publishing")]
struct Args {
    /// File with one post URL per line (defaults to the RSS feed)
    #[arg(short, long)]
    urls_file: Option<PathBuf>,

    /// Only fetch the first N URLs
    #[arg(short, long)]
    max: Option<usize>,

    /// Seconds to wait between page fetches
    #[arg(long, default_value = "1")]
    delay_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let source = match &args.urls_file {
        Some(path) => {
            let urls = load_url_list(path)?;
            println!("📄 {} URLs in {}", urls.len(), path.display());
            if let (Some(first), Some(last)) = (urls.first(), urls.last()) {
                println!("  first: {}", first);
                println!("  last:  {}", last);
            }
            Source::Urls(urls)
        }
        None => {
            println!("📰 Reading feed {}", config.feed_url);
            Source::Feed
        }
    };

    let pacer = FixedDelay::from_secs(args.delay_secs);
    let extractor = ContentExtractor::new()?;
    let classifier = KeywordClassifier::default();
    let feed = RssFeed::new(config.feed_url.clone())?;
    let collector =
        Collector::new(&extractor, &classifier, &pacer).with_feed(&feed, FeedFilter::default());

    println!("\n🔍 Classifying posts...");
    let candidates = collector.collect(&source, args.max).await;

    if candidates.is_empty() {
        println!("Nothing to classify.");
        return Ok(());
    }

    println!("\n{}", ReportGenerator::render_classification(&candidates));

    Ok(())
}
