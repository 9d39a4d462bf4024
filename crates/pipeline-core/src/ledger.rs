use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::models::{Article, PostedRecord};

/// Storage behind the ledger. Whole-collection load and replace.
pub trait LedgerPersistence: Send + Sync {
    /// Never fails: missing or unreadable state comes back empty.
    fn load(&self) -> Vec<PostedRecord>;
    /// Returns whether the records were durably written.
    fn save(&self, records: &[PostedRecord]) -> bool;
}

/// JSON file holding every published article.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<local data dir>/seitai-blog/posted_articles.json`
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .context("Could not determine local data directory")?
            .join("seitai-blog");

        Ok(data_dir.join("posted_articles.json"))
    }

    fn try_load(&self) -> Result<Vec<PostedRecord>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read ledger: {}", self.path.display()))?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).with_context(|| {
            format!(
                "Failed to parse ledger JSON from {}. The file may be corrupted.",
                self.path.display()
            )
        })
    }

    fn try_save(&self, records: &[PostedRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("Failed to create ledger directory")?;
            }
        }

        let json = serde_json::to_string_pretty(records).context("Failed to serialize ledger")?;

        // write next to the target and rename so a crash never leaves half a file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write ledger: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace ledger: {}", self.path.display()))?;

        Ok(())
    }
}

impl LedgerPersistence for LedgerStore {
    fn load(&self) -> Vec<PostedRecord> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no ledger yet, starting empty");
            return Vec::new();
        }

        match self.try_load() {
            Ok(records) => records,
            Err(e) => {
                warn!("{:#}; starting with an empty ledger", e);
                Vec::new()
            }
        }
    }

    fn save(&self, records: &[PostedRecord]) -> bool {
        match self.try_save(records) {
            Ok(()) => true,
            Err(e) => {
                warn!("{:#}; the last publish is not recorded on disk", e);
                false
            }
        }
    }
}

pub fn is_posted(records: &[PostedRecord], url: &str) -> bool {
    records.iter().any(|r| r.url == url)
}

/// Articles whose url is not in the ledger, in input order.
pub fn filter_unposted(records: &[PostedRecord], articles: &[Article]) -> Vec<Article> {
    let posted: HashSet<&str> = records.iter().map(|r| r.url.as_str()).collect();
    articles
        .iter()
        .filter(|a| !posted.contains(a.url.as_str()))
        .cloned()
        .collect()
}

/// What [`Ledger::record`] did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Added and written to the store.
    Saved,
    /// Added in memory, but the store write failed.
    Unsaved,
    /// The url was already present; nothing changed.
    Duplicate,
}

/// In-memory view of the ledger for one run, persisting on every append.
pub struct Ledger<'a> {
    records: Vec<PostedRecord>,
    store: &'a dyn LedgerPersistence,
}

impl<'a> Ledger<'a> {
    pub fn open(store: &'a dyn LedgerPersistence) -> Self {
        let records = store.load();
        info!(count = records.len(), "ledger loaded");
        Self { records, store }
    }

    pub fn contains(&self, url: &str) -> bool {
        is_posted(&self.records, url)
    }

    pub fn records(&self) -> &[PostedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends and rewrites the whole ledger. A record whose url is already
    /// present is not added twice.
    pub fn record(&mut self, record: PostedRecord) -> RecordOutcome {
        if self.contains(&record.url) {
            warn!(url = %record.url, "url already in ledger, not recording again");
            return RecordOutcome::Duplicate;
        }
        self.records.push(record);
        if self.store.save(&self.records) {
            RecordOutcome::Saved
        } else {
            RecordOutcome::Unsaved
        }
    }
}
