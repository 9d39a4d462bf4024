use std::time::Duration;
use thiserror::Error;

/// Why a single article did not end up as a draft.
///
/// These are collected into the batch report instead of being propagated,
/// so one bad article never stops the rest of the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error("summarization failed: {0}")]
    Summarize(String),

    #[error("publish failed: {0}")]
    Publish(String),

    #[error("{stage} timed out after {}s", .after.as_secs())]
    Timeout { stage: &'static str, after: Duration },

    #[error("nothing left of the body after removing promotions")]
    EmptyBody,
}
