use std::fmt::Write as _;

use crate::models::BatchReport;
use crate::pipeline::Candidates;

pub struct ReportGenerator;

impl ReportGenerator {
    /// Plain-text summary of one batch run.
    pub fn render_batch(report: &BatchReport) -> String {
        let mut out = String::new();
        let succeeded: Vec<_> = report.succeeded().collect();
        let failed: Vec<_> = report.failed().collect();

        let _ = writeln!(out, "=== Batch report ===");
        let _ = writeln!(out, "Published as draft: {}", succeeded.len());
        let _ = writeln!(out, "Failed: {}", failed.len());
        let _ = writeln!(out, "Already posted (skipped): {}", report.skipped_posted);

        if !succeeded.is_empty() {
            let _ = writeln!(out, "\n--- Drafts ---");
            for (index, result) in succeeded.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", index + 1, result.title);
                if let Some(edit) = &result.outcome.edit_reference {
                    let _ = writeln!(out, "   Edit: {}", edit);
                }
                let _ = writeln!(out, "   Source: {}", result.original.url);
            }
        }

        if !failed.is_empty() {
            let _ = writeln!(out, "\n--- Failures ---");
            for (index, result) in failed.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", index + 1, result.original.title);
                if let Some(error) = &result.outcome.error {
                    let _ = writeln!(out, "   Error: {}", error);
                }
            }
        }

        out
    }

    /// Articles vs. notices, for dry runs.
    pub fn render_classification(candidates: &Candidates) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "=== Classification ===");
        let _ = writeln!(out, "Articles: {}", candidates.articles.len());
        let _ = writeln!(out, "Notices: {}", candidates.notices.len());
        let _ = writeln!(out, "Unavailable: {}", candidates.unavailable.len());
        if candidates.already_posted > 0 {
            let _ = writeln!(out, "Already posted: {}", candidates.already_posted);
        }

        let sections = [
            ("Articles", &candidates.articles),
            ("Notices", &candidates.notices),
        ];
        for (heading, articles) in sections {
            if articles.is_empty() {
                continue;
            }
            let _ = writeln!(out, "\n--- {} ---", heading);
            for (index, article) in articles.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", index + 1, article.title);
                let _ = writeln!(out, "   {}", article.url);
            }
        }

        if !candidates.unavailable.is_empty() {
            let _ = writeln!(out, "\n--- Unavailable ---");
            for url in &candidates.unavailable {
                let _ = writeln!(out, "  {}", url);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ItemError;
    use crate::models::{Article, BatchResult, PublishOutcome, PublishedPost};

    #[test]
    fn test_batch_report_lists_drafts_and_failures() {
        let report = BatchReport {
            results: vec![
                BatchResult {
                    original: Article::new("元", "", "https://x/a"),
                    title: "肩こり対策".to_string(),
                    outcome: PublishOutcome::published(&PublishedPost {
                        id: "57".to_string(),
                        edit_url: "https://cms/wp-admin/post.php?post=57&action=edit".to_string(),
                    }),
                },
                BatchResult {
                    original: Article::new("腰痛", "", "https://x/b"),
                    title: "腰痛".to_string(),
                    outcome: PublishOutcome::failed(ItemError::Publish("401".to_string())),
                },
            ],
            skipped_posted: 3,
        };

        let text = ReportGenerator::render_batch(&report);
        assert!(text.contains("Published as draft: 1"));
        assert!(text.contains("Failed: 1"));
        assert!(text.contains("Already posted (skipped): 3"));
        assert!(text.contains("1. 肩こり対策"));
        assert!(text.contains("Edit: https://cms/wp-admin/post.php?post=57&action=edit"));
        assert!(text.contains("Error: publish failed: 401"));
    }

    #[test]
    fn test_empty_report_has_no_sections() {
        let text = ReportGenerator::render_batch(&BatchReport::default());
        assert!(!text.contains("--- Drafts ---"));
        assert!(!text.contains("--- Failures ---"));
    }

    #[test]
    fn test_classification_report() {
        let candidates = Candidates {
            articles: vec![Article::new("肩こりの原因とは", "", "https://x/a")],
            notices: vec![Article::new("定休日のお知らせ", "", "https://x/b")],
            unavailable: vec!["https://x/c".to_string()],
            already_posted: 0,
        };
        let text = ReportGenerator::render_classification(&candidates);
        assert!(text.contains("Articles: 1"));
        assert!(text.contains("Notices: 1"));
        assert!(text.contains("--- Notices ---\n1. 定休日のお知らせ"));
        assert!(text.contains("  https://x/c"));
        assert!(!text.contains("Already posted"));
    }

    #[test]
    fn test_classification_report_counts_already_posted() {
        let candidates = Candidates {
            articles: vec![Article::new("肩こりの原因とは", "", "https://x/a")],
            already_posted: 4,
            ..Default::default()
        };
        let text = ReportGenerator::render_classification(&candidates);
        assert!(text.contains("Already posted: 4"));
    }
}
