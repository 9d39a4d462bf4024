use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::warn;
use url::Url;

/// Where candidate posts come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// The newsletter RSS feed
    Feed,
    /// A hand-collected list of post URLs
    Urls(Vec<String>),
}

/// One URL per line. Blank lines and `#` comments are skipped, as are
/// lines that are not absolute http(s) URLs.
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match Url::parse(line) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Some(line.to_string()),
            _ => {
                warn!(line, "skipping invalid URL");
                None
            }
        })
        .collect()
}

pub fn load_url_list(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read URL list: {}", path.display()))?;
    Ok(parse_url_list(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_list() {
        let text = "\
# 2024 newsletter posts
https://tanizawaseitai.substack.com/p/katakori

  https://tanizawaseitai.substack.com/p/youtsu
not a url
ftp://example.com/file
";
        assert_eq!(
            parse_url_list(text),
            vec![
                "https://tanizawaseitai.substack.com/p/katakori".to_string(),
                "https://tanizawaseitai.substack.com/p/youtsu".to_string(),
            ]
        );
    }

    #[test]
    fn test_load_url_list_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_url_list(&dir.path().join("urls.txt")).is_err());
    }

    #[test]
    fn test_load_url_list_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.txt");
        fs::write(&path, "https://x/a\nhttps://x/b\n").unwrap();
        assert_eq!(load_url_list(&path).unwrap().len(), 2);
    }
}
