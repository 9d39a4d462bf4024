use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::feed::DEFAULT_FEED_URL;

const SETUP_HINT: &str = "To fix this, create ~/.config/seitai-blog/.env with:\n  \
    WORDPRESS_SITE_URL=https://example.com\n  \
    WORDPRESS_USERNAME=your_user\n  \
    WORDPRESS_APP_PASSWORD=xxxx xxxx xxxx xxxx\n  \
    ANTHROPIC_API_KEY=your_key_here   (only needed with --summarize)\n\n\
    Application passwords are created under Users → Profile in the WordPress admin.";

#[derive(Debug, Clone)]
pub struct WordPressConfig {
    pub site_url: String,
    pub username: String,
    pub app_password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub feed_url: String,
    pub wordpress: Option<WordPressConfig>,
    pub anthropic_api_key: Option<String>,
    pub claude_model: Option<String>,
    pub ledger_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::try_load_dotenv();

        Ok(Self::from_lookup(|key| env::var(key).ok()))
    }

    /// Builds the config from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let wordpress = match (
            get("WORDPRESS_SITE_URL"),
            get("WORDPRESS_USERNAME"),
            get("WORDPRESS_APP_PASSWORD"),
        ) {
            (Some(site_url), Some(username), Some(app_password)) => Some(WordPressConfig {
                site_url,
                username,
                app_password,
            }),
            _ => None,
        };

        Self {
            feed_url: get("FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string()),
            wordpress,
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            claude_model: get("CLAUDE_MODEL"),
            ledger_path: get("LEDGER_PATH").map(PathBuf::from),
        }
    }

    pub fn require_wordpress(&self) -> Result<&WordPressConfig> {
        self.wordpress.as_ref().with_context(|| {
            format!(
                "WORDPRESS_SITE_URL, WORDPRESS_USERNAME and WORDPRESS_APP_PASSWORD must all be set.\n\n{}",
                SETUP_HINT
            )
        })
    }

    pub fn require_anthropic_key(&self) -> Result<&str> {
        self.anthropic_api_key.as_deref().with_context(|| {
            format!(
                "ANTHROPIC_API_KEY not found.\n\n{}\n\n\
                Get your Anthropic API key from: https://console.anthropic.com/settings/keys",
                SETUP_HINT
            )
        })
    }

    fn try_load_dotenv() {
        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/seitai-blog/.env
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("seitai-blog").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }
    }
}
