use std::path::PathBuf;

use crate::error::BanterError;
use crate::types::{CommentSource, RotationStrategy};

/// Application configuration loaded from environment variables.
/// Only env-specific values and secrets live here; the comment corpus itself
/// is authored in the file named by `LOCAL_COMMENT_FILE`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Comment selection
    pub comment_source: CommentSource,
    pub local_comment_file: PathBuf,
    pub rotation: RotationStrategy,
    pub fallback_to_openai: bool,
    /// Comments past this usage count are excluded from normal selection.
    pub max_reuse: u32,
    /// Decay constant (hours) for the recency penalty and engagement scoring.
    pub decay_hours: f64,

    // Generation
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    /// Style directive appended to every generation prompt.
    pub style_prompt: String,

    // Pages to work through, in order.
    pub feed_pages: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, BanterError> {
        dotenvy::dotenv().ok();

        let config = Self {
            comment_source: std::env::var("COMMENT_SOURCE")
                .unwrap_or_else(|_| "local".to_string())
                .parse()?,
            local_comment_file: std::env::var("LOCAL_COMMENT_FILE")
                .unwrap_or_else(|_| "comments.json".to_string())
                .into(),
            rotation: std::env::var("COMMENT_ROTATION")
                .unwrap_or_else(|_| "random".to_string())
                .parse()?,
            fallback_to_openai: std::env::var("FALLBACK_TO_OPENAI")
                .unwrap_or_else(|_| "true".to_string())
                .to_ascii_lowercase()
                == "true",
            max_reuse: parse_var("MAX_COMMENT_REUSE", "10")?,
            decay_hours: parse_var("RECENCY_DECAY_HOURS", "24")?,
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            style_prompt: std::env::var("OPENAI_PROMPT").unwrap_or_else(|_| {
                "Write one short, friendly comment. No emojis, no introductory phrases."
                    .to_string()
            }),
            feed_pages: std::env::var("PAGE_URLS")
                .unwrap_or_default()
                .split(',')
                .filter(|s| !s.is_empty())
                .map(|s| s.trim().to_string())
                .collect(),
        };

        config.log_keys();
        Ok(config)
    }

    fn log_keys(&self) {
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => {
                    let n = v.len().min(5);
                    format!("{}...({} chars)", &v[..n], v.len())
                }
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  COMMENT_SOURCE: {:?}", self.comment_source);
        tracing::info!("  LOCAL_COMMENT_FILE: {}", self.local_comment_file.display());
        tracing::info!("  COMMENT_ROTATION: {:?}", self.rotation);
        tracing::info!("  FALLBACK_TO_OPENAI: {}", self.fallback_to_openai);
        tracing::info!("  MAX_COMMENT_REUSE: {}", self.max_reuse);
        tracing::info!("  RECENCY_DECAY_HOURS: {}", self.decay_hours);
        tracing::info!("  OPENAI_API_KEY: {}", preview_opt(&self.openai_api_key));
        tracing::info!("  PAGE_URLS: {} page(s)", self.feed_pages.len());
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, BanterError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse().map_err(|_| {
        BanterError::Configuration(format!("{key} must be a number, got: {raw}"))
    })
}
