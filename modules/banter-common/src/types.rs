use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BanterError;

// --- Corpus ---

/// A single curated comment. The category is carried by the corpus map key,
/// not by the record itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub reference: String,
    pub text: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub usage_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// The persisted comment corpus. `BTreeMap` keeps category iteration (and
/// therefore tie-breaking downstream) deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    pub version: u32,
    pub categories: BTreeMap<String, Vec<Comment>>,
    pub metadata: CorpusMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusMetadata {
    pub total_comments: usize,
    pub rotation_strategy: RotationStrategy,
    pub last_updated: DateTime<Utc>,
}

impl Corpus {
    /// Number of comments actually present, across all categories.
    pub fn comment_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationStrategy {
    Random,
    Sequential,
}

impl FromStr for RotationStrategy {
    type Err = BanterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(RotationStrategy::Random),
            "sequential" => Ok(RotationStrategy::Sequential),
            other => Err(BanterError::Configuration(format!(
                "unknown rotation strategy: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentSource {
    Local,
    Generative,
}

impl FromStr for CommentSource {
    type Err = BanterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(CommentSource::Local),
            "generative" | "openai" => Ok(CommentSource::Generative),
            other => Err(BanterError::Configuration(format!(
                "unknown comment source: {other}"
            ))),
        }
    }
}

/// Where a selected comment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    Local,
    Generated,
    Emergency,
}

impl std::fmt::Display for SelectionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionSource::Local => write!(f, "local"),
            SelectionSource::Generated => write!(f, "generated"),
            SelectionSource::Emergency => write!(f, "emergency"),
        }
    }
}

// --- Selection ---

/// One posting opportunity, as seen by the provider facade.
#[derive(Debug, Clone)]
pub struct SelectionContext {
    pub post_text: String,
    pub page_handle: String,
    pub requested_at: DateTime<Utc>,
}

/// The facade's answer: what to post and where it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionResult {
    pub text: String,
    pub source: SelectionSource,
    /// Set only when `source` is `local`.
    pub reference: Option<String>,
    pub category: Option<String>,
    pub relevance_score: f64,
    pub fallback_used: bool,
}

// --- Collaborator boundary ---

/// A candidate post discovered on a page by the browser collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostContext {
    pub post_id: String,
    pub post_text: String,
    pub reaction_count: u32,
    pub comment_count: u32,
    /// Absent when the collaborator could not read a timestamp; treated as fresh.
    pub posted_at: Option<DateTime<Utc>>,
    pub page_handle: String,
}

/// What the posting collaborator observed after publishing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PostOutcome {
    pub likes: u32,
    pub replies: u32,
}

/// One structured metrics row per successful post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    pub ts: DateTime<Utc>,
    pub page_handle: String,
    pub post_id: String,
    pub comment_preview: String,
    pub source: SelectionSource,
    pub reference: Option<String>,
    pub category: Option<String>,
    pub relevance_score: f64,
    pub fallback_used: bool,
    pub likes: u32,
    pub replies: u32,
}
