//! Corpus persistence: validated load, backup + atomic save, usage updates.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use banter_common::{BanterError, Comment, Corpus};

/// Generic comments that must always be available, even when the corpus is
/// empty or unloadable.
const EMERGENCY_COMMENTS: &[&str] = &[
    "Thanks for sharing this!",
    "Really interesting, appreciate the update.",
    "Great post, following along.",
];

/// Owns the corpus and its backing file. Single writer: one store instance
/// per run, all mutation flows through `update` + `backup_and_save`.
#[derive(Debug)]
pub struct CommentStore {
    path: PathBuf,
    corpus: Corpus,
}

impl CommentStore {
    /// Load and validate the corpus. Any invalid entry fails the entire
    /// load; a half-valid corpus is worse than none.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, BanterError> {
        let path = path.into();
        let raw = fs::read_to_string(&path).map_err(|e| {
            BanterError::Persistence(format!("cannot read {}: {e}", path.display()))
        })?;
        let mut corpus: Corpus = serde_json::from_str(&raw).map_err(|e| {
            BanterError::Validation {
                problems: vec![format!("corpus parse error: {e}")],
            }
        })?;

        validate(&corpus)?;

        // total_comments is revalidated, never trusted blindly.
        let actual = corpus.comment_count();
        if corpus.metadata.total_comments != actual {
            warn!(
                recorded = corpus.metadata.total_comments,
                actual, "Stale total_comments in corpus metadata, recomputing"
            );
            corpus.metadata.total_comments = actual;
        }

        info!(
            comments = actual,
            categories = corpus.categories.len(),
            file = %path.display(),
            "Corpus loaded"
        );
        Ok(Self { path, corpus })
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// All comments paired with their category, in deterministic order.
    pub fn candidates(&self) -> impl Iterator<Item = (&str, &Comment)> {
        self.corpus
            .categories
            .iter()
            .flat_map(|(category, comments)| {
                comments.iter().map(move |c| (category.as_str(), c))
            })
    }

    /// Record one successful use. Calling twice with the same `used_at` for
    /// the same reference is a no-op, so one logical selection can never
    /// double-count.
    pub fn update(&mut self, reference: &str, used_at: DateTime<Utc>) -> Result<(), BanterError> {
        for comments in self.corpus.categories.values_mut() {
            for comment in comments.iter_mut() {
                if comment.reference == reference {
                    if comment.last_used == Some(used_at) {
                        debug!(reference, "Usage already recorded for this selection");
                        return Ok(());
                    }
                    comment.usage_count += 1;
                    comment.last_used = Some(used_at);
                    self.corpus.metadata.last_updated = used_at;
                    return Ok(());
                }
            }
        }
        Err(BanterError::Validation {
            problems: vec![format!("unknown reference: {reference}")],
        })
    }

    /// Back up the live file, then atomically replace it with the current
    /// corpus. Backup failure aborts the save; a crash mid-write can never
    /// corrupt the live file because the write lands in a temp sibling first.
    pub fn backup_and_save(&self) -> Result<(), BanterError> {
        if self.path.exists() {
            let backup = backup_path(&self.path, Utc::now());
            fs::copy(&self.path, &backup).map_err(|e| {
                BanterError::Persistence(format!(
                    "backup to {} failed, save aborted: {e}",
                    backup.display()
                ))
            })?;
            debug!(backup = %backup.display(), "Corpus backed up");
        }

        let json = serde_json::to_string_pretty(&self.corpus)
            .map_err(|e| BanterError::Persistence(format!("corpus serialization failed: {e}")))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|e| {
            BanterError::Persistence(format!("cannot write {}: {e}", tmp.display()))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            BanterError::Persistence(format!("cannot replace {}: {e}", self.path.display()))
        })?;
        Ok(())
    }

    /// Built-in generic comments, independent of corpus state.
    pub fn emergency_set() -> Vec<String> {
        EMERGENCY_COMMENTS.iter().map(|s| s.to_string()).collect()
    }
}

fn backup_path(path: &Path, now: DateTime<Utc>) -> PathBuf {
    path.with_extension(format!("{}.bak", now.format("%Y%m%dT%H%M%S")))
}

/// Schema and uniqueness checks. Collects every problem so the error names
/// all offending references at once.
fn validate(corpus: &Corpus) -> Result<(), BanterError> {
    let mut problems = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for (category, comments) in &corpus.categories {
        for comment in comments {
            if comment.reference.trim().is_empty() {
                problems.push(format!("category '{category}': comment with empty reference"));
                continue;
            }
            if comment.text.trim().is_empty() {
                problems.push(format!("'{}': empty text", comment.reference));
            }
            if !seen.insert(comment.reference.as_str()) {
                problems.push(format!("'{}': duplicate reference", comment.reference));
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(BanterError::Validation { problems })
    }
}
