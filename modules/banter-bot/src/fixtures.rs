//! Static feed source for dry runs and tests: candidate posts per page,
//! loaded from a JSON file.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use banter_common::PostContext;
use banter_engine::FeedBrowser;

pub struct FixtureFeed {
    pages: HashMap<String, Vec<PostContext>>,
}

impl FixtureFeed {
    pub fn new(pages: HashMap<String, Vec<PostContext>>) -> Self {
        Self { pages }
    }

    /// Load `{page_handle: [PostContext]}` from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read feed fixture {}", path.display()))?;
        let pages: HashMap<String, Vec<PostContext>> = serde_json::from_str(&raw)
            .with_context(|| format!("invalid feed fixture {}", path.display()))?;
        info!(pages = pages.len(), file = %path.display(), "Feed fixture loaded");
        Ok(Self { pages })
    }
}

#[async_trait]
impl FeedBrowser for FixtureFeed {
    async fn posts(&self, page_handle: &str) -> Result<Vec<PostContext>> {
        Ok(self.pages.get(page_handle).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_page_returns_no_posts() {
        let feed = FixtureFeed::new(HashMap::new());
        assert!(feed.posts("nowhere").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fixture_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        let post = PostContext {
            post_id: "p-1".to_string(),
            post_text: "hello".to_string(),
            reaction_count: 3,
            comment_count: 1,
            posted_at: None,
            page_handle: "page-1".to_string(),
        };
        let pages = HashMap::from([("page-1".to_string(), vec![post])]);
        std::fs::write(&path, serde_json::to_string(&pages).unwrap()).unwrap();

        let feed = FixtureFeed::from_file(&path).unwrap();
        let posts = feed.posts("page-1").await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].post_id, "p-1");
    }
}
