//! Trait boundaries for the automation collaborators. The engine never
//! touches a browser or a log file itself; it talks to these.

use anyhow::Result;
use async_trait::async_trait;

use banter_common::{PostContext, PostOutcome, PostRecord};

/// Supplies the candidate posts discovered on a page.
#[async_trait]
pub trait FeedBrowser: Send + Sync {
    async fn posts(&self, page_handle: &str) -> Result<Vec<PostContext>>;
}

/// Posts a comment onto a target post and reports what it observed.
#[async_trait]
pub trait CommentPublisher: Send + Sync {
    async fn publish(&self, page_handle: &str, post_id: &str, text: &str) -> Result<PostOutcome>;
}

/// Receives one structured record per successful post.
pub trait MetricsSink: Send {
    fn record(&mut self, record: &PostRecord) -> Result<()>;
}
