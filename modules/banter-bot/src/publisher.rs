//! Publisher backends. The real browser automation lives outside this
//! repository; the dry-run backend logs what would have been posted.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use banter_common::PostOutcome;
use banter_engine::CommentPublisher;

/// Logs the comment instead of posting it. Observed engagement is zero by
/// definition.
pub struct DryRunPublisher;

#[async_trait]
impl CommentPublisher for DryRunPublisher {
    async fn publish(&self, page_handle: &str, post_id: &str, text: &str) -> Result<PostOutcome> {
        info!(page = page_handle, post = post_id, comment = text, "Dry run: would post");
        Ok(PostOutcome::default())
    }
}
