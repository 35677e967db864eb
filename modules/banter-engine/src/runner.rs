//! One posting iteration for one page: discover, target, select, publish,
//! record.

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use banter_common::{PostRecord, SelectionContext};

use crate::engagement::EngagementSelector;
use crate::provider::CommentProvider;
use crate::traits::{CommentPublisher, FeedBrowser, MetricsSink};

/// Characters of comment text kept in the metrics preview.
const PREVIEW_CHARS: usize = 100;

/// Run one page. `Ok(None)` means the page had no usable posts and was
/// skipped; errors are either collaborator failures or the fatal subset of
/// the engine taxonomy (validation, persistence, configuration).
pub async fn run_page(
    page_handle: &str,
    feed: &dyn FeedBrowser,
    publisher: &dyn CommentPublisher,
    metrics: &mut dyn MetricsSink,
    engagement: &EngagementSelector,
    provider: &mut CommentProvider,
) -> Result<Option<PostRecord>> {
    let posts = feed.posts(page_handle).await?;
    let now = Utc::now();

    let Some(target) = engagement.pick(&posts, now) else {
        info!(page = page_handle, "No candidate posts found, skipping page");
        return Ok(None);
    };

    let ctx = SelectionContext {
        post_text: target.post_text.clone(),
        page_handle: page_handle.to_string(),
        requested_at: now,
    };
    let selection = provider.select(&ctx).await?;

    let outcome = publisher
        .publish(page_handle, &target.post_id, &selection.text)
        .await?;

    let record = PostRecord {
        ts: now,
        page_handle: page_handle.to_string(),
        post_id: target.post_id.clone(),
        comment_preview: preview(&selection.text),
        source: selection.source,
        reference: selection.reference,
        category: selection.category,
        relevance_score: selection.relevance_score,
        fallback_used: selection.fallback_used,
        likes: outcome.likes,
        replies: outcome.replies,
    };
    metrics.record(&record)?;

    info!(
        page = page_handle,
        post = %record.post_id,
        source = %record.source,
        fallback = record.fallback_used,
        "Comment posted"
    );
    Ok(Some(record))
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{truncated}...")
    }
}
