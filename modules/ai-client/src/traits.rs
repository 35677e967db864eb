use async_trait::async_trait;

use crate::error::GenerationError;

/// Contract for the generative comment service: given the post text and a
/// style directive, produce one ready-to-post comment.
#[async_trait]
pub trait CommentGenerator: Send + Sync {
    async fn generate(&self, post_text: &str, style: &str) -> Result<String, GenerationError>;
}
