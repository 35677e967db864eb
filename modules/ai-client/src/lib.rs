pub mod error;
pub mod filter;
pub mod openai;
pub mod traits;
pub mod util;

pub use error::GenerationError;
pub use filter::{ContentFilter, KeywordFilter};
pub use openai::OpenAi;
pub use traits::CommentGenerator;
