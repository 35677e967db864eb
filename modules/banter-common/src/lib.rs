pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::BanterError;
pub use types::{
    Comment, CommentSource, Corpus, CorpusMetadata, PostContext, PostOutcome, PostRecord,
    RotationStrategy, SelectionContext, SelectionResult, SelectionSource,
};
