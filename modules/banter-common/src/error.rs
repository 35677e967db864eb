use thiserror::Error;

/// Domain error taxonomy. Selection exhaustion is not here: it is internal
/// to the provider facade and always resolves to the next fallback stage.
#[derive(Error, Debug)]
pub enum BanterError {
    /// The corpus failed schema or uniqueness checks. Load aborts entirely;
    /// `problems` names every offending reference.
    #[error("corpus validation failed: {}", problems.join("; "))]
    Validation { problems: Vec<String> },

    /// Backup or atomic-write failure. The save is aborted and the prior
    /// file is left untouched.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// The generative fallback was exhausted, produced nothing usable, or
    /// was blocked by the content filter.
    #[error("generation error: {0}")]
    Generation(String),

    /// The engine can never produce a comment with this configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}
