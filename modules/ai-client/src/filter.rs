/// Pluggable content-policy hook, run on sanitized completions before they
/// are released to the caller.
pub trait ContentFilter: Send + Sync {
    /// Return a human-readable reason to reject `text`, or `None` to pass.
    fn reject_reason(&self, text: &str) -> Option<String>;
}

/// Case-insensitive substring deny-list.
pub struct KeywordFilter {
    blocked: Vec<String>,
}

impl KeywordFilter {
    pub fn new<I, S>(blocked: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blocked: blocked
                .into_iter()
                .map(|s| s.into().to_lowercase())
                .collect(),
        }
    }
}

impl ContentFilter for KeywordFilter {
    fn reject_reason(&self, text: &str) -> Option<String> {
        let lower = text.to_lowercase();
        self.blocked
            .iter()
            .find(|kw| lower.contains(kw.as_str()))
            .map(|kw| format!("blocked keyword: {kw}"))
    }
}
