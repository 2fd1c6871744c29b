pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Per-record errors, the record is dropped and the batch continues
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),
    #[error("Invalid \"{field}\": {reason}")]
    Validation { field: &'static str, reason: String },
    // Invocation-level errors
    #[error("Failed to fetch template \"{name}\": {reason}")]
    TemplateFetch { name: String, reason: String },
    #[error("Failed to enqueue {} message(s) for: {}", failed.len(), failed.join(", "))]
    PartialDispatch { failed: Vec<String> },
    // Queue client errors
    #[error("Failed to send message: {0}")]
    SendMessage(String),
}

impl Error {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Whether this error must abort the whole invocation
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::TemplateFetch { .. } | Self::PartialDispatch { .. })
    }
}
