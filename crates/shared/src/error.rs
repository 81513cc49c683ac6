use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("request failed with status {status}")]
    Transport { status: u16 },
    #[error("entry not found: {key}")]
    NotFound { key: String },
    #[error("request aborted")]
    Aborted,
    #[error("malformed payload: {0}")]
    Decode(String),
    #[error("network failure: {0}")]
    Network(String),
}

impl CatalogError {
    pub fn transport(status: u16) -> Self {
        Self::Transport { status }
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Message stored in a controller's `error` field.
    ///
    /// Decode and network failures read the same as a transport failure; the
    /// caller only needs to know that the catalog could not be reached.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { status } => format!("Failed to load catalog data (HTTP {status})"),
            Self::NotFound { key } => format!("No catalog entry named \"{key}\""),
            Self::Aborted => "Request was cancelled".to_string(),
            Self::Decode(_) | Self::Network(_) => "Failed to load catalog data".to_string(),
        }
    }
}
