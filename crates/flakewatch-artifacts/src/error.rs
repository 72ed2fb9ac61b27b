//! Error types for the artifact client.

/// Artifact store errors.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// Transport failure or non-success status.
    #[error("network error: {message}")]
    Network { message: String },

    /// The artifact, or the listing entry a pattern looked for, does not exist.
    #[error("not found: {what} ({url})")]
    NotFound { url: String, what: String },

    /// A listing pattern could not be compiled or has no capture group.
    #[error("invalid listing pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl ArtifactError {
    pub fn not_found(url: impl Into<String>, what: impl Into<String>) -> Self {
        Self::NotFound {
            url: url.into(),
            what: what.into(),
        }
    }

    /// Whether the failure only makes one build (or one listing) unusable.
    ///
    /// Both network and not-found failures are skippable: the caller drops the
    /// affected build from its sample and carries on.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::NotFound { .. })
    }
}

impl From<reqwest::Error> for ArtifactError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for artifact operations.
pub type ArtifactResult<T> = Result<T, ArtifactError>;
