/// Error type for storage backend operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// A backend operation failed.
    #[error("[{backend}] storage error for key '{key}': {message}")]
    Backend {
        backend: String,
        key: String,
        message: String,
    },
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Create a new backend error.
    pub fn backend(
        backend: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        StoreError::Backend {
            backend: backend.into(),
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Error type for the translation collaborator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TranslateError {
    /// The translation call itself failed (network, quota, auth).
    #[error("translation backend error: {0}")]
    Backend(String),
    /// The backend answered with something that could not be interpreted.
    #[error("malformed translation response: {0}")]
    MalformedResponse(String),
}
