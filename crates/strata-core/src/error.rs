/// Core error types for the Strata compositor.

/// A specialized Result type for Strata operations.
pub type StrataResult<T> = Result<T, StrataError>;

/// Top-level error type encompassing all Strata subsystems.
#[derive(Debug, thiserror::Error)]
pub enum StrataError {
    #[error("design not found: {0}")]
    DesignNotFound(String),

    #[error("asset unavailable: {message} ({url})")]
    AssetUnavailable { message: String, url: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("export cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StrataError {
    /// Create an asset-unavailable error for the given locator.
    pub fn asset(message: impl Into<String>, url: impl Into<String>) -> Self {
        StrataError::AssetUnavailable {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Whether this failure degrades a single layer rather than the
    /// whole export. Recoverable failures are logged and the layer is
    /// omitted from the composite; everything else aborts the request.
    pub fn is_layer_recoverable(&self) -> bool {
        matches!(
            self,
            StrataError::AssetUnavailable { .. }
                | StrataError::Decode(_)
                | StrataError::InvalidGeometry(_)
        )
    }
}
