/// Convenience result type for simvis operations.
pub type SimvisResult<T> = Result<T, SimvisError>;

/// Error type for simvis APIs.
#[derive(thiserror::Error, Debug)]
pub enum SimvisError {
    /// Malformed vector description or draw call. Not repairable at render time.
    #[error("configuration error: {0}")]
    Config(String),

    /// Caller input outside the accepted domain (scale, tick range, clock rate).
    #[error("validation error: {0}")]
    Validation(String),

    /// Encoder unavailable, file I/O, buffers that cannot be allocated.
    #[error("resource error: {0}")]
    Resource(String),

    /// Video encoding failed after the encoder started.
    #[error("encoder error: {0}")]
    Encode(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error, usually I/O with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SimvisError {
    /// Build a [`SimvisError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`SimvisError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SimvisError::Resource`].
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`SimvisError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`SimvisError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for errors caused by a malformed vector description.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<serde_json::Error> for SimvisError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}
