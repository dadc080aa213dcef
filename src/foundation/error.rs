/// Convenience result type used across backtext.
pub type BacktextResult<T> = Result<T, BacktextError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum BacktextError {
    /// Malformed caller input (text, position, style, effect parameters).
    #[error("input error: {0}")]
    Input(String),

    /// A local resource could not be used (image decode, allocation, font data).
    #[error("resource error: {0}")]
    Resource(String),

    /// Remote fetch, upload or file-system failure.
    #[error("io error: {0}")]
    Io(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Who is at fault for a failed request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request itself was invalid; retrying it unchanged will fail again.
    Input,
    /// A dependency (decoder, allocator, network, storage) failed.
    Dependency,
}

impl BacktextError {
    /// Build a [`BacktextError::Input`] value.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Build a [`BacktextError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`BacktextError::Io`] value.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Build a [`BacktextError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Classify the error for callers deciding between rejecting and retrying.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Input(_) | Self::Serde(_) => ErrorClass::Input,
            Self::Resource(_) | Self::Io(_) | Self::Other(_) => ErrorClass::Dependency,
        }
    }
}

impl From<std::io::Error> for BacktextError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BacktextError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
