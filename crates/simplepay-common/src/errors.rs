use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures surfaced to callers of the native bridge.
///
/// A bridge that never becomes ready is not an error: calls made against
/// it simply stay pending.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// The native call surface failed synchronously. Carries the host's
    /// own error text unchanged.
    #[error("native transport error: {0}")]
    Transport(String),

    #[error("malformed bridge payload: {0}")]
    MalformedPayload(String),

    /// The native side dropped the response callback without answering.
    #[error("native call abandoned before a response arrived")]
    Abandoned,
}

#[derive(Debug, thiserror::Error)]
pub enum SimplePayError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("script error: {0}")]
    Script(String),
}
