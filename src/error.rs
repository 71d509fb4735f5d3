//! Error types
//!
//! Lookup misses in the codec registry are not errors: they surface as `None`
//! plus a `warn` diagnostic. The variants here cover contract violations and
//! the few call paths that want a `Result`.

/// Error type for frame and codec operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Object used before a required field was set (a caller bug)
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Codec is unknown or has no registered plugin
    #[error("unsupported codec: {0}")]
    UnsupportedCodec(String),

    /// Byte range does not fit inside the parent frame
    #[error("range {start}..{end} out of bounds for frame of {len} bytes")]
    InvalidRange { start: usize, end: usize, len: usize },
}

/// Convenience alias for `Result<T, Error>`
pub type Result<T> = std::result::Result<T, Error>;
