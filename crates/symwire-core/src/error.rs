//! Error types for the wire encoder.

use thiserror::Error;

/// Result type alias for encoder operations
pub type Result<T> = std::result::Result<T, WireError>;

/// Errors raised while classifying, encoding or decoding wire values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WireError {
    /// The classifier reached its catch-all for this runtime type
    #[error("does not know how to export type {0}")]
    UnsupportedType(String),

    /// Hex text that does not describe exactly one IEEE double
    #[error("malformed hex double: {0}")]
    MalformedHex(String),

    /// Escaped text that cannot be unescaped back to UTF-8
    #[error("malformed escape sequence: {0}")]
    MalformedEscape(String),

    /// The expression engine could not pretty-print a value
    #[error("pretty rendering failed: {0}")]
    PrettyRender(String),

    /// A matrix or array whose entries do not fill its declared shape
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// Any other failure reported by the expression engine
    #[error("expression engine error: {0}")]
    Engine(String),
}

impl WireError {
    /// Stable name of the failure kind, carried as the first field of an
    /// `INTERNAL_ERROR` item.
    pub fn kind(&self) -> &'static str {
        match self {
            WireError::UnsupportedType(_) => "UnsupportedType",
            WireError::MalformedHex(_) => "MalformedHex",
            WireError::MalformedEscape(_) => "MalformedEscape",
            WireError::PrettyRender(_) => "PrettyRenderFailure",
            WireError::InvalidShape(_) => "InvalidShape",
            WireError::Engine(_) => "EngineError",
        }
    }

    /// The failure payload without the display prefix.
    pub fn detail(&self) -> &str {
        match self {
            WireError::UnsupportedType(detail)
            | WireError::MalformedHex(detail)
            | WireError::MalformedEscape(detail)
            | WireError::PrettyRender(detail)
            | WireError::InvalidShape(detail)
            | WireError::Engine(detail) => detail,
        }
    }
}
