//! GrowCube client error types.
//!
//! The taxonomy follows how a session reacts to each failure:
//!
//! | Variant       | Cause                                         | Session reaction            |
//! |---------------|-----------------------------------------------|-----------------------------|
//! | `Connection`  | Cannot open, or peer dropped the stream       | Abort, surface to caller    |
//! | `FrameFormat` | Wire grammar violated                         | Abort, no resync point      |
//! | `Timeout`     | Shared budget exhausted                       | Return partial status       |
//! | `Validation`  | Well-formed frame with invalid content        | Abort, protocol mismatch    |
//!
//! Unknown frame types are never errors; they are logged and skipped.

use thiserror::Error;

/// GrowCube client errors.
#[derive(Error, Debug)]
pub enum GrowcubeError {
    /// Connection could not be opened or was closed by the device.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Bytes on the wire do not follow the frame grammar.
    #[error("Frame format error: {0}")]
    FrameFormat(String),

    /// The session budget ran out before the operation completed.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Frame parsed correctly but its content breaks the protocol contract.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GrowcubeError {
    /// Whether this error is the non-fatal budget exhaustion case.
    pub fn is_timeout(&self) -> bool {
        matches!(self, GrowcubeError::Timeout(_))
    }
}

/// Result type alias for GrowCube operations
pub type Result<T> = std::result::Result<T, GrowcubeError>;

impl From<toml::de::Error> for GrowcubeError {
    fn from(err: toml::de::Error) -> Self {
        GrowcubeError::Config(format!("Failed to parse config: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_timeout() {
        assert!(GrowcubeError::Timeout("read".to_string()).is_timeout());
        assert!(!GrowcubeError::Connection("refused".to_string()).is_timeout());
    }

    #[test]
    fn test_toml_error_is_config_error() {
        let err: GrowcubeError = toml::from_str::<toml::Table>("port = ").unwrap_err().into();
        assert!(matches!(err, GrowcubeError::Config(_)));
        assert!(err.to_string().contains("Failed to parse config"), "{err}");
    }

    #[test]
    fn test_display() {
        let err = GrowcubeError::Validation("channel 7 out of range".to_string());
        assert_eq!(err.to_string(), "Validation error: channel 7 out of range");
    }
}
