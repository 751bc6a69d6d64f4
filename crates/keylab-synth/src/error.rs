//! Error types for the synthesis engine.
//!
//! Rendering itself never fails; these errors come from the boundaries where
//! names, configuration files and output files are handled.

use thiserror::Error;

/// Result type for engine operations.
pub type SynthResult<T> = Result<T, SynthError>;

/// Errors that can occur around note rendering.
#[derive(Debug, Error)]
pub enum SynthError {
    /// Instrument name not in the closed instrument set.
    #[error("unknown instrument '{name}' (expected one of: {expected})")]
    UnknownInstrument {
        /// The name that was looked up.
        name: String,
        /// Comma-separated list of valid names.
        expected: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SynthError {
    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            SynthError::UnknownInstrument { .. } => "SYNTH_001",
            SynthError::InvalidParameter { .. } => "SYNTH_002",
            SynthError::InvalidConfig(_) => "SYNTH_003",
            SynthError::Io(_) => "SYNTH_004",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_param_helper() {
        let err = SynthError::invalid_param("volume", "must be between 0.05 and 1");
        assert!(err.to_string().contains("volume"));
        assert!(err.to_string().contains("between 0.05 and 1"));
        assert_eq!(err.code(), "SYNTH_002");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SynthError = io.into();
        assert_eq!(err.code(), "SYNTH_004");
        assert!(err.to_string().contains("missing"));
    }
}
