//! Error types for histoplot

use thiserror::Error;

/// histoplot error type
#[derive(Error, Debug)]
pub enum Error {
    /// Target binning is not a coarsening of the source binning
    #[error("Incompatible rebinning: {0}")]
    RebinIncompatible(String),

    /// Operands of a ratio/divide/add disagree in bin count
    #[error("Incompatible histograms: {0}")]
    IncompatibleHistograms(String),

    /// An operation was invoked without any input series
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Style configuration contains a key its consumer does not recognize
    #[error("Unknown style option `{key}` for {consumer}")]
    UnknownStyleOption {
        /// Name of the configuration consumer (e.g. "histo", "pad margins").
        consumer: String,
        /// The offending option key.
        key: String,
    },

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_style_option_message() {
        let err =
            Error::UnknownStyleOption { consumer: "histo".to_string(), key: "colour".to_string() };
        assert_eq!(err.to_string(), "Unknown style option `colour` for histo");
    }

    #[test]
    fn test_json_error_converts() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
    }
}
