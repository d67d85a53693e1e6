//! Error types for the measurements panel

use thiserror::Error;

/// Result type alias for panel operations
pub type Result<T> = std::result::Result<T, PanelError>;

/// Errors that can occur while loading, grouping or rendering measurements
#[derive(Error, Debug)]
pub enum PanelError {
    #[error("Invalid data format: {message}")]
    InvalidData { message: String },

    #[error("Cannot compute {what} of an empty sequence")]
    EmptyInput { what: &'static str },

    #[error("Unknown measurements collection: {key}")]
    UnknownCollection { key: String },

    #[error("Collection has no grouping for field: {key}")]
    UnknownGrouping { key: String },

    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: config::ConfigError,
    },

    #[error("File I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("Preview rendering failed: {message}")]
    Preview { message: String },
}

impl PanelError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        PanelError::InvalidData {
            message: message.into(),
        }
    }
}

impl<T: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<T>>
    for PanelError
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<T>) -> Self {
        PanelError::Preview {
            message: format!("Drawing area error: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PanelError::EmptyInput { what: "mean" };
        assert_eq!(err.to_string(), "Cannot compute mean of an empty sequence");

        let err = PanelError::invalid("row 3: value is not a number");
        assert_eq!(
            err.to_string(),
            "Invalid data format: row 3: value is not a number"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: PanelError = io.into();
        assert!(matches!(err, PanelError::Io { .. }));
    }
}
