//! Error types and handling for the trip planner

use thiserror::Error;

/// Main error type for the trip planner
#[derive(Error, Debug)]
pub enum TripPlannerError {
    /// Geocoding search returned nothing for the query
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Network or HTTP failure talking to an external service
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Rejected input or a transition attempted from the wrong state
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Response body did not have the expected shape
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Document rendering errors
    #[error("Export error: {message}")]
    Export { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TripPlannerError {
    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new export error
    pub fn export<S: Into<String>>(message: S) -> Self {
        Self::Export {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripPlannerError::NotFound { message } => message.clone(),
            TripPlannerError::Transport { .. } | TripPlannerError::Parse { .. } => {
                "Failed to fetch data".to_string()
            }
            TripPlannerError::Validation { message } => message.clone(),
            TripPlannerError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            TripPlannerError::Export { .. } => "Could not create the document.".to_string(),
            TripPlannerError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }

    /// HTTP status code used when the error crosses the web surface
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            TripPlannerError::Validation { .. } => 422,
            TripPlannerError::NotFound { .. } => 404,
            TripPlannerError::Transport { .. } | TripPlannerError::Parse { .. } => 502,
            _ => 500,
        }
    }

    /// Short machine-readable kind
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            TripPlannerError::NotFound { .. } => "not_found",
            TripPlannerError::Transport { .. } => "transport",
            TripPlannerError::Validation { .. } => "validation",
            TripPlannerError::Parse { .. } => "parse",
            TripPlannerError::Config { .. } => "config",
            TripPlannerError::Export { .. } => "export",
            TripPlannerError::Io { .. } => "io",
        }
    }
}

impl From<reqwest::Error> for TripPlannerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TripPlannerError::parse(err.to_string())
        } else {
            TripPlannerError::transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let not_found = TripPlannerError::not_found("Atlantis");
        assert!(matches!(not_found, TripPlannerError::NotFound { .. }));

        let transport = TripPlannerError::transport("connection refused");
        assert!(matches!(transport, TripPlannerError::Transport { .. }));

        let validation = TripPlannerError::validation("too many days");
        assert!(matches!(validation, TripPlannerError::Validation { .. }));
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            TripPlannerError::not_found("Location not found!").user_message(),
            "Location not found!"
        );
        assert_eq!(
            TripPlannerError::parse("bad json").user_message(),
            "Failed to fetch data"
        );
        let validation = TripPlannerError::validation("Please enter your destination.");
        assert_eq!(validation.user_message(), "Please enter your destination.");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(TripPlannerError::validation("x").status_code(), 422);
        assert_eq!(TripPlannerError::not_found("x").status_code(), 404);
        assert_eq!(TripPlannerError::transport("x").status_code(), 502);
        assert_eq!(TripPlannerError::export("x").status_code(), 500);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TripPlannerError = io_err.into();
        assert!(matches!(err, TripPlannerError::Io { .. }));
        assert_eq!(err.kind(), "io");
    }
}
