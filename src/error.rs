//! Unified error hierarchy for maptrack
//!
//! Every failure the tracker can hit is either a one-shot user notification
//! (validation, geolocation) or something the controller swallows after
//! logging (storage, corrupt snapshots). Nothing here is fatal.

use thiserror::Error;

/// Top-level error type for all maptrack operations
#[derive(Debug, Error)]
pub enum MaptrackError {
    /// Submitted form input was rejected
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Persisted storage could not be read or written
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The user's position could not be determined
    #[error("Geolocation error: {0}")]
    Geolocation(#[from] GeolocationError),

    /// Snapshot encoding/decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Form submission validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Field is NaN or infinite (including text that is not a number)
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    /// Field must be strictly positive
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    /// Activity selector carried a tag outside running/cycling
    #[error("Unknown activity type: {value}")]
    UnknownActivity { value: String },

    /// Form submitted before any map click recorded a position
    #[error("No map position selected")]
    NoMapPosition,
}

/// Key-value storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend cannot be used at all
    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },

    /// Reading or writing a single entry failed
    #[error("Storage IO failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Position acquisition errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    /// The host has no geolocation capability
    #[error("Geolocation is not supported")]
    Unsupported,

    /// The user declined to share their position
    #[error("Permission to read location was denied")]
    PermissionDenied,

    /// Position lookup failed or timed out
    #[error("Position unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Result type alias for maptrack operations
pub type Result<T> = std::result::Result<T, MaptrackError>;

impl MaptrackError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            MaptrackError::Validation(_) => ErrorSeverity::Warning,
            MaptrackError::Geolocation(_) => ErrorSeverity::Warning,
            MaptrackError::Serialization(_) => ErrorSeverity::Warning,
            MaptrackError::Storage(_) => ErrorSeverity::Error,
            MaptrackError::Io(_) => ErrorSeverity::Error,
            MaptrackError::Configuration(_) => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message, used as the blocking alert text
    pub fn user_message(&self) -> String {
        match self {
            MaptrackError::Validation(ValidationError::NoMapPosition) => {
                "Click on the map to choose where the workout happened.".to_string()
            }
            MaptrackError::Validation(ValidationError::UnknownActivity { value }) => {
                format!("Unknown workout type: {}", value)
            }
            MaptrackError::Validation(_) => "Input must be a positive number!".to_string(),
            MaptrackError::Geolocation(_) => {
                "Could not determine your current location!".to_string()
            }
            MaptrackError::Storage(_) => {
                "Workouts could not be saved in this browser.".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Log this error at the level its severity maps to
    pub fn log(&self, message: &str) {
        let level = self.severity().to_tracing_level();
        if level == tracing::Level::ERROR {
            tracing::error!(error = %self, "{}", message);
        } else if level == tracing::Level::WARN {
            tracing::warn!(error = %self, "{}", message);
        } else {
            tracing::info!(error = %self, "{}", message);
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents the operation but the session continues
    Error,
    /// Warning that doesn't prevent further use
    Warning,
    /// Informational message
    Info,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Info => tracing::Level::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = MaptrackError::from(ValidationError::NonFinite { field: "distance" });
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::WARN);

        let err = MaptrackError::from(StorageError::Unavailable {
            reason: "quota".to_string(),
        });
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_controller_errors_log_by_severity() {
        let denied = MaptrackError::from(GeolocationError::PermissionDenied);
        assert_eq!(denied.severity().to_tracing_level(), tracing::Level::WARN);
        denied.log("Map not loaded");

        let write_failed = MaptrackError::from(StorageError::Io {
            key: "workouts".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        });
        assert_eq!(write_failed.severity().to_tracing_level(), tracing::Level::ERROR);
        write_failed.log("Failed to persist session");
    }

    #[test]
    fn test_user_messages() {
        let err = MaptrackError::from(ValidationError::NonPositive {
            field: "distance",
            value: -1.0,
        });
        assert_eq!(err.user_message(), "Input must be a positive number!");

        let err = MaptrackError::from(GeolocationError::PermissionDenied);
        assert!(err.user_message().contains("location"));
    }

    #[test]
    fn test_validation_display() {
        let err = ValidationError::NonPositive {
            field: "cadence",
            value: 0.0,
        };
        assert_eq!(err.to_string(), "cadence must be positive, got 0");
    }
}
