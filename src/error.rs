//! Unified error handling for the gps-location library.
//!
//! None of these errors escape `LocationTracker::init()` or
//! `LocationTracker::get_location()`. Provider conditions are classified here
//! so they can be logged consistently; platform, configuration and I/O
//! failures are returned from the fallible helpers around the tracker.

use std::fmt;

/// Unified error type for gps-location operations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
pub enum TrackerError {
    /// The host has not granted the permission the tracker needs
    PermissionDenied { permission: String },
    /// Provider reported OUT_OF_SERVICE or TEMPORARILY_UNAVAILABLE
    ProviderUnavailable { provider: String, status: String },
    /// Provider reported a status code outside 0..=2
    UnknownStatus { provider: String, code: i32 },
    /// The platform location service rejected a request
    Platform { message: String },
    /// Configuration error
    Config { message: String },
    /// File or serialization I/O error
    Io { message: String },
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::PermissionDenied { permission } => {
                write!(f, "Permission '{}' not granted", permission)
            }
            TrackerError::ProviderUnavailable { provider, status } => {
                write!(f, "Provider '{}' unavailable: {}", provider, status)
            }
            TrackerError::UnknownStatus { provider, code } => {
                write!(
                    f,
                    "Provider '{}' reported status {}: no valid state found",
                    provider, code
                )
            }
            TrackerError::Platform { message } => write!(f, "Platform error: {}", message),
            TrackerError::Config { message } => write!(f, "Configuration error: {}", message),
            TrackerError::Io { message } => write!(f, "I/O error: {}", message),
        }
    }
}

impl std::error::Error for TrackerError {}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Config {
            message: err.to_string(),
        }
    }
}

/// Result type alias for gps-location operations.
pub type Result<T> = std::result::Result<T, TrackerError>;
