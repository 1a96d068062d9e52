//! Error types and handling for the ferrovias tracker

use thiserror::Error;

/// Main error type for the tracker
///
/// The position engine itself never fails; these errors only come from the
/// edges around it (configuration, topology files, the status feed, the cache).
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Status feed communication errors
    #[error("Feed error: {message}")]
    Feed { message: String },

    /// Invalid line topology
    #[error("Topology error: {message}")]
    Topology { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TrackerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new feed error
    pub fn feed<S: Into<String>>(message: S) -> Self {
        Self::Feed {
            message: message.into(),
        }
    }

    /// Create a new topology error
    pub fn topology<S: Into<String>>(message: S) -> Self {
        Self::Topology {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TrackerError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            TrackerError::Feed { .. } => {
                "Unable to reach the station status feed. Please check your internet connection."
                    .to_string()
            }
            TrackerError::Topology { message } => {
                format!("Invalid line topology: {message}")
            }
            TrackerError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
            TrackerError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
