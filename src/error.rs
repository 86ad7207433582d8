//! Error types for device inventory operations.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for inventory operations.
#[derive(Error, Debug)]
pub enum InvError {
    // Storage errors
    #[error("Could not determine storage location: {0}")]
    StorageLocation(String),

    #[error("Failed to write inventory to {}: {reason}", path.display())]
    StorageWrite { path: PathBuf, reason: String },

    #[error("Failed to encode inventory: {0}")]
    Encode(#[from] serde_json::Error),

    // Record errors
    #[error("Device not found: {selector}")]
    DeviceNotFound { selector: String },

    #[error("Selector '{selector}' matches several devices: {ids:?}")]
    AmbiguousSelector { selector: String, ids: Vec<String> },

    #[error("Invalid position {index}: inventory has {len} devices")]
    InvalidPosition { index: usize, len: usize },

    #[error("Invalid purchase date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Unknown device category '{value}'")]
    InvalidCategory { value: String },

    // Currency errors
    #[error("Invalid currency code '{value}': expected three letters")]
    InvalidCurrency { value: String },

    #[error("Rate lookup failed: {0}")]
    RateFetch(String),

    #[error("Rate table has no entry for {currency}")]
    RateMissing { currency: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Configuration file already exists: {}", path.display())]
    ConfigExists { path: PathBuf },

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl InvError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DeviceNotFound { .. }
                | Self::AmbiguousSelector { .. }
                | Self::InvalidPosition { .. }
                | Self::InvalidDate { .. }
                | Self::InvalidCategory { .. }
                | Self::InvalidCurrency { .. }
                | Self::ConfigNotFound { .. }
                | Self::ConfigExists { .. }
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::DeviceNotFound { .. } => Some("Run: inv list"),
            Self::AmbiguousSelector { .. } => Some("Use more characters of the id, or the list position"),
            Self::InvalidPosition { .. } => Some("Positions start at 0; run: inv list"),
            Self::InvalidDate { .. } => Some("Use a date like 2023-11-20"),
            Self::InvalidCategory { .. } => Some("Run: inv categories"),
            Self::InvalidCurrency { .. } => Some("Use an ISO 4217 code such as EUR or USD"),
            Self::ConfigNotFound { .. } => Some("Check the --config path or INV_CONFIG"),
            Self::ConfigExists { .. } => Some("Edit the file, or remove it and run: inv config --init"),
            Self::StorageLocation(_) => Some("Set --data-file or INV_DATA_FILE"),
            Self::StorageWrite { .. } => Some("Check permissions and free space for the data file"),
            _ => None,
        }
    }
}

/// Convenience type alias for Results using InvError.
pub type Result<T> = std::result::Result<T, InvError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| InvError::Other(format!("{}: {e}", f().into())))
    }
}
