//! Error types for folio-core
//!
//! Two families matter to callers: validation errors (bad input, rejected
//! before the store is touched) and service errors (the store failed). Layout
//! passes that cannot run are not errors; see [`folio_types::LayoutOutcome`].

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for folio operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // Validation Errors
    // ===================
    #[error("Invalid {field}: '{value}' is not a date (expected YYYY-MM-DD or RFC 3339)")]
    InvalidDate { field: &'static str, value: String },

    #[error("Invalid period '{value}' (expected one of 7d, 30d, 90d, 1y)")]
    InvalidPeriod { value: String },

    #[error("Invalid window: {message}")]
    InvalidWindow { message: String },

    #[error("Invalid {field}: {message}")]
    InvalidInput { field: &'static str, message: String },

    // ===================
    // Service Errors
    // ===================
    #[error("Database error during {operation}")]
    Database {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    #[error("Not found: {entity} {key}")]
    NotFound { entity: &'static str, key: String },

    // ===================
    // Config Errors
    // ===================
    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl CoreError {
    /// Wrap a rusqlite error with the operation that produced it
    pub fn database(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| CoreError::Database { operation, source }
    }

    /// Input was rejected before any data access
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidDate { .. }
                | CoreError::InvalidPeriod { .. }
                | CoreError::InvalidWindow { .. }
                | CoreError::InvalidInput { .. }
        )
    }

    /// The backing store failed
    pub fn is_service(&self) -> bool {
        matches!(
            self,
            CoreError::Database { .. } | CoreError::StoreUnavailable { .. }
        )
    }
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;
