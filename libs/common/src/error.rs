//! Error types shared by the services
//!
//! Database bootstrap failures and signing-key loading failures live here so
//! both the identity service and the playlist API report them the same way.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred while applying the bundled schema
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Failure to load a PEM key referenced by configuration
#[derive(Error, Debug)]
pub enum KeyError {
    /// The environment variable holding the key (or its path) is unset
    #[error("{0} environment variable not set")]
    Missing(String),

    /// The key was given as a path that could not be read
    #[error("Failed to read key file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
