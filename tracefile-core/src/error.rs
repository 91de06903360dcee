//! Error types for tracefile operations

use std::path::PathBuf;

/// Result type for tracefile operations
pub type Result<T> = std::result::Result<T, TracefileError>;

/// Error types for the trace recorder
#[derive(Debug, thiserror::Error)]
pub enum TracefileError {
    /// Output file could not be opened for writing
    #[error("Failed to open trace file {path}: {source}")]
    SinkOpen {
        /// Path that was requested
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Buffer capacity must be positive
    #[error("Invalid buffer capacity: {0} (must be at least 1)")]
    InvalidCapacity(usize),

    /// The tracer has already been closed
    #[error("Tracer is closed")]
    Closed,

    /// A global tracer was already installed for this process
    #[error("Global tracer already initialized")]
    AlreadyInitialized,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
