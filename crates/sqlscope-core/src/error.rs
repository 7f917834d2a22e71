//! Error types for sqlscope

use thiserror::Error;

/// Core error type for sqlscope operations
#[derive(Error, Debug)]
pub enum SqlScopeError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Plan analysis error: {0}")]
    PlanAnalysis(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

/// Result type alias for sqlscope operations
pub type Result<T> = std::result::Result<T, SqlScopeError>;
