//! Error types for the test framework

use thiserror::Error;

/// Errors that can occur during regression testing
#[derive(Debug, Error)]
pub enum TestError {
    /// Building a fixture failed
    #[error("fixture error: {0}")]
    Core(#[from] objcount_core::Error),

    /// Invalid fixture geometry
    #[error("invalid fixture: {0}")]
    InvalidFixture(String),

    /// Failed to write a regression artifact
    #[error("failed to write '{path}': {message}")]
    ArtifactWrite { path: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
