//! Execution client error types

use thiserror::Error;

/// Errors that can occur while executing a query over HTTP
#[derive(Error, Debug)]
pub enum ClientError {
    /// The underlying HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The query carries a method the HTTP layer rejects
    #[error("Invalid HTTP method: {0:?}")]
    InvalidMethod(String),

    /// Connect, timeout, or body read failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with something other than 200 OK
    #[error("Invalid response (status {status}): {body}")]
    Status { status: u16, body: String },

    /// Writing debug or pretty-printed output failed
    #[error("Diagnostic output failed: {0}")]
    Diagnostics(#[from] std::io::Error),
}

/// A failed execution, with the latency measured up to the failure
#[derive(Error, Debug)]
#[error("{source} (after {lag_ms:.2}ms)")]
pub struct ExecuteError {
    /// Milliseconds from dispatch to the error being observed
    pub lag_ms: f64,
    pub source: ClientError,
}

impl ExecuteError {
    pub fn new(lag_ms: f64, source: ClientError) -> Self {
        Self { lag_ms, source }
    }

    /// HTTP status, if the server responded
    pub fn status(&self) -> Option<u16> {
        match &self.source {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for client construction
pub type ClientResult<T> = Result<T, ClientError>;
