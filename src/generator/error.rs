//! Generator error types

use thiserror::Error;

/// Errors raised while constructing a query generator.
///
/// Query generation itself is infallible; only misconfiguration is reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    /// The database configuration lacks the database/bucket name
    #[error("Missing database name: database config has no `{0}` entry")]
    MissingDatabaseName(&'static str),
}

/// Result type for generator construction
pub type GeneratorResult<T> = Result<T, GeneratorError>;
