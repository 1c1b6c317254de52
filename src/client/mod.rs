//! HTTP Execution Client
//!
//! Turns a populated [`Query`](crate::query::Query) into a timed HTTP round
//! trip:
//!
//! - **HttpClient**: blocking client, one request in flight per instance
//! - **RequestOptions**: opt-in debug tiers and response pretty-printing
//! - **ExecuteError**: failure plus the latency measured before it

mod diagnostics;
mod error;
mod http;

pub use diagnostics::{write_debug, write_diagnostics, write_pretty, RequestOptions};
pub use error::{ClientError, ClientResult, ExecuteError};
pub use http::{HttpClient, PING_PATH};
