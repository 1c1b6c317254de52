//! Query Primitives
//!
//! Building blocks shared by generators and the execution client:
//!
//! - **TimeInterval**: the full query range, rendered per dialect
//! - **Language**: InfluxQL or Flux
//! - **Query**: a reusable HTTP request descriptor
//! - **QueryPool**: acquire/release pool of `Query` values

mod interval;
mod pool;
mod types;

pub use interval::{render as render_time, TimeInterval};
pub use pool::QueryPool;
pub use types::{Language, Query};
