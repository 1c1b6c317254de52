//! # metaquery-bench
//!
//! Benchmark query generation and timed HTTP execution for InfluxDB, in both
//! of its query dialects (InfluxQL and Flux).
//!
//! ## Modules
//!
//! - [`query`]: time intervals, dialects, and the pooled `Query` descriptor
//! - [`generator`]: metaquery generation (tag values, field keys, cardinality)
//! - [`client`]: blocking HTTP execution client with latency measurement
//! - [`runner`]: multi-worker benchmark driver
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use metaquery_bench::client::HttpClient;
//! use metaquery_bench::generator::*;
//! use metaquery_bench::query::*;
//! use std::time::Duration;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut db = DatabaseConfig::new();
//!     db.insert(DATABASE_NAME.to_string(), "benchmark_db".to_string());
//!     let range = TimeInterval::parse("2016-01-01T00:00:00Z", "2016-01-02T00:00:00Z")
//!         .ok_or("bad range")?;
//!
//!     let generator = InfluxMetaquery::new(Language::InfluxQL, &db, range, 1)?;
//!     let pool = QueryPool::new(1);
//!     let mut query = pool.acquire();
//!     generator.cardinality(&mut query);
//!
//!     let timeout = Duration::from_secs(30);
//!     let client = HttpClient::new("http://localhost:8086", 0, timeout, timeout, timeout)?;
//!     client.ping();
//!     match client.execute(&query, None) {
//!         Ok(ms) => println!("{} took {:.2}ms", query.human_label, ms),
//!         Err(e) => eprintln!("failed after {:.2}ms: {}", e.lag_ms, e),
//!     }
//!     pool.release(query);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod generator;
pub mod query;
pub mod runner;

#[cfg(test)]
mod test_support;

// Re-export top-level types for convenience
pub use query::{Language, Query, QueryPool, TimeInterval};

pub use generator::{
    DatabaseConfig, GeneratorError, InfluxMetaquery, KindDispatcher, Metaqueries, MetaqueryKind,
    QueryGenerator,
};

pub use client::{ClientError, ExecuteError, HttpClient, RequestOptions};

pub use config::{Config, ConfigError, LoggingConfig, QueryType};

pub use runner::{RunSettings, RunSummary};
