//! Query Generators
//!
//! Generators turn a fixed set of operations into dialect-correct query text
//! and package it into a [`Query`]:
//!
//! - **QueryGenerator**: one generic `dispatch(i)` entry point, so a driver
//!   can loop over many queries without knowing their kind
//! - **Metaqueries**: the named metaquery operations, called directly when a
//!   specific query is wanted
//! - **InfluxMetaquery**: InfluxQL/Flux implementation of both
//! - **KindDispatcher**: binds `dispatch` to one named operation
//!
//! # Example
//!
//! ```rust,no_run
//! use metaquery_bench::generator::*;
//! use metaquery_bench::query::{Language, Query, TimeInterval};
//!
//! let mut config = DatabaseConfig::new();
//! config.insert(DATABASE_NAME.to_string(), "bench".to_string());
//! let range = TimeInterval::parse("2020-01-01T00:00:00Z", "2020-01-02T00:00:00Z").unwrap();
//!
//! let gen = InfluxMetaquery::new(Language::Flux, &config, range, 1)?;
//! let mut q = Query::new();
//! gen.field_keys(&mut q);
//! # Ok::<(), GeneratorError>(())
//! ```

mod common;
mod error;
mod kind;
mod metaquery;

use std::collections::HashMap;

use crate::query::{Query, QueryPool};

pub use common::{InfluxCommon, FLUX_PATH, INFLUXQL_PATH};
pub use error::{GeneratorError, GeneratorResult};
pub use kind::{KindDispatcher, MetaqueryKind};
pub use metaquery::{
    InfluxMetaquery, CARDINALITY_START, CARDINALITY_STOP, EXAMPLE_MEASUREMENT, EXAMPLE_TAG_KEY,
    METAQUERY_LIMIT,
};

/// Connection settings for the target database, keyed by the constants below
pub type DatabaseConfig = HashMap<String, String>;

/// Database (InfluxQL) or bucket (Flux) name. Required.
pub const DATABASE_NAME: &str = "database-name";

/// Optional user name
pub const USER_NAME: &str = "username";

/// Optional password
pub const PASSWORD: &str = "password";

/// Uniform entry point for drivers iterating over generated queries
pub trait QueryGenerator: Send + Sync {
    /// Produce the query for sequential index `index`, taken from `pool`
    fn dispatch(&self, index: usize, pool: &QueryPool) -> Query;
}

/// Schema/metadata queries
pub trait Metaqueries {
    /// All values of the example tag key, capped at 200
    fn tag_values(&self, q: &mut Query);

    /// All field keys of the example measurement, capped at 200
    fn field_keys(&self, q: &mut Query);

    /// Exact series cardinality of the whole database
    fn cardinality(&self, q: &mut Query);
}
