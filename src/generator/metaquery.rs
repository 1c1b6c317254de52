//! Metaquery generator
//!
//! Metaqueries ask the server about its schema rather than its data: the
//! values of a tag key, the field keys of a measurement, and the series
//! cardinality of a database. Each operation has an InfluxQL and a Flux form
//! that address the same subset of data.

use crate::query::{Language, Query, QueryPool, TimeInterval};

use super::common::InfluxCommon;
use super::error::GeneratorResult;
use super::{DatabaseConfig, Metaqueries, QueryGenerator};

/// Measurement every metaquery targets
pub const EXAMPLE_MEASUREMENT: &str = "example_measurement";

/// Tag key enumerated by the tag values metaquery
pub const EXAMPLE_TAG_KEY: &str = "X";

/// Maximum rows requested by tag and field enumeration
pub const METAQUERY_LIMIT: usize = 200;

/// Fixed upper bound of the Flux cardinality window
pub const CARDINALITY_STOP: &str = "2030-01-01T00:00:00Z";

/// Lookback of the Flux cardinality window
pub const CARDINALITY_START: &str = "-100y";

/// Generates metaqueries for InfluxDB in either dialect
#[derive(Debug, Clone)]
pub struct InfluxMetaquery {
    common: InfluxCommon,
}

impl InfluxMetaquery {
    /// Create a generator. Fails if `db_config` has no database name.
    pub fn new(
        language: Language,
        db_config: &DatabaseConfig,
        queries_full_range: TimeInterval,
        scale_var: usize,
    ) -> GeneratorResult<Self> {
        Ok(Self {
            common: InfluxCommon::new(language, db_config, queries_full_range, scale_var)?,
        })
    }

    pub fn language(&self) -> Language {
        self.common.language
    }

    pub fn database_name(&self) -> &str {
        &self.common.database_name
    }

    pub fn common(&self) -> &InfluxCommon {
        &self.common
    }

    /// Flux pipeline listing distinct values of `column` in the example measurement
    fn flux_distinct(&self, column: &str) -> String {
        let interval = &self.common.all_interval;
        format!(
            "from(bucket: \"{bucket}\") \
             |> range(start: {start}, stop: {stop}) \
             |> filter(fn: (r) => (r[\"_measurement\"] == \"{measurement}\")) \
             |> keep(columns: [\"{column}\"]) \
             |> group() \
             |> distinct(column: \"{column}\") \
             |> limit(n: {limit}) \
             |> sort()",
            bucket = self.common.database_name,
            start = interval.start_string(Language::Flux),
            stop = interval.end_string(Language::Flux),
            measurement = EXAMPLE_MEASUREMENT,
            column = column,
            limit = METAQUERY_LIMIT,
        )
    }
}

impl QueryGenerator for InfluxMetaquery {
    /// Root dispatch: hands back a pooled query without populating it.
    ///
    /// Drivers that need a concrete metaquery wrap this generator in a
    /// [`KindDispatcher`](super::KindDispatcher) or call the named operations.
    fn dispatch(&self, _index: usize, pool: &QueryPool) -> Query {
        pool.acquire()
    }
}

impl Metaqueries for InfluxMetaquery {
    fn tag_values(&self, q: &mut Query) {
        let query = match self.common.language {
            Language::InfluxQL => format!(
                "SHOW TAG VALUES FROM \"{}\" WITH KEY = \"{}\" LIMIT {}",
                EXAMPLE_MEASUREMENT, EXAMPLE_TAG_KEY, METAQUERY_LIMIT
            ),
            Language::Flux => self.flux_distinct(EXAMPLE_TAG_KEY),
        };

        let human_label = format!(
            "InfluxDB ({}) tag values for KEY = \"{}\"",
            self.common.language, EXAMPLE_TAG_KEY
        );
        self.common.fill_http_query(&human_label, "n/a", &query, q);
    }

    fn field_keys(&self, q: &mut Query) {
        let query = match self.common.language {
            Language::InfluxQL => format!(
                "SHOW FIELD KEYS FROM \"{}\" LIMIT {}",
                EXAMPLE_MEASUREMENT, METAQUERY_LIMIT
            ),
            Language::Flux => self.flux_distinct("_field"),
        };

        let human_label = format!("InfluxDB ({}) field keys", self.common.language);
        self.common.fill_http_query(&human_label, "n/a", &query, q);
    }

    // InfluxQL cardinality ignores time; Flux requires a range, so it gets one
    // wide enough to cover every shard.
    fn cardinality(&self, q: &mut Query) {
        let query = match self.common.language {
            Language::InfluxQL => format!(
                "SHOW SERIES EXACT CARDINALITY ON {}",
                self.common.database_name
            ),
            Language::Flux => format!(
                "import \"influxdata/influxdb\"\n\n\
                 influxdb.cardinality(\n    \
                     bucket: \"{}\",\n    \
                     start: {},\n    \
                     stop: {},\n\
                 )",
                self.common.database_name, CARDINALITY_START, CARDINALITY_STOP
            ),
        };

        let human_label = format!("InfluxDB ({}) Series Cardinality", self.common.language);
        self.common.fill_http_query(&human_label, "n/a", &query, q);
    }
}
