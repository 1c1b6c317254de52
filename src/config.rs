//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::generator::{DatabaseConfig, MetaqueryKind, DATABASE_NAME, PASSWORD, USER_NAME};
use crate::query::{Language, TimeInterval};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub benchmark: BenchmarkConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Target server and HTTP timeouts
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_dial_timeout")]
    pub dial_timeout_ms: u64,

    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,

    #[serde(default = "default_write_timeout")]
    pub write_timeout_ms: u64,
}

fn default_host() -> String {
    "http://localhost:8086".to_string()
}

fn default_dial_timeout() -> u64 {
    10_000 // 10 seconds
}

fn default_read_timeout() -> u64 {
    60_000 // 1 minute
}

fn default_write_timeout() -> u64 {
    60_000
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            dial_timeout_ms: default_dial_timeout(),
            read_timeout_ms: default_read_timeout(),
            write_timeout_ms: default_write_timeout(),
        }
    }
}

impl TargetConfig {
    pub fn dial_timeout(&self) -> Duration {
        Duration::from_millis(self.dial_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

/// Database (or bucket) and credentials
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
    /// Database name for InfluxQL, bucket name for Flux
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// What to generate and how hard to drive the server
#[derive(Debug, Clone, Deserialize)]
pub struct BenchmarkConfig {
    #[serde(default = "default_language")]
    pub language: Language,

    #[serde(default = "default_query_type")]
    pub query_type: QueryType,

    #[serde(default = "default_queries")]
    pub queries: usize,

    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default = "default_start")]
    pub start: String,

    #[serde(default = "default_end")]
    pub end: String,

    #[serde(default = "default_scale_var")]
    pub scale_var: usize,

    /// Diagnostic tier 0-4
    #[serde(default)]
    pub debug: u8,

    #[serde(default)]
    pub pretty_print: bool,
}

/// Which generator entry point the driver iterates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum QueryType {
    /// A named metaquery, via `KindDispatcher`
    Metaquery(MetaqueryKind),
    /// The generator's own root `dispatch`
    Dispatch,
}

impl TryFrom<String> for QueryType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value).ok_or_else(|| format!("unknown query type {:?}", value))
    }
}

impl QueryType {
    pub fn from_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("dispatch") {
            return Some(Self::Dispatch);
        }
        MetaqueryKind::from_str(s).map(Self::Metaquery)
    }
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Metaquery(kind) => write!(f, "{}", kind),
            Self::Dispatch => write!(f, "dispatch"),
        }
    }
}

fn default_language() -> Language {
    Language::InfluxQL
}

fn default_query_type() -> QueryType {
    QueryType::Metaquery(MetaqueryKind::TagValues)
}

fn default_queries() -> usize {
    1000
}

fn default_workers() -> usize {
    1
}

fn default_start() -> String {
    "2016-01-01T00:00:00Z".to_string()
}

fn default_end() -> String {
    "2016-01-02T00:00:00Z".to_string()
}

fn default_scale_var() -> usize {
    1
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            query_type: default_query_type(),
            queries: default_queries(),
            workers: default_workers(),
            start: default_start(),
            end: default_end(),
            scale_var: default_scale_var(),
            debug: 0,
            pretty_print: false,
        }
    }
}

impl BenchmarkConfig {
    /// Parse the configured start/end into an interval
    pub fn interval(&self) -> Result<TimeInterval, ConfigError> {
        TimeInterval::parse(&self.start, &self.end).ok_or_else(|| ConfigError::Invalid {
            field: "benchmark.start/end",
            error: format!("expected RFC-3339 start <= end, got {} .. {}", self.start, self.end),
        })
    }
}

impl BenchmarkConfig {
    /// Reject settings that cannot produce a meaningful timed run.
    ///
    /// The root `dispatch` path hands back unpopulated queries, so it is only
    /// useful for printing.
    pub fn check_runnable(&self, print_only: bool) -> Result<(), ConfigError> {
        if self.query_type == QueryType::Dispatch && !print_only {
            return Err(ConfigError::Invalid {
                field: "benchmark.query_type",
                error: "dispatch produces unpopulated queries; use it with --print-queries"
                    .to_string(),
            });
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("metaquery-bench").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Target overrides
        if let Ok(host) = std::env::var("METAQUERY_HOST") {
            self.target.host = host;
        }

        // Database overrides
        if let Ok(name) = std::env::var("METAQUERY_DB_NAME") {
            self.database.name = Some(name);
        }
        if let Ok(user) = std::env::var("METAQUERY_DB_USER") {
            self.database.username = Some(user);
        }
        if let Ok(password) = std::env::var("METAQUERY_DB_PASSWORD") {
            self.database.password = Some(password);
        }

        // Benchmark overrides
        if let Ok(language) = std::env::var("METAQUERY_LANGUAGE") {
            match Language::from_str(&language) {
                Some(l) => self.benchmark.language = l,
                None => tracing::warn!("Ignoring unknown METAQUERY_LANGUAGE {:?}", language),
            }
        }
        if let Ok(workers) = std::env::var("METAQUERY_WORKERS") {
            if let Ok(w) = workers.parse() {
                self.benchmark.workers = w;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("METAQUERY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("METAQUERY_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Key/value view of the database settings for query generators.
    ///
    /// Only keys that are set are present, so a missing name is caught when
    /// the generator is built.
    pub fn database_config(&self) -> DatabaseConfig {
        let mut config = DatabaseConfig::new();
        let entries = [
            (DATABASE_NAME, &self.database.name),
            (USER_NAME, &self.database.username),
            (PASSWORD, &self.database.password),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                config.insert(key.to_string(), value.clone());
            }
        }
        config
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid value for {field}: {error}")]
    Invalid { field: &'static str, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# metaquery-bench configuration
#
# Environment variables override these settings:
# - METAQUERY_HOST
# - METAQUERY_DB_NAME, METAQUERY_DB_USER, METAQUERY_DB_PASSWORD
# - METAQUERY_LANGUAGE
# - METAQUERY_WORKERS
# - METAQUERY_LOG_LEVEL
# - METAQUERY_LOG_FORMAT

[target]
# Base URL of the InfluxDB server
host = "http://localhost:8086"

# Connection timeout (ms)
dial_timeout_ms = 10000

# Whole-request timeout (ms)
read_timeout_ms = 60000

# Write timeout (ms)
write_timeout_ms = 60000

[database]
# Database (InfluxQL) or bucket (Flux) name. Required.
name = "benchmark_db"

# Optional credentials
# username = ""
# password = ""

[benchmark]
# Query language: influxql or flux
language = "influxql"

# tag-values, field-keys, cardinality, or dispatch
query_type = "tag-values"

# Total number of queries to run
queries = 1000

# Parallel workers, each with its own connection
workers = 1

# Full query time range (RFC-3339)
start = "2016-01-01T00:00:00Z"
end = "2016-01-02T00:00:00Z"

# Scale variable of the generated data set
scale_var = 1

# Diagnostic tier 0-4
debug = 0

# Pretty-print response bodies
pretty_print = false

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty or json
format = "pretty"

# Optional log file path
# file = "/var/log/metaquery-bench.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.target.host, "http://localhost:8086");
        assert_eq!(config.target.read_timeout(), Duration::from_secs(60));
        assert_eq!(config.benchmark.language, Language::InfluxQL);
        assert_eq!(
            config.benchmark.query_type,
            QueryType::Metaquery(MetaqueryKind::TagValues)
        );
        assert!(config.database.name.is_none());
    }

    #[test]
    fn test_default_config_file_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.database.name.as_deref(), Some("benchmark_db"));
        assert_eq!(config.benchmark.queries, 1000);
        assert!(config.benchmark.interval().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[target]
host = "http://influx:8086"

[database]
name = "bench"
username = "admin"

[benchmark]
language = "flux"
query_type = "cardinality"
workers = 4
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.target.host, "http://influx:8086");
        assert_eq!(config.target.dial_timeout_ms, 10_000);
        assert_eq!(config.benchmark.language, Language::Flux);
        assert_eq!(
            config.benchmark.query_type,
            QueryType::Metaquery(MetaqueryKind::Cardinality)
        );
        assert_eq!(config.benchmark.workers, 4);

        let db = config.database_config();
        assert_eq!(db.get(DATABASE_NAME).map(String::as_str), Some("bench"));
        assert_eq!(db.get(USER_NAME).map(String::as_str), Some("admin"));
        assert!(!db.contains_key(PASSWORD));
    }

    #[test]
    fn test_dispatch_query_type() {
        let config: Config = toml::from_str("[benchmark]\nquery_type = \"dispatch\"\n").unwrap();
        assert_eq!(config.benchmark.query_type, QueryType::Dispatch);
    }

    #[test]
    fn test_load_errors() {
        let err = Config::load(Path::new("/nonexistent/metaquery.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[benchmark]\nlanguage = \"sql\"").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_invalid_interval() {
        let mut config = BenchmarkConfig::default();
        config.start = "2020-01-02T00:00:00Z".to_string();
        config.end = "2020-01-01T00:00:00Z".to_string();
        assert!(matches!(config.interval(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_dispatch_is_print_only() {
        let mut config = BenchmarkConfig::default();
        assert!(config.check_runnable(false).is_ok());

        config.query_type = QueryType::Dispatch;
        assert!(config.check_runnable(true).is_ok());
        assert!(matches!(
            config.check_runnable(false),
            Err(ConfigError::Invalid {
                field: "benchmark.query_type",
                ..
            })
        ));
    }

    #[test]
    fn test_query_type_parse() {
        assert_eq!(QueryType::from_str("DISPATCH"), Some(QueryType::Dispatch));
        assert_eq!(
            QueryType::from_str("field-keys"),
            Some(QueryType::Metaquery(MetaqueryKind::FieldKeys))
        );
        assert_eq!(QueryType::from_str("nope"), None);
    }
}
