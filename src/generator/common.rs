//! InfluxDB request building shared by all generators
//!
//! Holds the dialect, target database and credentials, and knows how to turn
//! query text into the HTTP request each dialect's endpoint expects:
//!
//! - InfluxQL: `GET /query?db=<db>&q=<query>`
//! - Flux: `POST /api/v2/query` with a JSON body

use crate::query::{Language, Query, TimeInterval};

use super::error::{GeneratorError, GeneratorResult};
use super::{DatabaseConfig, DATABASE_NAME, PASSWORD, USER_NAME};

/// Endpoint for InfluxQL queries
pub const INFLUXQL_PATH: &str = "/query";

/// Endpoint for Flux queries
pub const FLUX_PATH: &str = "/api/v2/query";

/// State shared by every InfluxDB query generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfluxCommon {
    pub language: Language,
    pub database_name: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub all_interval: TimeInterval,
    pub scale_var: usize,
}

impl InfluxCommon {
    /// Build from a database config, which must name the database
    pub fn new(
        language: Language,
        db_config: &DatabaseConfig,
        all_interval: TimeInterval,
        scale_var: usize,
    ) -> GeneratorResult<Self> {
        let database_name = db_config
            .get(DATABASE_NAME)
            .cloned()
            .ok_or(GeneratorError::MissingDatabaseName(DATABASE_NAME))?;

        Ok(Self {
            language,
            database_name,
            username: non_empty(db_config.get(USER_NAME)),
            password: non_empty(db_config.get(PASSWORD)),
            all_interval,
            scale_var,
        })
    }

    /// Fill `q` with an HTTP request carrying `query` in this dialect
    pub fn fill_http_query(
        &self,
        human_label: &str,
        human_description: &str,
        query: &str,
        q: &mut Query,
    ) {
        match self.language {
            Language::InfluxQL => {
                let mut path = format!(
                    "{}?db={}&q={}",
                    INFLUXQL_PATH,
                    urlencoding::encode(&self.database_name),
                    urlencoding::encode(query)
                );
                self.push_credentials(&mut path, '&');
                q.fill("GET", &path, b"", human_label, human_description);
            }
            Language::Flux => {
                let mut path = FLUX_PATH.to_string();
                self.push_credentials(&mut path, '?');
                let body = serde_json::json!({
                    "query": query,
                    "type": "flux",
                })
                .to_string();
                q.fill("POST", &path, body.as_bytes(), human_label, human_description);
            }
        }
    }

    fn push_credentials(&self, path: &mut String, first_separator: char) {
        let mut separator = first_separator;
        if let Some(user) = &self.username {
            path.push(separator);
            path.push_str("u=");
            path.push_str(&urlencoding::encode(user));
            separator = '&';
        }
        if let Some(password) = &self.password {
            path.push(separator);
            path.push_str("p=");
            path.push_str(&urlencoding::encode(password));
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval() -> TimeInterval {
        TimeInterval::parse("2020-01-01T00:00:00Z", "2020-01-02T00:00:00Z").unwrap()
    }

    fn config(pairs: &[(&str, &str)]) -> DatabaseConfig {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_missing_database_name() {
        let err = InfluxCommon::new(Language::Flux, &config(&[]), interval(), 1).unwrap_err();
        assert_eq!(err, GeneratorError::MissingDatabaseName(DATABASE_NAME));
    }

    #[test]
    fn test_influxql_request_shape() {
        let common =
            InfluxCommon::new(Language::InfluxQL, &config(&[(DATABASE_NAME, "bench")]), interval(), 1)
                .unwrap();
        let mut q = Query::new();
        common.fill_http_query("label", "n/a", "SHOW DATABASES", &mut q);

        assert_eq!(q.method, "GET");
        assert_eq!(q.path, "/query?db=bench&q=SHOW%20DATABASES");
        assert!(q.body.is_empty());
        assert_eq!(q.human_label, "label");
        assert_eq!(q.human_description, "n/a");
    }

    #[test]
    fn test_flux_request_shape() {
        let common =
            InfluxCommon::new(Language::Flux, &config(&[(DATABASE_NAME, "bench")]), interval(), 1)
                .unwrap();
        let mut q = Query::new();
        common.fill_http_query("label", "n/a", "buckets()", &mut q);

        assert_eq!(q.method, "POST");
        assert_eq!(q.path, FLUX_PATH);
        let body: serde_json::Value = serde_json::from_slice(&q.body).unwrap();
        assert_eq!(body["query"], "buckets()");
        assert_eq!(body["type"], "flux");
    }

    #[test]
    fn test_credentials_are_appended() {
        let cfg = config(&[(DATABASE_NAME, "bench"), (USER_NAME, "admin"), (PASSWORD, "s3cr&t")]);

        let influxql = InfluxCommon::new(Language::InfluxQL, &cfg, interval(), 1).unwrap();
        let mut q = Query::new();
        influxql.fill_http_query("label", "n/a", "SHOW DATABASES", &mut q);
        assert!(q.path.ends_with("&u=admin&p=s3cr%26t"));

        let flux = InfluxCommon::new(Language::Flux, &cfg, interval(), 1).unwrap();
        flux.fill_http_query("label", "n/a", "buckets()", &mut q);
        assert_eq!(q.path, "/api/v2/query?u=admin&p=s3cr%26t");
    }

    #[test]
    fn test_empty_credentials_are_ignored() {
        let cfg = config(&[(DATABASE_NAME, "bench"), (USER_NAME, ""), (PASSWORD, "")]);
        let common = InfluxCommon::new(Language::Flux, &cfg, interval(), 1).unwrap();
        assert!(common.username.is_none());
        assert!(common.password.is_none());
    }
}
