//! Query language and request descriptor types
//!
//! - `Language`: which InfluxDB dialect a generator emits
//! - `Query`: a reusable HTTP request descriptor filled by generators

use serde::{Deserialize, Serialize};

/// Query dialects understood by the target database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// SQL-like `SHOW ...` / `SELECT ...` dialect
    InfluxQL,
    /// Functional pipeline dialect (`from() |> range() |> ...`)
    Flux,
}

impl Language {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "influxql" | "sql" => Some(Self::InfluxQL),
            "flux" => Some(Self::Flux),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InfluxQL => write!(f, "InfluxQL"),
            Self::Flux => write!(f, "Flux"),
        }
    }
}

/// A reusable HTTP request descriptor.
///
/// Instances come from a [`QueryPool`](super::QueryPool). A generator fills
/// one in, the execution client reads it, and the driver hands it back to the
/// pool. Buffers are cleared rather than dropped so their capacity is reused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// HTTP method, e.g. `GET`
    pub method: String,
    /// Path and query string, appended to the client host
    pub path: String,
    /// Request body (empty for GET requests)
    pub body: Vec<u8>,
    /// Short label used in reports; never sent to the server
    pub human_label: String,
    /// Longer description used in reports; never sent to the server
    pub human_description: String,
    /// Identifier assigned by the pool on acquisition
    pub id: u64,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite every request field in place
    pub fn fill(
        &mut self,
        method: &str,
        path: &str,
        body: &[u8],
        human_label: &str,
        human_description: &str,
    ) {
        self.method.clear();
        self.method.push_str(method);
        self.path.clear();
        self.path.push_str(path);
        self.body.clear();
        self.body.extend_from_slice(body);
        self.human_label.clear();
        self.human_label.push_str(human_label);
        self.human_description.clear();
        self.human_description.push_str(human_description);
    }

    /// Clear all fields, keeping allocated capacity
    pub fn reset(&mut self) {
        self.method.clear();
        self.path.clear();
        self.body.clear();
        self.human_label.clear();
        self.human_description.clear();
        self.id = 0;
    }

    /// True if no generator has populated this query yet
    pub fn is_empty(&self) -> bool {
        self.method.is_empty() && self.path.is_empty()
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "HumanLabel: \"{}\", HumanDescription: \"{}\", Method: \"{}\", Path: \"{}\", Body: \"{}\"",
            self.human_label,
            self.human_description,
            self.method,
            self.path,
            String::from_utf8_lossy(&self.body)
        )
    }
}
