//! Blocking HTTP execution client
//!
//! One `HttpClient` models one benchmark worker. It holds at most one idle
//! connection and lets one request be in flight at a time, so a second
//! `execute` on the same instance waits for the first to finish instead of
//! opening another socket. Run several workers by building several clients.

use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};

use super::diagnostics::{write_diagnostics, RequestOptions};
use super::error::{ClientError, ClientResult, ExecuteError};
use crate::query::Query;

/// Health-check route used by [`HttpClient::ping`]
pub const PING_PATH: &str = "/ping";

const IDLE_CONNECTION_TIMEOUT: Duration = Duration::from_secs(3600);

/// Timed HTTP client for executing generated queries
pub struct HttpClient {
    client: Client,
    host: String,
    debug: u8,
    write_timeout: Duration,
    in_flight: Mutex<()>,
    diagnostics: Mutex<Box<dyn Write + Send>>,
}

impl HttpClient {
    /// Create a client for `host` (scheme and authority, e.g. `http://localhost:8086`).
    ///
    /// A zero timeout disables that timeout. reqwest has no separate write
    /// timeout; writes are bounded by the read timeout, which covers the
    /// whole request.
    pub fn new(
        host: impl Into<String>,
        debug: u8,
        dial_timeout: Duration,
        read_timeout: Duration,
        write_timeout: Duration,
    ) -> ClientResult<Self> {
        let mut builder = Client::builder()
            .pool_max_idle_per_host(1)
            .pool_idle_timeout(IDLE_CONNECTION_TIMEOUT);

        if !dial_timeout.is_zero() {
            builder = builder.connect_timeout(dial_timeout);
        }
        builder = if read_timeout.is_zero() {
            builder.timeout(None)
        } else {
            builder.timeout(read_timeout)
        };

        let client = builder.build().map_err(ClientError::Build)?;

        Ok(Self {
            client,
            host: host.into().trim_end_matches('/').to_string(),
            debug,
            write_timeout,
            in_flight: Mutex::new(()),
            diagnostics: Mutex::new(Box::new(std::io::stderr())),
        })
    }

    /// Send diagnostic output to `sink` instead of stderr
    pub fn with_diagnostic_sink(self, sink: impl Write + Send + 'static) -> Self {
        Self {
            diagnostics: Mutex::new(Box::new(sink)),
            ..self
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Debug level given at construction
    pub fn debug(&self) -> u8 {
        self.debug
    }

    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    /// Execute `q` and return its latency in milliseconds.
    ///
    /// The response body is always read in full before the clock stops. On
    /// failure the error still carries the latency measured so far.
    pub fn execute(&self, q: &Query, opts: Option<&RequestOptions>) -> Result<f64, ExecuteError> {
        let _in_flight = lock(&self.in_flight);

        let url = format!("{}{}", self.host, q.path);
        let method = Method::from_bytes(q.method.as_bytes())
            .map_err(|_| ExecuteError::new(0.0, ClientError::InvalidMethod(q.method.clone())))?;

        let mut request = self.client.request(method, &url);
        if !q.body.is_empty() {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(q.body.clone());
        }

        let start = Instant::now();
        let result = request.send().and_then(|response| {
            let status = response.status();
            response.bytes().map(|body| (status, body))
        });
        let lag_ms = start.elapsed().as_nanos() as f64 / 1e6;

        let (status, body) = match result {
            Ok(ok) => ok,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "query request failed");
                return Err(ExecuteError::new(lag_ms, ClientError::Transport(e)));
            }
        };

        if status != StatusCode::OK {
            tracing::debug!(url = %url, status = status.as_u16(), "query returned non-200 status");
            return Err(ExecuteError::new(
                lag_ms,
                ClientError::Status {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&body).into_owned(),
                },
            ));
        }

        if let Some(opts) = opts {
            let mut out = lock(&self.diagnostics);
            write_diagnostics(&mut **out, opts, q, lag_ms, &body)
                .map_err(|e| ExecuteError::new(lag_ms, ClientError::Diagnostics(e)))?;
        }

        Ok(lag_ms)
    }

    /// Fire a GET at the health-check route, ignoring the outcome.
    ///
    /// Used to warm up the connection before timed requests.
    pub fn ping(&self) {
        let _in_flight = lock(&self.in_flight);

        let url = format!("{}{}", self.host, PING_PATH);
        match self.client.get(&url).send() {
            Ok(response) => {
                let status = response.status();
                // Drain so the connection goes back to the pool
                let _ = response.bytes();
                tracing::debug!(url = %url, status = status.as_u16(), "ping");
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "ping failed");
            }
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("host", &self.host)
            .field("debug", &self.debug)
            .field("write_timeout", &self.write_timeout)
            .finish()
    }
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
