//! Benchmark Driver
//!
//! Runs generated queries against the server with one blocking worker per
//! thread. Each worker owns its own [`HttpClient`]; the only shared state is
//! the generator (immutable) and the query pool.
//!
//! Query indices are striped across workers: worker `w` of `n` runs
//! `w, w + n, w + 2n, ...`.

use std::io::Write;
use std::thread;

use crate::client::{HttpClient, RequestOptions};
use crate::generator::QueryGenerator;
use crate::query::QueryPool;

/// How a run is driven
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSettings {
    /// Total number of queries across all workers
    pub queries: usize,
    /// Diagnostics passed to every `execute`
    pub options: Option<RequestOptions>,
    /// Ping the server from each worker before timing starts
    pub ping: bool,
}

/// Latency totals for a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Queries that completed with 200 OK
    pub succeeded: usize,
    /// Queries that failed (transport, status, or diagnostics)
    pub failed: usize,
    pub min_ms: f64,
    pub max_ms: f64,
    pub total_ms: f64,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self {
            succeeded: 0,
            failed: 0,
            min_ms: f64::INFINITY,
            max_ms: 0.0,
            total_ms: 0.0,
        }
    }
}

impl RunSummary {
    /// Record a successful query's latency
    pub fn record(&mut self, lag_ms: f64) {
        self.succeeded += 1;
        self.min_ms = self.min_ms.min(lag_ms);
        self.max_ms = self.max_ms.max(lag_ms);
        self.total_ms += lag_ms;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Combine totals from another worker
    pub fn merge(&mut self, other: &RunSummary) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.min_ms = self.min_ms.min(other.min_ms);
        self.max_ms = self.max_ms.max(other.max_ms);
        self.total_ms += other.total_ms;
    }

    /// Mean latency of successful queries
    pub fn mean_ms(&self) -> Option<f64> {
        if self.succeeded == 0 {
            None
        } else {
            Some(self.total_ms / self.succeeded as f64)
        }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.mean_ms() {
            Some(mean) => write!(
                f,
                "{} ok, {} failed, min={:.2}ms, mean={:.2}ms, max={:.2}ms",
                self.succeeded, self.failed, self.min_ms, mean, self.max_ms
            ),
            None => write!(f, "{} ok, {} failed", self.succeeded, self.failed),
        }
    }
}

/// Run `settings.queries` queries spread across `clients`, one thread each
pub fn run(
    generator: &dyn QueryGenerator,
    pool: &QueryPool,
    clients: &[HttpClient],
    settings: &RunSettings,
) -> RunSummary {
    let workers = clients.len();
    if workers == 0 {
        return RunSummary::default();
    }

    let summaries: Vec<RunSummary> = thread::scope(|scope| {
        let handles: Vec<_> = clients
            .iter()
            .enumerate()
            .map(|(worker, client)| {
                scope.spawn(move || {
                    run_worker(worker, workers, generator, pool, client, settings)
                })
            })
            .collect();

        handles
            .into_iter()
            .enumerate()
            .map(|(worker, handle)| {
                handle.join().unwrap_or_else(|_| {
                    // Which of its queries ran before the panic is unknown
                    let share = worker_share(worker, workers, settings.queries);
                    tracing::error!(worker, "worker panicked, counting {} queries as failed", share);
                    RunSummary {
                        failed: share,
                        ..Default::default()
                    }
                })
            })
            .collect()
    });

    let mut total = RunSummary::default();
    for summary in &summaries {
        total.merge(summary);
    }
    total
}

/// Number of query indices assigned to `worker`
fn worker_share(worker: usize, workers: usize, queries: usize) -> usize {
    (worker..queries).step_by(workers).len()
}

fn run_worker(
    worker: usize,
    workers: usize,
    generator: &dyn QueryGenerator,
    pool: &QueryPool,
    client: &HttpClient,
    settings: &RunSettings,
) -> RunSummary {
    if settings.ping {
        client.ping();
    }

    let mut summary = RunSummary::default();
    for index in (worker..settings.queries).step_by(workers) {
        let query = generator.dispatch(index, pool);
        match client.execute(&query, settings.options.as_ref()) {
            Ok(lag_ms) => summary.record(lag_ms),
            Err(e) => {
                tracing::warn!(worker, query_id = query.id, "{}", e);
                summary.record_failure();
            }
        }
        pool.release(query);
    }

    tracing::debug!(worker, "worker finished: {}", summary);
    summary
}

/// Write `count` generated queries to `out` without executing them
pub fn print_queries<W: Write + ?Sized>(
    generator: &dyn QueryGenerator,
    pool: &QueryPool,
    count: usize,
    out: &mut W,
) -> std::io::Result<()> {
    for index in 0..count {
        let query = generator.dispatch(index, pool);
        writeln!(out, "{}", query)?;
        pool.release(query);
    }
    out.flush()
}
