//! metaquery-bench
//!
//! Generates InfluxDB metaqueries (tag values, field keys, series cardinality)
//! in InfluxQL or Flux and times their execution over HTTP.
//!
//! # Configuration
//!
//! Settings come from a TOML file (`--config`, or the default locations), then
//! `METAQUERY_*` environment variables, then command-line flags.
//! `RUST_LOG` overrides the configured log level.

use anyhow::Context;
use clap::{Parser, Subcommand};
use metaquery_bench::client::{HttpClient, RequestOptions};
use metaquery_bench::config::{generate_default_config, Config, LoggingConfig, QueryType};
use metaquery_bench::generator::{InfluxMetaquery, KindDispatcher, QueryGenerator};
use metaquery_bench::query::{Language, QueryPool};
use metaquery_bench::runner::{self, RunSettings};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "metaquery-bench")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate and time InfluxDB metaqueries over HTTP")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: search standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server base URL, e.g. http://localhost:8086
    #[arg(long)]
    host: Option<String>,

    /// Database (InfluxQL) or bucket (Flux) name
    #[arg(long)]
    db: Option<String>,

    /// Query language (influxql, flux)
    #[arg(short, long, value_parser = parse_language)]
    language: Option<Language>,

    /// Query type (tag-values, field-keys, cardinality, dispatch)
    #[arg(short = 't', long, value_parser = parse_query_type)]
    query_type: Option<QueryType>,

    /// Number of queries to run
    #[arg(short = 'n', long)]
    queries: Option<usize>,

    /// Parallel workers, each with its own connection
    #[arg(short, long)]
    workers: Option<usize>,

    /// Start of the full query range (RFC-3339)
    #[arg(long)]
    start: Option<String>,

    /// End of the full query range (RFC-3339)
    #[arg(long)]
    end: Option<String>,

    /// Diagnostic tier (1-4)
    #[arg(short, long)]
    debug: Option<u8>,

    /// Pretty-print response bodies
    #[arg(long)]
    pretty_print: bool,

    /// Print generated queries instead of running them
    #[arg(long)]
    print_queries: bool,

    /// Skip the warm-up ping
    #[arg(long)]
    no_ping: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_language(s: &str) -> Result<Language, String> {
    Language::from_str(s).ok_or_else(|| format!("unknown language {:?} (influxql, flux)", s))
}

fn parse_query_type(s: &str) -> Result<QueryType, String> {
    QueryType::from_str(s).ok_or_else(|| {
        format!(
            "unknown query type {:?} (tag-values, field-keys, cardinality, dispatch)",
            s
        )
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Config { output }) = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => std::fs::write(path, content)
                .with_context(|| format!("writing config to {:?}", path))?,
            None => print!("{}", content),
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    apply_cli_overrides(&mut config, &cli);
    init_logging(&config.logging)?;

    tracing::info!("metaquery-bench v{}", env!("CARGO_PKG_VERSION"));

    let bench = &config.benchmark;
    bench.check_runnable(cli.print_queries)?;
    let interval = bench.interval()?;
    let metaquery = InfluxMetaquery::new(
        bench.language,
        &config.database_config(),
        interval,
        bench.scale_var,
    )
    .context("cannot build query generator")?;

    tracing::info!(
        "Generating {} {} queries ({}) against {} over {}",
        bench.queries,
        bench.query_type,
        bench.language,
        metaquery.database_name(),
        interval
    );

    let generator: Box<dyn QueryGenerator> = match bench.query_type {
        QueryType::Metaquery(kind) => Box::new(KindDispatcher::new(metaquery, kind)),
        QueryType::Dispatch => Box::new(metaquery),
    };

    let workers = bench.workers.max(1);
    let pool = QueryPool::new(workers * 2);

    if cli.print_queries {
        let stdout = std::io::stdout();
        runner::print_queries(generator.as_ref(), &pool, bench.queries, &mut stdout.lock())?;
        return Ok(());
    }

    let target = &config.target;
    let clients = (0..workers)
        .map(|_| {
            HttpClient::new(
                target.host.clone(),
                bench.debug,
                target.dial_timeout(),
                target.read_timeout(),
                target.write_timeout(),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let options = (bench.debug > 0 || bench.pretty_print)
        .then(|| RequestOptions::new(bench.debug, bench.pretty_print));
    let settings = RunSettings {
        queries: bench.queries,
        options,
        ping: !cli.no_ping,
    };

    let started = Instant::now();
    let summary = runner::run(generator.as_ref(), &pool, &clients, &settings);
    let elapsed = started.elapsed();

    println!(
        "Ran {} queries with {} workers in {:.2}s: {}",
        bench.queries,
        workers,
        elapsed.as_secs_f64(),
        summary
    );

    if summary.failed > 0 {
        tracing::warn!("{} queries failed", summary.failed);
    }

    Ok(())
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(host) = &cli.host {
        config.target.host = host.clone();
    }
    if let Some(db) = &cli.db {
        config.database.name = Some(db.clone());
    }

    let bench = &mut config.benchmark;
    if let Some(language) = cli.language {
        bench.language = language;
    }
    if let Some(query_type) = cli.query_type {
        bench.query_type = query_type;
    }
    if let Some(queries) = cli.queries {
        bench.queries = queries;
    }
    if let Some(workers) = cli.workers {
        bench.workers = workers;
    }
    if let Some(start) = &cli.start {
        bench.start = start.clone();
    }
    if let Some(end) = &cli.end {
        bench.end = end.clone();
    }
    if let Some(debug) = cli.debug {
        bench.debug = debug;
    }
    if cli.pretty_print {
        bench.pretty_print = true;
    }
}

fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("metaquery_bench={}", config.level)));

    let writer = match &config.file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("opening log file {:?}", path))?;
            BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    if config.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(writer))
            .init();
    }

    Ok(())
}
