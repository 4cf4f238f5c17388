use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

mod aggregate;
mod config;
mod engine;
mod error;
mod models;
mod probe;
mod registry;
mod report;
mod sink;
mod utils;

use crate::config::MonitorConfig;
use crate::probe::NetProber;
use crate::report::{Renderer, Report};
use crate::sink::{ReportSink, XlsxSink};

/// Probe every configured host, website, camera and NVR once and write a
/// styled status workbook.
#[derive(Debug, Parser)]
#[command(name = "netsweep", version, about)]
struct Args {
    /// Target configuration (JSON).
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Report destination, overrides `output` from the config.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum probes in flight, overrides `max_concurrency`.
    #[arg(long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    utils::init_tracing();
    let args = Args::parse();
    let started = Instant::now();

    let mut config = MonitorConfig::load(&args.config)?;
    if let Some(output) = args.output {
        config.output = output;
    }
    if let Some(concurrency) = args.concurrency {
        config.max_concurrency = concurrency;
    }

    let registry = engine::prepare(&config)
        .with_context(|| format!("Invalid target configuration in {}", args.config.display()))?;

    let prober = Arc::new(NetProber::new());
    let records = engine::sweep_registry(&config, &registry, prober).await?;

    let report = Renderer::default().render(&records);
    XlsxSink.write(&report, &config.output)?;

    // Printed rather than logged so a quiet RUST_LOG still shows the outcome.
    println!("{}", summary(&config.output, &report, started.elapsed().as_secs_f64()));

    Ok(())
}

fn summary(destination: &Path, report: &Report, elapsed_secs: f64) -> String {
    let total = report.rows.len();
    let offline = report.offline_count();
    format!(
        "Report written to {}: {} targets, {} online, {} offline ({:.1}s)",
        destination.display(),
        total,
        total - offline,
        offline,
        elapsed_secs
    )
}
