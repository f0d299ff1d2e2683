use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vision_timing::client::VisionClient;
use vision_timing::config::{self, CliOverrides, FileConfig};
use vision_timing::report;
use vision_timing::runner;
use vision_timing::types::OutputFormat;

#[derive(Parser)]
#[command(
    name = "vision-timing",
    version,
    about = "Time requests against a vision endpoint and print a CSV report"
)]
struct Cli {
    /// Image paths (default: the four assets/vision-samples/ images)
    images: Vec<PathBuf>,

    /// Vision endpoint URL [default: http://127.0.0.1:11435/api/vision]
    #[arg(long)]
    url: Option<String>,

    /// Vision mode sent to the server [default: full]
    #[arg(long)]
    mode: Option<String>,

    /// Server-side timeout_ms to send [default: 600000]
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Client socket timeout in seconds [default: 900]
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    socket_timeout_s: Option<u64>,

    #[arg(long, default_value = "csv")]
    format: OutputFormat,

    /// Config file (default: <config dir>/vision-timing/config.toml, if present)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing() {
    // stdout carries the report, so diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vision_timing=warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let file_config = FileConfig::load(cli.config.as_deref())?;
    let settings = config::resolve(
        CliOverrides {
            url: cli.url,
            mode: cli.mode,
            timeout_ms: cli.timeout_ms,
            socket_timeout_s: cli.socket_timeout_s,
            images: cli.images,
        },
        file_config,
    )?;

    let client = VisionClient::new(settings.url.clone(), settings.socket_timeout);
    let rows = runner::run(
        &client,
        &settings.images,
        &settings.mode,
        settings.timeout_ms,
    )?;

    let output = match cli.format {
        OutputFormat::Csv => report::format_csv(&rows),
        OutputFormat::Json => format!("{}\n", report::format_json(&rows)),
        OutputFormat::Table => report::format_table(&rows),
    };

    print!("{}", output);

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        process::exit(1);
    }
}
