//! deckport-cv - Collection Converter CLI
//!
//! Thin shell around the converter library: reads the input file, drives
//! one conversion session, renders progress events, and writes the
//! destination CSV.

use anyhow::{Context, Result};
use clap::Parser;
use deckport_common::config::TomlConfig;
use deckport_common::events::{ConvertEvent, EventBus};
use deckport_cv::config::Params;
use deckport_cv::services::ScryfallClient;
use deckport_cv::workflow::{load_set_catalog, Converter};
use deckport_cv::output;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "deckport-cv", version, about = "Convert card collection exports")]
struct Cli {
    /// Input collection export (CSV)
    input: PathBuf,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Source dialect id ("auto" to detect)
    #[arg(short, long, default_value = "auto")]
    format: String,

    /// Config file path (defaults to the platform config dir)
    #[arg(long, env = "DECKPORT_CONFIG")]
    config: Option<PathBuf>,

    /// List known dialect ids and exit
    #[arg(long)]
    list_formats: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting deckport-cv (Collection Converter)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let toml_config = match &cli.config {
        Some(path) => TomlConfig::load(path)?,
        None => TomlConfig::load_default()?,
    };
    let params = Params::resolve(&toml_config);

    if cli.list_formats {
        for dialect in deckport_cv::formats::FormatRegistry::new().iter() {
            println!("{:<16} {}", dialect.id, dialect.display_name);
        }
        return Ok(());
    }

    let client = Arc::new(ScryfallClient::new(
        params.card_api_base.clone(),
        &params.user_agent,
        params.request_timeout,
        params.rate_limit_ms,
    )?);

    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    info!("Loading canonical set list");
    let catalog = Arc::new(load_set_catalog(client.as_ref()).await?);
    info!("Set catalog ready ({} sets)", catalog.len());

    let event_bus = EventBus::new(256);
    let mut events = event_bus.subscribe();
    let progress_task = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ConvertEvent::PhaseChanged { new_phase, .. } => {
                    eprintln!("  [{}]", new_phase.as_str());
                }
                ConvertEvent::ConversionProgress {
                    percent,
                    processed,
                    total,
                    ..
                } => {
                    eprintln!("  {:>3}% ({}/{})", percent, processed, total);
                }
                ConvertEvent::ConversionCompleted { .. } => break,
                ConvertEvent::ConversionFailed { .. } => break,
                _ => {}
            }
        }
    });

    // Ctrl-C aborts the conversion cleanly at the next request boundary
    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; cancelling conversion");
            cancel_on_signal.cancel();
        }
    });

    let converter = Converter::new(catalog, client, params, event_bus);
    let dialect = match cli.format.as_str() {
        "auto" => None,
        other => Some(other),
    };

    let report = converter.convert(&bytes, dialect, &cancel).await?;
    progress_task.abort();

    let rendered = output::render_csv(&report.outcomes);
    match &cli.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => print!("{}", rendered),
    }

    info!(
        "Done: {} ok, {} with warnings, {} failed (dialect: {})",
        report.summary.succeeded,
        report.summary.warned,
        report.summary.failed,
        report.dialect_id
    );

    if report.summary.failed > 0 {
        std::process::exit(2);
    }
    Ok(())
}
