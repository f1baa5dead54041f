#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use clap::Parser;
use geosniff::config::{self, load_configuration};
use geosniff::{Sample, sniff, sniff_concurrently};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::{Level, event};

/// Guesses the layout of a tabular text file and which of its columns hold
/// geographic locations. The result is printed as JSON.
#[derive(Parser)]
#[command(name = "geosniff", version)]
struct Cli {
    /// Delimited or fixed-width text file.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Lines skipped at the top of the file.
    #[arg(long = "skip-lines", value_name = "N")]
    skip_lines: Option<usize>,

    /// Lines read after the skipped ones.
    #[arg(long = "sample-lines", value_name = "N")]
    sample_lines: Option<usize>,

    /// Run the location match-makers concurrently.
    #[arg(long)]
    concurrent: bool,

    /// Indent the JSON output.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    // Logs go to stderr, stdout is reserved for the detection
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    load_configuration().context("Failed to load configuration")?;
    let config = config::get().context("Failed to get configuration")?;
    let options = config.options().context("Invalid configuration")?;

    let skip_lines = cli.skip_lines.unwrap_or(config.skip_lines);
    let sample_lines = cli.sample_lines.unwrap_or(config.sample_lines);

    let file = File::open(&cli.file)
        .with_context(|| format!("Failed to open {}", cli.file.display()))?;
    let sample = Sample::from_reader(BufReader::new(file), sample_lines, skip_lines)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;
    event!(
        Level::INFO,
        "Sampled {} lines from {}",
        sample.len(),
        cli.file.display()
    );

    let detection = if cli.concurrent || config.concurrent {
        sniff_concurrently(&sample, &options)
            .await
            .context("Failed to detect locations")?
    } else {
        sniff(&sample, &options)
    };

    let output = if cli.pretty {
        serde_json::to_string_pretty(&detection)
    } else {
        serde_json::to_string(&detection)
    }
    .context("Failed to serialize the detection")?;
    println!("{}", output);

    Ok(())
}
