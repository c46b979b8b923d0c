use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use svg2shapes::batch::run_batch;
use svg2shapes::config::{BatchConfig, OnError};
use svg2shapes::logging::init_tracing;
use svg2shapes::output::{Backend, OutputMode};

/// Convert a directory of SVG exports into JSON shape records
#[derive(Parser, Debug)]
#[command(name = "svg2shapes")]
#[command(version)]
#[command(about = "Convert SVG exports into JSON shape, style and layer records", long_about = None)]
struct Args {
    /// Directory containing SVG documents [default: ./test/input]
    #[arg(value_name = "SOURCE")]
    source: Option<PathBuf>,

    /// Directory receiving JSON output [default: ./test/output]
    #[arg(value_name = "DEST")]
    destination: Option<PathBuf>,

    /// TOML configuration file; flags override its values
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Record shape to produce
    #[arg(short, long, value_enum)]
    mode: Option<OutputMode>,

    /// How layered documents are read
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Write a single file keyed by document name
    #[arg(short, long)]
    aggregate: bool,

    /// File name of the aggregated output
    #[arg(long, value_name = "FILE")]
    aggregate_file: Option<String>,

    /// What to do when one document fails
    #[arg(long, value_enum)]
    on_error: Option<OnError>,

    /// Indent JSON output
    #[arg(long)]
    pretty: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn into_config(self) -> Result<BatchConfig> {
        let mut config = match &self.config {
            Some(path) => BatchConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => BatchConfig::default(),
        };

        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(destination) = self.destination {
            config.destination = destination;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(file) = self.aggregate_file {
            config.aggregate_file = file;
        }
        if let Some(on_error) = self.on_error {
            config.on_error = on_error;
        }
        config.aggregate |= self.aggregate;
        config.pretty |= self.pretty;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = args.into_config()?;
    eprintln!(
        "src: {}\ndest: {}",
        config.source.display(),
        config.destination.display()
    );

    let report = run_batch(&config)?;

    eprintln!(
        "Converted {} document(s), skipped {}, wrote {} file(s)",
        report.converted.len(),
        report.skipped.len(),
        report.outputs.len()
    );
    for (path, reason) in &report.skipped {
        eprintln!("  skipped {}: {}", path.display(), reason);
    }

    Ok(())
}
