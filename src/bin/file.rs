use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use svg2shapes::logging::init_tracing;
use svg2shapes::markup::{ClassLookup, ParseOptions};
use svg2shapes::output::{Backend, OutputMode, convert, to_json};

/// Standalone single-document converter
#[derive(Parser, Debug)]
#[command(name = "svg2shapes-file")]
#[command(version)]
#[command(about = "Convert one SVG export into a JSON shape record", long_about = None)]
struct Args {
    /// Input .svg file (use "-" for stdin)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file path (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Document name written into the record [default: input file stem]
    #[arg(short, long)]
    name: Option<String>,

    /// Record shape to produce
    #[arg(short, long, value_enum, default_value_t = OutputMode::Layers)]
    mode: OutputMode,

    /// How layered documents are read
    #[arg(long, value_enum, default_value_t = Backend::Scan)]
    backend: Backend,

    /// Only a real class attribute assigns a class
    #[arg(long)]
    class_attribute: bool,

    /// Layers dropped from the output
    #[arg(long = "exclude", value_name = "LAYER", default_values_t = ["temp".to_string()])]
    excluded_layers: Vec<String>,

    /// Indent JSON output
    #[arg(long)]
    pretty: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let from_stdin = args.input.to_str() == Some("-");
    let source = if from_stdin {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(&args.input)
            .with_context(|| format!("Failed to read input file {}", args.input.display()))?
    };

    let name = match args.name {
        Some(name) => Some(name),
        None if from_stdin => None,
        None => args
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned()),
    };

    let options = ParseOptions {
        class_lookup: if args.class_attribute {
            ClassLookup::Attribute
        } else {
            ClassLookup::Substring
        },
        excluded_layers: args.excluded_layers,
    };

    let document = convert(&source, args.mode, args.backend, &options)
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;
    let json = to_json(&document, name.as_deref(), args.pretty)?;

    match args.output {
        Some(path) => {
            if path.is_dir() {
                bail!("Output path is a directory: {}", path.display());
            }
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("JSON saved to: {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
