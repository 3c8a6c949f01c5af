//! # cyrconv CLI - Cyrillic and Unicode Text File Converter
//!
//! Reads a whole file, decodes it from the source encoding (given or
//! auto-detected) and writes it back out in the target encoding.

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use log::info;
#[cfg(feature = "cli")]
use serde::Serialize;

#[cfg(feature = "cli")]
use cyrconv::{Conversion, DetectionResult, Encoding, EncodingDetector, Translator};

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features disabled. Enable with --features cli");
    std::process::exit(1);
}

/// cyrconv: convert text files between UTF-8, UTF-16 and Cyrillic code pages
#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "cyrconv")]
#[command(version, about, long_about = None)]
#[command(after_help = ENCODINGS_HELP)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,
}

#[cfg(feature = "cli")]
const ENCODINGS_HELP: &str = "\
Encodings (index or name):
  0 - UTF-8 without BOM
  1 - UTF-8 with BOM
  2 - UTF-16 Little Endian
  3 - UTF-16 Big Endian
  4 - CP1251 (Windows Cyrillic)
  5 - CP866 (DOS Cyrillic)
  6 - KOI8-R (Unix Cyrillic)

Examples:
  cyrconv convert input.txt output.txt 1      # to UTF-8 with BOM, detect input
  cyrconv convert input.txt output.txt 2 4    # from CP1251 to UTF-16LE";

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Convert a file between character encodings
    Convert(ConvertArgs),

    /// Detect the encoding of a file
    Detect(DetectArgs),

    /// List all supported encodings
    List,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ConvertArgs {
    /// Input file
    input: PathBuf,

    /// Output file
    output: PathBuf,

    /// Target encoding
    to: Encoding,

    /// Source encoding (auto-detected if not specified)
    from: Option<Encoding>,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct DetectArgs {
    /// Input file
    input: PathBuf,
}

#[cfg(feature = "cli")]
#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct ConversionResult<'a> {
    input: &'a Path,
    output: &'a Path,
    #[serde(flatten)]
    conversion: &'a Conversion,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct DetectionReport<'a> {
    input: &'a Path,
    size: usize,
    #[serde(flatten)]
    detection: DetectionResult,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct EncodingInfo {
    index: u8,
    name: &'static str,
    description: &'static str,
    single_byte: bool,
    bom: Option<String>,
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    // bare invocation is a request for usage, not an error
    if std::env::args_os().len() <= 1 {
        Cli::command().print_help()?;
        return Ok(());
    }

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert(ref args) => convert_command(args, &cli)?,
        Commands::Detect(ref args) => detect_command(args, &cli)?,
        Commands::List => list_command(&cli)?,
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

#[cfg(feature = "cli")]
fn read_input(path: &Path) -> Result<Vec<u8>> {
    info!("reading input file: {}", path.display());
    let data = fs::read(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    if data.is_empty() {
        anyhow::bail!("Input file is empty: {}", path.display());
    }
    info!("file size: {} bytes", data.len());
    Ok(data)
}

#[cfg(feature = "cli")]
fn convert_command(args: &ConvertArgs, cli: &Cli) -> Result<()> {
    let input_data = read_input(&args.input)?;

    match args.from {
        Some(from) => info!("input encoding specified: {}", from.name()),
        None => info!("auto-detecting input encoding"),
    }

    let translator = Translator::new(args.from, args.to);
    let conversion = translator.convert_with_report(&input_data).with_context(|| {
        format!(
            "Failed to convert {} to {}",
            args.input.display(),
            args.to.name()
        )
    })?;

    info!("writing output file: {}", args.output.display());
    fs::write(&args.output, &conversion.output)
        .with_context(|| format!("Failed to write output file: {}", args.output.display()))?;

    match cli.format {
        OutputFormat::Json => {
            let result = ConversionResult {
                input: &args.input,
                output: &args.output,
                conversion: &conversion,
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Text => {
            println!(
                "{} ({}{}, {} bytes) -> {} ({}, {} bytes)",
                args.input.display(),
                conversion.source.name(),
                if conversion.detected { ", detected" } else { "" },
                conversion.bytes_read,
                args.output.display(),
                conversion.target.name(),
                conversion.bytes_written
            );
            if cli.verbose {
                println!(
                    "{} code points, {} substituted",
                    conversion.code_points, conversion.substitutions
                );
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn detect_command(args: &DetectArgs, cli: &Cli) -> Result<()> {
    let data = read_input(&args.input)?;
    let detection = EncodingDetector::new().detect(&data);

    match cli.format {
        OutputFormat::Json => {
            let report = DetectionReport {
                input: &args.input,
                size: data.len(),
                detection,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!(
                "Detected encoding: {} ({})",
                detection.encoding.name(),
                detection.encoding.index()
            );
            println!(
                "BOM detected: {}",
                if detection.bom_detected { "Yes" } else { "No" }
            );
            println!("Method: {:?}", detection.method);
            println!("Size: {} bytes", data.len());
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn list_command(cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Json => {
            let encodings: Vec<_> = Encoding::ALL
                .iter()
                .map(|encoding| EncodingInfo {
                    index: encoding.index(),
                    name: encoding.name(),
                    description: encoding.description(),
                    single_byte: encoding.is_single_byte(),
                    bom: encoding.bom().map(|b| format!("{:02X?}", b)),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&encodings)?);
        }
        OutputFormat::Text => {
            println!("Supported Encodings ({} total):", Encoding::ALL.len());
            println!();
            for encoding in Encoding::ALL {
                println!(
                    "  {} - {:13} {}",
                    encoding.index(),
                    encoding.name(),
                    encoding.description()
                );
            }
        }
    }

    Ok(())
}
