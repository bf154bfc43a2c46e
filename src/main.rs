//! # utf-transcode CLI - Unicode Transfer-Encoding Converter
//!
//! Command-line front end for the streaming UTF-8/16/32 converter.

#[cfg(feature = "cli")]
use std::fs::{self, File};
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use serde::Serialize;
#[cfg(feature = "cli")]
use tracing::{debug, info};
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
use utf_transcode::{
    ConversionStats, Converter, Encoding, Error as TranscodeError, ErrorMode, Options,
};

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features disabled. Enable with --features cli");
    std::process::exit(1);
}

/// utf-transcode: streaming converter between UTF-8, UTF-16 and UTF-32
#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "utf-transcode")]
#[command(version, about, long_about = None)]
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
#[derive(Subcommand)]
enum Commands {
    /// Convert a stream between Unicode encodings
    Convert(ConvertArgs),

    /// Check that a stream is well-formed in the given encoding
    Validate(ValidateArgs),

    /// List all supported encodings
    List,

    /// Display detailed information about an encoding
    Info(InfoArgs),
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ConvertArgs {
    /// Source encoding
    #[arg(short = 'f', long = "from")]
    from: Option<Encoding>,

    /// Target encoding
    #[arg(short = 't', long = "to")]
    to: Option<Encoding>,

    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Handling of malformed input: latin1, ignore, raise, replace [default: latin1]
    #[arg(short, long = "errors")]
    errors: Option<ErrorMode>,

    /// Bytes read from the input per refill [default: 4096]
    #[arg(long)]
    chunk_size: Option<usize>,

    /// JSON file with conversion options; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ValidateArgs {
    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Expected encoding
    #[arg(short, long)]
    encoding: Encoding,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct InfoArgs {
    /// Encoding to describe
    encoding: Encoding,
}

#[cfg(feature = "cli")]
#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct ConversionResult {
    success: bool,
    from: &'static str,
    to: &'static str,
    error_mode: &'static str,
    #[serde(flatten)]
    stats: ConversionStats,
    processing_time_ms: u64,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    encoding: &'static str,
    bytes_checked: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_position: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_byte: Option<u8>,
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert(ref args) => convert_command(args, &cli)?,
        Commands::Validate(ref args) => validate_command(args, &cli)?,
        Commands::List => list_command(&cli)?,
        Commands::Info(ref args) => info_command(args, &cli)?,
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[cfg(feature = "cli")]
fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    match path {
        Some(path) => {
            debug!("Reading from: {}", path.display());
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file: {}", path.display()))?;
            Ok(Box::new(file))
        }
        None => {
            debug!("Reading from stdin");
            Ok(Box::new(io::stdin().lock()))
        }
    }
}

#[cfg(feature = "cli")]
fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            debug!("Writing to: {}", path.display());
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

#[cfg(feature = "cli")]
fn load_config(path: &Path) -> Result<Options> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Merge the optional config file with command-line flags.
#[cfg(feature = "cli")]
fn resolve_options(args: &ConvertArgs) -> Result<Options> {
    let from_file = args.config.as_deref().map(load_config).transpose()?;

    let source = args
        .from
        .or(from_file.as_ref().map(|o| o.source_encoding))
        .context("Source encoding required (--from or config file)")?;
    let target = args
        .to
        .or(from_file.as_ref().map(|o| o.target_encoding))
        .context("Target encoding required (--to or config file)")?;

    let mut options = from_file.unwrap_or_else(|| Options::new(source, target));
    options.source_encoding = source;
    options.target_encoding = target;
    if let Some(mode) = args.errors {
        options.error_mode = mode;
    }
    if let Some(chunk_size) = args.chunk_size {
        options.chunk_size = chunk_size;
    }
    Ok(options)
}

#[cfg(feature = "cli")]
fn convert_command(args: &ConvertArgs, cli: &Cli) -> Result<()> {
    let start_time = std::time::Instant::now();

    let options = resolve_options(args)?;
    info!(
        "Converting from {} to {} (errors: {})",
        options.source_encoding, options.target_encoding, options.error_mode
    );

    let converter = Converter::from_options(&options).context("Invalid conversion options")?;
    let input = open_input(args.input.as_deref())?;
    let output = open_output(args.output.as_deref())?;

    let stats = converter.convert(input, output).with_context(|| {
        format!(
            "Conversion from {} to {} failed",
            options.source_encoding, options.target_encoding
        )
    })?;

    let processing_time = start_time.elapsed();
    debug!(
        "Processed {} bytes -> {} bytes in {:?}",
        stats.bytes_read, stats.bytes_written, processing_time
    );

    match cli.format {
        OutputFormat::Json => {
            let result = ConversionResult {
                success: true,
                from: options.source_encoding.name(),
                to: options.target_encoding.name(),
                error_mode: options.error_mode.name(),
                stats,
                processing_time_ms: processing_time.as_millis() as u64,
            };
            eprintln!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Text => {
            if stats.recovered_errors > 0 {
                eprintln!(
                    "Recovered {} malformed byte(s) using '{}'",
                    stats.recovered_errors, options.error_mode
                );
            }
            if cli.verbose || args.output.is_some() {
                eprintln!("✓ Conversion completed successfully");
            }
        }
    }

    Ok(())
}

/// Decode `input` in raise mode, stopping at the first malformed byte.
#[cfg(feature = "cli")]
fn check_input<R: Read>(encoding: Encoding, input: R) -> Result<ValidationResult> {
    // UTF-32LE output keeps every decoded value representable
    let converter = Converter::new(encoding, Encoding::UTF32LE).with_mode(ErrorMode::Raise);

    match converter.convert(input, io::sink()) {
        Ok(stats) => Ok(ValidationResult {
            valid: true,
            encoding: encoding.name(),
            bytes_checked: stats.bytes_read,
            error_position: None,
            error_byte: None,
        }),
        Err(TranscodeError::Decode { byte, position, .. }) => Ok(ValidationResult {
            valid: false,
            encoding: encoding.name(),
            bytes_checked: position + 1,
            error_position: Some(position),
            error_byte: Some(byte),
        }),
        Err(e) => Err(e).context("Validation failed"),
    }
}

#[cfg(feature = "cli")]
fn validate_command(args: &ValidateArgs, cli: &Cli) -> Result<()> {
    let input = open_input(args.input.as_deref())?;
    let result = check_input(args.encoding, input)?;

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => {
            if result.valid {
                println!("✓ Input is valid {}", args.encoding.name());
            } else {
                println!("✗ Input is not valid {}", args.encoding.name());
                if let (Some(position), Some(byte)) = (result.error_position, result.error_byte) {
                    println!(
                        "  Error at position {}: malformed byte 0x{:02X}",
                        position, byte
                    );
                }
            }
        }
    }

    if !result.valid {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn list_command(cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Json => {
            let encodings: Vec<_> = Encoding::ALL
                .iter()
                .map(|encoding| {
                    serde_json::json!({
                        "name": encoding.name(),
                        "unit_width": encoding.unit_width(),
                        "endianness": encoding.endianness(),
                        "description": encoding.description(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&encodings)?);
        }
        OutputFormat::Text => {
            println!("Supported Encodings ({} total):", Encoding::ALL.len());
            println!();
            for encoding in Encoding::ALL {
                println!("{:10} {}", encoding.name(), encoding.description());
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn info_command(args: &InfoArgs, cli: &Cli) -> Result<()> {
    let encoding = args.encoding;

    match cli.format {
        OutputFormat::Json => {
            let info = serde_json::json!({
                "name": encoding.name(),
                "unit_width": encoding.unit_width(),
                "endianness": encoding.endianness(),
                "description": encoding.description(),
                "error_modes": ErrorMode::ALL.iter().map(|m| m.name()).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        OutputFormat::Text => {
            println!("Encoding Information: {}", encoding.name());
            println!("Description: {}", encoding.description());
            println!("Code unit: {} byte(s)", encoding.unit_width());
            match encoding.endianness() {
                Some(endianness) => println!("Byte order: {:?}", endianness),
                None => println!("Byte order: n/a"),
            }
            println!("\nSample encodings:");
            print_samples(encoding)?;
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_samples(encoding: Encoding) -> Result<()> {
    for (code_point, label) in [(0x41, "A"), (0xE9, "é"), (0x20AC, "€"), (0x1F600, "😀")] {
        let mut bytes = Vec::new();
        Converter::new(Encoding::UTF32LE, encoding)
            .convert(&u32::to_le_bytes(code_point)[..], &mut bytes)
            .with_context(|| format!("Failed to encode U+{:04X}", code_point))?;
        println!("  U+{:04X} {} -> {:02X?}", code_point, label, bytes);
    }
    Ok(())
}
