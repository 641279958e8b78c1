//! # Recode CLI - Streaming Character Encoding Converter
//!
//! Command-line driver for the conversion library: convert files or
//! streams between encodings through the UTF-8 pivot, detect the encoding
//! of unknown input, and list the built-in handlers.

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use serde::Serialize;

#[cfg(feature = "cli")]
use recode::{
    bom_length, detect_encoding, handler::builtin_names, ByteBuffer, CharEncoding, Direction,
    EncodingRegistry, StreamDecoder, StreamEncoder,
};

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features disabled. Enable with --features cli");
    std::process::exit(1);
}

/// Recode: streaming character encoding converter
#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "recode")]
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
    /// Convert between character encodings
    Convert(ConvertArgs),

    /// Detect the encoding of input data
    Detect(DetectArgs),

    /// List built-in encodings
    List,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct ConvertArgs {
    /// Source encoding name (detected from the input when omitted)
    #[arg(short = 'f', long = "from")]
    from: Option<String>,

    /// Target encoding name
    #[arg(short = 't', long = "to", default_value = "UTF-8")]
    to: String,

    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Strip a leading byte-order mark from the input
    #[arg(long)]
    strip_bom: bool,

    /// Add a byte-order mark to the output where the target has one
    #[arg(long)]
    add_bom: bool,

    /// Feed the decoder in chunks of this many bytes (0 = all at once)
    #[arg(long, default_value = "0")]
    chunk_size: usize,

    /// Alias definitions, NAME=ALIAS, applied before lookup
    #[arg(long = "alias")]
    aliases: Vec<String>,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct DetectArgs {
    /// Input file (stdin if not specified)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Maximum bytes to read for detection
    #[arg(long, default_value = "8192")]
    sample_size: usize,
}

#[cfg(feature = "cli")]
#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct ConversionReport {
    success: bool,
    from: String,
    to: String,
    bytes_read: usize,
    bytes_written: usize,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct DetectionReport {
    detected: CharEncoding,
    name: Option<&'static str>,
    bom_bytes: usize,
    sample_size: usize,
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(ref args) => convert_command(args, &cli)?,
        Commands::Detect(ref args) => detect_command(args, &cli)?,
        Commands::List => list_command(&cli)?,
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn read_input(path: Option<&PathBuf>) -> Result<Vec<u8>> {
    if let Some(path) = path {
        fs::read(path).with_context(|| format!("Failed to read input file: {}", path.display()))
    } else {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    }
}

#[cfg(feature = "cli")]
fn build_registry(aliases: &[String]) -> Result<EncodingRegistry> {
    let mut registry = EncodingRegistry::new();
    for definition in aliases {
        let (name, alias) = definition
            .split_once('=')
            .with_context(|| format!("Invalid alias definition (want NAME=ALIAS): {definition}"))?;
        registry.add_alias(name, alias);
    }
    Ok(registry)
}

#[cfg(feature = "cli")]
fn convert_command(args: &ConvertArgs, cli: &Cli) -> Result<()> {
    let registry = build_registry(&args.aliases)?;
    let raw = read_input(args.input.as_ref())?;
    let bytes_read = raw.len();

    // The declared name wins; otherwise sniff the kind from the prefix.
    let (from, detected) = match &args.from {
        Some(name) => (name.clone(), None),
        None => {
            let kind = detect_encoding(&raw);
            let name = kind.canonical_name().unwrap_or("UTF-8").to_string();
            if cli.verbose {
                eprintln!("Detected source encoding: {name}");
            }
            (name, Some(kind))
        }
    };

    if cli.verbose {
        eprintln!("Converting from {} to {}", from, args.to);
    }

    // Decode to the UTF-8 pivot.
    let mut raw = ByteBuffer::from(raw);
    if args.strip_bom {
        let kind = detected.unwrap_or_else(|| registry.parse_encoding_name(&from));
        let skip = bom_length(kind, raw.data());
        if skip > 0 {
            raw.consume(skip);
            if cli.verbose {
                eprintln!("Stripped byte-order mark ({skip} bytes)");
            }
        }
    }

    let decode_handler = match detected {
        // Detected: the kind keeps the exact byte order.
        Some(kind) => registry
            .lookup_kind(kind, Direction::Decode)
            .with_context(|| format!("No decoder for detected {from}"))?,
        None => registry
            .open_handler(&from, Direction::Decode)
            .with_context(|| format!("No decoder for {from}"))?,
    };

    let mut pivot = ByteBuffer::new();
    match decode_handler {
        Some(handler) => {
            let mut decoder = StreamDecoder::new(handler);
            if args.chunk_size == 0 {
                decoder
                    .decode(&mut pivot, &mut raw)
                    .with_context(|| format!("Decoding from {from} failed"))?;
            } else {
                let mut pending = ByteBuffer::new();
                while !raw.is_empty() {
                    let take = args.chunk_size.min(raw.len());
                    pending.push_bytes(&raw.data()[..take]);
                    raw.consume(take);
                    decoder
                        .decode(&mut pivot, &mut pending)
                        .with_context(|| format!("Decoding from {from} failed"))?;
                }
                raw = pending;
            }
            if !raw.is_empty() {
                anyhow::bail!(
                    "Input ends inside a multi-byte sequence ({} bytes left)",
                    raw.len()
                );
            }
        }
        None => {
            // Already UTF-8.
            pivot.push_bytes(raw.data());
        }
    }

    // Encode out of the pivot.
    let mut out = ByteBuffer::new();
    match registry
        .open_handler(&args.to, Direction::Encode)
        .with_context(|| format!("No encoder for {}", args.to))?
    {
        Some(handler) => {
            let mut encoder = StreamEncoder::new(handler);
            encoder.prime(&mut out)?;
            if args.add_bom && out.is_empty() {
                // Decorated UTF-16 orders do not emit their own mark.
                if encoder.encoding_name().eq_ignore_ascii_case("UTF-16LE") {
                    out.push_bytes(&[0xFF, 0xFE]);
                } else if encoder.encoding_name().eq_ignore_ascii_case("UTF-16BE") {
                    out.push_bytes(&[0xFE, 0xFF]);
                }
            }
            encoder
                .encode(&mut out, &mut pivot)
                .with_context(|| format!("Encoding to {} failed", args.to))?;
        }
        None => {
            if args.add_bom {
                out.push_bytes(&[0xEF, 0xBB, 0xBF]);
            }
            out.push_bytes(pivot.data());
        }
    }

    let bytes_written = out.len();
    if let Some(ref path) = args.output {
        fs::write(path, out.data())
            .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    } else {
        io::stdout()
            .write_all(out.data())
            .context("Failed to write to stdout")?;
    }

    match cli.format {
        OutputFormat::Json => {
            let report = ConversionReport {
                success: true,
                from,
                to: args.to.clone(),
                bytes_read,
                bytes_written,
            };
            eprintln!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            if cli.verbose {
                eprintln!("Processed {bytes_read} bytes -> {bytes_written} bytes");
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn detect_command(args: &DetectArgs, cli: &Cli) -> Result<()> {
    let sample = if let Some(ref path) = args.input {
        let mut file = fs::File::open(path)
            .with_context(|| format!("Failed to open input file: {}", path.display()))?;
        let mut buffer = vec![0u8; args.sample_size];
        let n = file.read(&mut buffer)?;
        buffer.truncate(n);
        buffer
    } else {
        let mut buffer = vec![0u8; args.sample_size];
        let n = io::stdin().read(&mut buffer)?;
        buffer.truncate(n);
        buffer
    };

    let detected = detect_encoding(&sample);
    let bom = bom_length(detected, &sample);

    match cli.format {
        OutputFormat::Json => {
            let report = DetectionReport {
                detected,
                name: detected.canonical_name(),
                bom_bytes: bom,
                sample_size: sample.len(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            match detected.canonical_name() {
                Some(name) => println!("Detected encoding: {name}"),
                None => println!("Detected encoding: unknown"),
            }
            if bom > 0 {
                println!("Byte-order mark: {bom} bytes");
            }
            println!("Sample size: {} bytes", sample.len());
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn list_command(cli: &Cli) -> Result<()> {
    let names: Vec<&str> = builtin_names().collect();

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&names)?);
        }
        OutputFormat::Text => {
            println!("Built-in encodings ({} total):", names.len());
            for name in names {
                println!("  {name}");
            }
            println!("Other encodings are reachable through registered handlers and backends.");
        }
    }

    Ok(())
}
