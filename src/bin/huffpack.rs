//! Huffman archive tool.
//!
//! ## Usage
//!
//! ```bash
//! # Pack files into report.cmp (named after the first input)
//! huffpack compress report.txt data.bin
//!
//! # Choose the container name
//! huffpack compress -o bundle.cmp a.txt b.txt
//!
//! # Extract into ./out (created if missing)
//! huffpack decompress report.cmp out
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use huffpack::{archive, CompressionStats, Config};

#[derive(Parser, Debug)]
#[command(name = "huffpack")]
#[command(version)]
#[command(about = "Huffman compression for one or more files", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress files into a single container
    Compress {
        /// Files to compress, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Container path (default: first file's stem + .cmp)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Extract every file from a container
    Decompress {
        /// Container to read
        container: PathBuf,

        /// Directory to extract into
        #[arg(default_value = ".")]
        output_dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("huffpack: could not install log subscriber");
    }

    let config = Config::default();
    let result = match args.command {
        Command::Compress { files, output } => compress(&files, output, &config),
        Command::Decompress {
            container,
            output_dir,
        } => decompress(&container, &output_dir, &config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn compress(files: &[PathBuf], output: Option<PathBuf>, config: &Config) -> huffpack::Result<()> {
    info!("compressing {} file(s)", files.len());
    let start = Instant::now();

    let entries = archive::read_files(files, config)?;
    let original: u64 = entries.iter().map(|e| e.data.len() as u64).sum();
    info!("original size: {original} bytes");

    let bytes = huffpack::compress_with(&entries, config)?;
    let output = output
        .or_else(|| files.first().map(|f| archive::container_path(f)))
        .ok_or(huffpack::Error::EmptyInput)?;
    archive::write_container(&output, &bytes)?;

    let stats = CompressionStats::new(original, bytes.len() as u64, start.elapsed());
    info!("wrote {}", output.display());
    info!("compressed size: {} bytes", stats.compressed_size);
    info!("space savings: {:.2}%", stats.savings_percent());
    info!("elapsed: {:.2}s", stats.elapsed.as_secs_f64());
    Ok(())
}

fn decompress(container: &Path, output_dir: &Path, config: &Config) -> huffpack::Result<()> {
    info!("decompressing {}", container.display());
    let start = Instant::now();

    let bytes = std::fs::read(container).map_err(|e| huffpack::Error::file(container, e))?;
    let entries = huffpack::decompress_with(&bytes, config)?;
    let decoded: u64 = entries.iter().map(|e| e.data.len() as u64).sum();
    info!("{} file(s), {decoded} bytes decoded", entries.len());

    archive::extract(&entries, output_dir)?;

    info!("output directory: {}", output_dir.display());
    info!("elapsed: {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}
