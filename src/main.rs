use clap::{ArgAction, Parser, Subcommand};
use lsb::{
    binary,
    bmp::{Bitmap, BmpError, Channel},
    metrics, BitWidth, Conceal, Reveal,
};
use std::{
    fs, io,
    io::Write,
    path::{Path, PathBuf},
    process::ExitCode,
};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "lsb",
    version,
    about = "Hide files in the least significant bits of 24-bit BMP images"
)]
struct Cli {
    /// Increase log verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Conceal a file inside a bitmap
    Encode {
        /// Least significant bits to use per pixel byte (1, 2 or 3)
        bits: BitWidth,
        /// File to conceal
        payload: PathBuf,
        /// Cover bitmap
        input: PathBuf,
        /// Bitmap to write
        output: PathBuf,
    },
    /// Reveal a file concealed inside a bitmap
    Decode {
        /// Least significant bits used per pixel byte (1, 2 or 3)
        bits: BitWidth,
        /// Bitmap holding the payload
        input: PathBuf,
        /// File to write the payload to
        output: PathBuf,
    },
    /// Show how many bytes a bitmap can conceal at every bit width
    Capacity {
        /// Cover bitmap
        input: PathBuf,
    },
    /// Compare an original bitmap with a modified one
    Stats {
        /// Original bitmap
        original: PathBuf,
        /// Modified bitmap
        modified: PathBuf,
        /// Also print each plane's autocorrelation against itself shifted by this many rows
        #[arg(long, value_name = "DY", allow_hyphen_values = true)]
        autocorrelation: Option<isize>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("{}: {source}", path.display())]
    Bitmap { path: PathBuf, source: BmpError },

    #[error("images differ in size: {0}x{1} and {2}x{3}")]
    SizeMismatch(usize, usize, usize, usize),

    #[error(transparent)]
    Packer(#[from] lsb::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Encode {
            bits,
            payload,
            input,
            output,
        } => {
            let message = fs::read(&payload).map_err(|source| CliError::Read {
                path: payload.clone(),
                source,
            })?;
            let mut image = open(&input)?;

            tracing::info!(
                payload = message.len(),
                capacity = binary::capacity(image.pixels().len(), bits),
                bits = %bits,
                "encoding {}",
                input.display()
            );

            let touched = binary::Carrier::new(bits).conceal(&message, image.pixels_mut())?;
            tracing::info!(touched, "writing {}", output.display());

            image.save(&output).map_err(|source| CliError::Bitmap {
                path: output.clone(),
                source,
            })
        }
        Commands::Decode {
            bits,
            input,
            output,
        } => {
            let image = open(&input)?;

            let mut message = Vec::new();
            let len = binary::Package::new(bits, image.pixels()).reveal(&mut message)?;
            tracing::info!(payload = len, "writing {}", output.display());

            write_atomic(&output, &message)
        }
        Commands::Capacity { input } => {
            let image = open(&input)?;

            println!(
                "{}: {}x{}, {} pixel bytes",
                input.display(),
                image.width(),
                image.height(),
                image.pixels().len()
            );
            for bits in BitWidth::ALL {
                println!(
                    "  {bits} bit(s): {} bytes",
                    binary::capacity(image.pixels().len(), bits)
                );
            }

            Ok(())
        }
        Commands::Stats {
            original,
            modified,
            autocorrelation,
        } => {
            let a = open(&original)?;
            let b = open(&modified)?;

            if (a.width(), a.height()) != (b.width(), b.height()) {
                return Err(CliError::SizeMismatch(
                    a.width(),
                    a.height(),
                    b.width(),
                    b.height(),
                ));
            }

            println!(
                "{:<6} {:>10} {:>12} {:>10} {:>10}",
                "plane", "psnr(dB)", "correlation", "entropy", "entropy'"
            );
            for channel in Channel::ALL {
                let (x, y) = (a.channel(channel), b.channel(channel));
                println!(
                    "{:<6} {:>10.3} {:>12.6} {:>10.4} {:>10.4}",
                    channel.name(),
                    metrics::psnr(&x, &y),
                    metrics::correlation(&x, &y),
                    metrics::entropy(&x),
                    metrics::entropy(&y),
                );
            }

            if let Some(dy) = autocorrelation {
                println!();
                println!(
                    "{:<6} {:>6} {:>12} {:>12}",
                    "plane", "dx", "original", "modified"
                );
                for channel in Channel::ALL {
                    let (x, y) = (a.channel(channel), b.channel(channel));
                    let rows = metrics::autocorrelation(&x, a.width(), a.height(), dy)
                        .into_iter()
                        .zip(metrics::autocorrelation(&y, b.width(), b.height(), dy));

                    for ((dx, r), (_, s)) in rows {
                        println!("{:<6} {:>6} {:>12.6} {:>12.6}", channel.name(), dx, r, s);
                    }
                }
            }

            Ok(())
        }
    }
}

fn open(path: &Path) -> Result<Bitmap, CliError> {
    Bitmap::open(path).map_err(|source| CliError::Bitmap {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `data` to a temporary sibling of `path` and renames it into place.
fn write_atomic(path: &Path, data: &[u8]) -> Result<(), CliError> {
    let error = |source: io::Error| CliError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(error)?;
    file.write_all(data).map_err(error)?;
    file.persist(path).map_err(|e| error(e.error))?;

    Ok(())
}
