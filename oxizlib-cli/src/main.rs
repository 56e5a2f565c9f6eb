//! OxiZlib CLI - gzip compression in Pure Rust
//!
//! Compress, decompress, inspect and verify `.gz` files.

mod commands;
mod utils;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use commands::{CompressOptions, DecompressOptions};
use oxizlib_core::Strategy;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "oxizlib")]
#[command(author, version, about = "gzip compression in Pure Rust")]
#[command(long_about = "
OxiZlib compresses and decompresses gzip (RFC 1952) files.

Examples:
  oxizlib compress access.log
  oxizlib compress -l 9 -k data.csv
  oxizlib decompress access.log.gz
  oxizlib cat access.log.gz | grep ERROR
  oxizlib test backup.gz
  oxizlib info --json backup.gz
  oxizlib completions bash > oxizlib.bash
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress files to FILE.gz
    #[command(alias = "c")]
    Compress {
        /// Files to compress
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Compression level (0-9, -1 for default)
        #[arg(short, long, default_value = "-1", allow_hyphen_values = true)]
        level: i32,

        /// Compression strategy
        #[arg(long, value_enum, default_value = "default")]
        strategy: StrategyArg,

        /// Keep input files
        #[arg(short, long)]
        keep: bool,

        /// Write to stdout
        #[arg(short = 'c', long)]
        stdout: bool,

        /// Overwrite existing output files
        #[arg(short, long)]
        force: bool,

        /// Do not store the name and timestamp
        #[arg(short = 'n', long)]
        no_name: bool,

        /// Suffix for compressed files
        #[arg(short = 'S', long, default_value = ".gz")]
        suffix: String,

        /// Sync-flush after every block
        #[arg(long)]
        sync: bool,

        /// Show progress bar
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Decompress FILE.gz to FILE
    #[command(alias = "d")]
    Decompress {
        /// Files to decompress
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Keep input files
        #[arg(short, long)]
        keep: bool,

        /// Write to stdout
        #[arg(short = 'c', long)]
        stdout: bool,

        /// Overwrite existing output files
        #[arg(short, long)]
        force: bool,

        /// Restore the stored name
        #[arg(short = 'N', long)]
        name: bool,

        /// Suffix of compressed files
        #[arg(short = 'S', long, default_value = ".gz")]
        suffix: String,
    },

    /// Decompress files to stdout
    Cat {
        /// Files to print
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Test integrity of compressed files
    #[command(alias = "t")]
    Test {
        /// Files to test
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Show header and size information
    #[command(alias = "i")]
    Info {
        /// File to inspect
        file: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Compression strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
enum StrategyArg {
    /// Normal data
    #[default]
    Default,
    /// Data produced by a filter or predictor
    Filtered,
    /// Huffman coding only, no string matching
    Huffman,
    /// Run-length matches only
    Rle,
    /// Fixed Huffman codes
    Fixed,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Default => Strategy::Default,
            StrategyArg::Filtered => Strategy::Filtered,
            StrategyArg::Huffman => Strategy::HuffmanOnly,
            StrategyArg::Rle => Strategy::Rle,
            StrategyArg::Fixed => Strategy::Fixed,
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    // Only fails if a subscriber is already installed.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    let verbose = cli.verbose > 0;

    let result = match cli.command {
        Commands::Compress {
            files,
            level,
            strategy,
            keep,
            stdout,
            force,
            no_name,
            suffix,
            sync,
            progress,
        } => commands::cmd_compress(
            &files,
            &CompressOptions {
                level,
                strategy: strategy.into(),
                keep,
                stdout,
                force,
                no_name,
                suffix,
                sync,
                progress,
            },
        ),
        Commands::Decompress {
            files,
            keep,
            stdout,
            force,
            name,
            suffix,
        } => commands::cmd_decompress(
            &files,
            &DecompressOptions {
                keep,
                stdout,
                force,
                restore_name: name,
                suffix,
            },
        ),
        Commands::Cat { files } => commands::cmd_cat(&files),
        Commands::Test { files } => commands::cmd_test(&files, verbose),
        Commands::Info { file, json } => commands::cmd_info(&file, json),
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "oxizlib", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
