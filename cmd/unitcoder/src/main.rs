//! unitcoder - encode speech recordings into discrete units.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{ConfigCommand, EncodeCommand, SliceCommand};

/// unitcoder - encode speech recordings into discrete units.
///
/// Runs a pretrained feature extractor over a directory of recordings,
/// quantizes every frame against a codebook and writes unit indices,
/// one-hot matrices and features per file.
///
/// Configuration is stored in ~/.unitcoder/unitcoder/ and supports multiple
/// contexts, similar to kubectl's context management.
#[derive(Parser)]
#[command(name = "unitcoder")]
#[command(about = "Discrete speech-unit encoder")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.unitcoder/unitcoder/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Context name to use
    #[arg(short = 'c', long, global = true)]
    pub context: Option<String>,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode a directory of recordings
    Encode(EncodeCommand),
    /// Cut utterances out of long recordings using a JSON manifest
    Slice(SliceCommand),
    /// Manage CLI configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Encode(cmd) => cmd.run(&cli).await,
        Commands::Slice(cmd) => cmd.run(&cli).await,
        Commands::Config(cmd) => cmd.run(&cli).await,
    }
}
