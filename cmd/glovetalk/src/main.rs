//! glovetalk - speaks the gestures of a flex-sensor glove.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod driver;
mod pipeline;
mod transport;

use commands::{ClassifyCommand, ConfigCommand, RunCommand, SayCommand};

/// glovetalk - speaks the gestures of a flex-sensor glove.
///
/// Reads sensor frames from the glove over a serial port, matches each one
/// against a reference dataset of known gestures, and announces the result
/// through Google Cloud Text-to-Speech or a local speech engine.
///
/// Configuration is stored in ~/.glovetalk/ and supports multiple profiles,
/// similar to kubectl's context management.
#[derive(Parser)]
#[command(name = "glovetalk")]
#[command(about = "Flex-sensor glove gesture announcer")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.glovetalk/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Profile name to use
    #[arg(short = 'p', long, global = true)]
    pub profile: Option<String>,

    /// Serial port, overriding the profile
    #[arg(long, global = true)]
    pub port: Option<String>,

    /// Reference dataset CSV, overriding the profile
    #[arg(long, global = true)]
    pub dataset: Option<PathBuf>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read, classify and announce gestures from the glove
    Run(RunCommand),
    /// Classify one sensor line
    Classify(ClassifyCommand),
    /// Speak text through the speech pipeline
    Say(SayCommand),
    /// Manage CLI configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Run(cmd) => cmd.run(&cli).await,
        Commands::Classify(cmd) => cmd.run(&cli).await,
        Commands::Say(cmd) => cmd.run(&cli).await,
        Commands::Config(cmd) => cmd.run(&cli).await,
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
