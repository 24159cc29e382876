//! Speech Auth CLI - A command line interface for voice biometrics sessions.

use clap::{Parser, Subcommand};

mod commands;

use commands::{ConfigCommand, EnrollCommand, IdentifyCommand, VerifyCommand};

/// Speech Auth CLI - A command line interface for voice biometrics sessions.
///
/// This tool runs complete sessions against the speech authorization API:
///   - Enroll: build a voiceprint for a client id
///   - Verify: match speech against a claimed client id
///   - Identify: find the speaker among a set of candidates
///
/// Every session command posts the WAV files of a directory in name order,
/// then closes the session and prints a summary.
///
/// Configuration is stored in ~/.giztoy/speechauth/ and supports multiple
/// contexts, similar to kubectl's context management.
#[derive(Parser)]
#[command(name = "speechauth")]
#[command(about = "Voice biometrics API CLI tool")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.giztoy/speechauth/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Context name to use
    #[arg(short = 'c', long, global = true)]
    pub context: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

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
    /// Manage CLI configuration
    Config(ConfigCommand),
    /// Enroll a client id from speech samples
    Enroll(EnrollCommand),
    /// Verify speech samples against a client id
    Verify(VerifyCommand),
    /// Identify the speaker of speech samples among candidates
    Identify(IdentifyCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .init();
    }

    match &cli.command {
        Commands::Config(cmd) => cmd.run(&cli).await,
        Commands::Enroll(cmd) => cmd.run(&cli).await,
        Commands::Verify(cmd) => cmd.run(&cli).await,
        Commands::Identify(cmd) => cmd.run(&cli).await,
    }
}
