//! # airdrop CLI entry point
//!
//! Parses command-line arguments, loads configuration and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use airdrop_cli::commit::{run_build, BuildArgs};
use airdrop_cli::config::CliConfig;
use airdrop_cli::ledger::{
    run_claim, run_init, run_status, run_withdraw, ClaimArgs, InitArgs, StatusArgs, WithdrawArgs,
};
use airdrop_cli::prove::{run_prove, run_verify, ProveArgs, VerifyArgs};

/// Merkle airdrop toolchain.
///
/// Commits an allocation list to a single root, hands out inclusion proofs,
/// and runs a local claim ledger that pays each allocation at most once.
#[derive(Parser, Debug)]
#[command(name = "airdrop", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ledger directory. Overrides `ledger_dir` from the configuration.
    #[arg(long, global = true)]
    ledger_dir: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a commitment and every proof from an allocation list.
    Build(BuildArgs),

    /// Print the proof for one allocation.
    Prove(ProveArgs),

    /// Verify a proof against a root.
    Verify(VerifyArgs),

    /// Publish an airdrop into the ledger.
    Init(InitArgs),

    /// Redeem an allocation.
    Claim(ClaimArgs),

    /// Show whether an allocation has been redeemed.
    Status(StatusArgs),

    /// Authorize the residual pool to a destination.
    Withdraw(WithdrawArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!("airdrop CLI starting");

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(c) => c.with_ledger_dir(cli.ledger_dir),
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(2);
        }
    };
    tracing::debug!(ledger_dir = %config.ledger_dir.display(), "resolved configuration");

    let result = match &cli.command {
        Commands::Build(args) => run_build(args, &config),
        Commands::Prove(args) => run_prove(args, &config),
        Commands::Verify(args) => run_verify(args, &config),
        Commands::Init(args) => run_init(args, &config),
        Commands::Claim(args) => run_claim(args, &config),
        Commands::Status(args) => run_status(args, &config),
        Commands::Withdraw(args) => run_withdraw(args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
