//! CLI for sealed-bid second-price auctions.
//!
//! This binary provides commands for:
//! - Computing commitments for a bid value and secret
//! - Checking that a value and secret open a commitment
//! - Replaying a scripted auction against an in-memory chain

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::OsRng;
use tracing::info;

use vickrey_client::bid::{prepare_bid, prepare_bid_with_secret};
use vickrey_client::{MockChain, Script};
use vickrey_crypto::{verify_commitment, CryptoError};
use vickrey_module::GenesisConfig;
use vickrey_types::{Amount, Commitment};

#[derive(Parser)]
#[command(name = "vickrey")]
#[command(about = "CLI for sealed-bid second-price auctions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the commitment for a bid
    Commit {
        /// Bid value in base units
        #[arg(long)]
        value: Amount,

        /// Deposit to attach in base units (defaults to the bid value)
        #[arg(long)]
        deposit: Option<Amount>,

        /// Secret; a random one is generated if omitted
        #[arg(long)]
        secret: Option<String>,
    },

    /// Check that a value and secret open a commitment
    Verify {
        /// Commitment (hex)
        #[arg(long)]
        commitment: String,

        /// Bid value in base units
        #[arg(long)]
        value: Amount,

        /// Secret used at commit time
        #[arg(long)]
        secret: String,
    },

    /// Replay a scripted auction against an in-memory chain
    Simulate {
        /// Genesis configuration (JSON); empty genesis if omitted
        #[arg(long)]
        genesis: Option<PathBuf>,

        /// Script of timed calls (JSON)
        #[arg(long)]
        script: PathBuf,
    },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn commit_cmd(value: Amount, deposit: Option<Amount>, secret: Option<String>) -> Result<()> {
    let deposit = deposit.unwrap_or(value);
    let prepared = match secret {
        Some(secret) => prepare_bid_with_secret(value, deposit, secret)?,
        None => prepare_bid(value, deposit, &mut OsRng)?,
    };

    println!("Commitment: {}", prepared.commitment);
    println!("  Value: {} (keep private)", prepared.value);
    println!("  Secret: {} (keep private)", prepared.secret);
    println!("  Deposit: {}", prepared.deposit);

    Ok(())
}

fn verify_cmd(commitment: &str, value: Amount, secret: &str) -> Result<()> {
    let commitment: Commitment = commitment.parse().map_err(CryptoError::from)?;

    if verify_commitment(&commitment, value, secret.as_bytes()) {
        println!("Commitment opens to {}", value);
        Ok(())
    } else {
        anyhow::bail!("commitment {} does not open to the given value and secret", commitment)
    }
}

fn simulate_cmd(genesis: Option<&Path>, script: &Path) -> Result<()> {
    let genesis: GenesisConfig = match genesis {
        Some(path) => read_json(path)?,
        None => GenesisConfig::default(),
    };
    let script: Script = read_json(script)?;

    let chain = MockChain::from_genesis(&genesis)?;
    info!(steps = script.steps.len(), "Replaying script");

    let reports = chain.run(&script)?;
    let output = serde_json::json!({
        "steps": reports,
        "summary": chain.summary(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vickrey=info".parse()?)
                .add_directive("vickrey_client=info".parse()?)
                .add_directive("vickrey_module=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Commit {
            value,
            deposit,
            secret,
        } => commit_cmd(value, deposit, secret)?,

        Commands::Verify {
            commitment,
            value,
            secret,
        } => verify_cmd(&commitment, value, &secret)?,

        Commands::Simulate { genesis, script } => simulate_cmd(genesis.as_deref(), &script)?,
    }

    Ok(())
}
