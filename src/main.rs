//! quotesign - sign unsigned quote transactions for submission
//!
//! Reads a quote response, signs its unsigned payload with a local key file
//! and prints the submission request. Fetching quotes and submitting the
//! result are left to the caller.
//!
//! # Usage
//!
//! ```bash
//! # Sign a saved quote with keys/sepolia/alice.json
//! quotesign sign --network sepolia --quote quote.json > submit.json
//!
//! # Pipe a Solana quote through stdin with an explicit key
//! curl ... | quotesign sign --network solana-devnet --key keys/solana-devnet/bob.json
//!
//! # Explorer link for a submission response
//! quotesign explorer --network sepolia --response response.json
//! ```

use clap::{Args, Parser, Subcommand};
use quotesign::config::Config;
use quotesign::errors::{QuoteSignError, Result};
use quotesign::keystore::{self, SignerKey};
use quotesign::quote::{Network, Quote, SubmitTransactionResponse};
use quotesign::signer;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "quotesign", version, about = "Sign unsigned EVM and Solana quote transactions")]
struct Cli {
    /// Config file (defaults to ./quotesign.toml when present)
    #[arg(long, global = true, env = "QUOTESIGN_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct KeyArgs {
    /// Network name (sepolia, eth, solana, solana-devnet)
    #[arg(long)]
    network: Option<String>,

    /// Key file; defaults to <key_dir>/<network>/<default_key>.json
    #[arg(long)]
    key: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Sign a quote response and print the submission request JSON
    Sign {
        #[command(flatten)]
        key: KeyArgs,

        /// Quote response JSON file, or `-` for stdin
        #[arg(long, default_value = "-")]
        quote: String,

        /// Mark the submission as travel-rule compliant
        #[arg(long)]
        travel_rule: bool,
    },

    /// Print the signer's address or public key
    Address {
        #[command(flatten)]
        key: KeyArgs,
    },

    /// Print the block explorer URL for a submitted transaction
    Explorer {
        /// Network name
        #[arg(long)]
        network: Option<String>,

        /// Transaction hash or signature
        #[arg(required_unless_present = "response", conflicts_with = "response")]
        reference: Option<String>,

        /// Saved submission response JSON
        #[arg(long)]
        response: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("quotesign: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config);
    debug!("Starting quotesign v{}", VERSION);

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Sign {
            key,
            quote,
            travel_rule,
        } => {
            let network = resolve_network(key.network.as_deref(), config)?;
            let signer_key = load_signer(&key, network, config)?;

            let quote = Quote::from_response(&read_input(&quote)?)?;
            info!("Signing quote {} on {} as {}", quote.quote_id, network, signer_key.public_address());

            let travel_rule = travel_rule || config.signing.travel_rule_compliant;
            let request = signer::sign_quote(&quote, network, &signer_key, travel_rule)?;

            println!("{}", serde_json::to_string_pretty(&request)?);
            Ok(())
        }
        Command::Address { key } => {
            let network = resolve_network(key.network.as_deref(), config)?;
            let signer_key = load_signer(&key, network, config)?;
            println!("{}", signer_key.public_address());
            Ok(())
        }
        Command::Explorer {
            network,
            reference,
            response,
        } => {
            let network = resolve_network(network.as_deref(), config)?;
            let reference = match (reference, response) {
                (Some(reference), _) => reference,
                (None, Some(path)) => {
                    let response: SubmitTransactionResponse =
                        serde_json::from_str(&read_input(&path.to_string_lossy())?)?;
                    response.reference().map(str::to_string).ok_or_else(|| {
                        QuoteSignError::InvalidQuote(
                            "Submission response has neither signature nor tx_hash".to_string(),
                        )
                    })?
                }
                (None, None) => {
                    return Err(QuoteSignError::ConfigError(
                        "Either a reference or --response is required".to_string(),
                    ))
                }
            };
            println!("{}", network.explorer_tx_url(&reference));
            Ok(())
        }
    }
}

fn resolve_network(arg: Option<&str>, config: &Config) -> Result<Network> {
    match arg {
        Some(name) => name.parse(),
        None => config.default_network(),
    }
}

fn load_signer(args: &KeyArgs, network: Network, config: &Config) -> Result<SignerKey> {
    let path = args
        .key
        .clone()
        .unwrap_or_else(|| config.key_path(network));
    debug!("Loading {} key from {:?}", network.family().as_str(), path);
    keystore::load_key(&path, network.family())
}

/// Read a file, or stdin for `-`
fn read_input(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(Path::new(source)).map_err(|e| {
            QuoteSignError::StorageError(format!("Cannot read {}: {}", source, e))
        })
    }
}

/// Initialize logging
fn init_logging(config: &Config) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    // stdout carries the signed output; logs go to stderr
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(io::stderr)).init();
    }
}
