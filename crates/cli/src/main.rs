//! MOR checkout CLI.
//!
//! This tool provides commands for:
//! - Submitting carts and estimating tax against the checkout API
//! - Looking up order status by MOR or partner order ID
//! - Verifying the signed redirect that returns a customer after payment
//! - Computing request signatures for debugging
//! - Validating configuration files

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod error;
mod logging;
mod orders;
mod signing;

use error::CliError;
use orders::OrderRef;

#[derive(Parser)]
#[command(name = "morcli")]
#[command(about = "Signed request client for the MOR checkout API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the TOML configuration file
    #[arg(
        long,
        short,
        global = true,
        env = "MOR_CHECKOUT_CONFIG",
        default_value = "mor-checkout.toml"
    )]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a cart and print where to send the customer
    Checkout {
        /// JSON cart file (defaults to the built-in sample cart)
        #[arg(long, short)]
        file: Option<PathBuf>,
    },

    /// Look up an order's status
    #[command(group(ArgGroup::new("order").required(true).args(["mor_order_id", "external_order_id"])))]
    Status {
        /// Order ID assigned by the MOR
        #[arg(long)]
        mor_order_id: Option<String>,

        /// Your own order ID
        #[arg(long)]
        external_order_id: Option<String>,
    },

    /// Estimate tax for a cart without placing an order
    TaxEstimate {
        /// JSON cart file (defaults to the built-in sample cart)
        #[arg(long, short)]
        file: Option<PathBuf>,
    },

    /// Compute the signature for a payload
    Sign {
        /// Payload to sign, exactly as it will be sent
        #[arg(long)]
        payload: String,

        /// Treat the payload as a plain string rather than JSON
        #[arg(long)]
        raw: bool,

        /// Timestamp to sign with (defaults to now)
        #[arg(long)]
        timestamp: Option<String>,
    },

    /// Verify a return URL from a completed checkout
    Callback {
        /// The full URL the customer was redirected to
        #[arg(long)]
        url: String,

        /// Skip the follow-up status lookup
        #[arg(long)]
        no_fetch: bool,
    },

    /// Print the sample cart as JSON
    Sample,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate config and print the effective settings
    Validate,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let load = || config::load_settings(&cli.config, cli.verbose);

    match cli.command {
        Commands::Checkout { file } => orders::checkout(&load()?, file.as_deref()),
        Commands::Status {
            mor_order_id,
            external_order_id,
        } => {
            let order = match (mor_order_id, external_order_id) {
                (Some(id), _) => OrderRef::Mor(id),
                (None, Some(id)) => OrderRef::External(id),
                (None, None) => {
                    return Err(CliError::Usage(
                        "one of --mor-order-id or --external-order-id is required".into(),
                    ))
                }
            };
            orders::status(&load()?, &order)
        }
        Commands::TaxEstimate { file } => orders::tax_estimate(&load()?, file.as_deref()),
        Commands::Sign {
            payload,
            raw,
            timestamp,
        } => signing::sign(&load()?, &payload, raw, timestamp.as_deref()),
        Commands::Callback { url, no_fetch } => signing::callback(&load()?, &url, !no_fetch),
        Commands::Sample => orders::sample(),
        Commands::Config { action } => match action {
            ConfigAction::Validate => config::validate(&cli.config, cli.verbose),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_status_requires_one_identifier() {
        assert!(Cli::try_parse_from(["morcli", "status"]).is_err());
        assert!(Cli::try_parse_from([
            "morcli",
            "status",
            "--mor-order-id",
            "A",
            "--external-order-id",
            "B"
        ])
        .is_err());

        let cli = Cli::try_parse_from(["morcli", "status", "--external-order-id", "ORD-1"]).unwrap();
        match cli.command {
            Commands::Status {
                mor_order_id: None,
                external_order_id: Some(id),
            } => assert_eq!(id, "ORD-1"),
            _ => panic!("Expected status command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["morcli", "sample", "--verbose", "--config", "other.toml"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
    }
}
