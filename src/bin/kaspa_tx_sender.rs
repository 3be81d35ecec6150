//! Kaspa transaction sender
//!
//! Sends one payment from the outputs of a single private key, or generates
//! a new key pair.
//!
//! ## Usage
//! ```bash
//! # Generate a key pair for testnet
//! cargo run --bin kaspa_tx_sender -- genkeypair --network testnet
//!
//! # Send 0.1 KAS to yourself through a REST service on localhost:8000
//! cargo run --bin kaspa_tx_sender -- send --private-key <hex>
//!
//! # Send to another address through a remote node
//! cargo run --bin kaspa_tx_sender -- send -s http://10.0.0.5:8000 \
//!     --private-key <hex> --to kaspatest:qq... --amount 25000000
//!
//! # Build and sign without submitting
//! cargo run --bin kaspa_tx_sender -- send --private-key <hex> --dry-run
//! ```
//!
//! Logs go to stdout and to `~/.kaspa-tx-sender/`. Ctrl+C aborts the
//! attempt at the next node call; nothing is resumed.

#[cfg(feature = "cli")]
use std::{path::PathBuf, sync::Arc, time::Duration};

#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};
#[cfg(feature = "cli")]
use tokio::signal;
#[cfg(feature = "cli")]
use tracing::{error, info};

#[cfg(feature = "cli")]
use kaspa_tx_sender::{
    address::parse_address,
    config::{SenderConfig, DEFAULT_FEE, DEFAULT_SEND_AMOUNT},
    data_structures::format_kaspa,
    errors::{SenderError, SenderResult},
    logging::{init_logging, LogConfig},
    network::NetworkId,
    rpc::{HttpRpcClient, RpcTransaction},
    signing::prepare::{DEFAULT_MAX_INPUTS, MIN_CONFIRMATIONS},
    wallet::{TransactionSender, Wallet, WalletBuilder},
};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(
    name = "kaspa_tx_sender",
    version,
    about = "Send a single-recipient Kaspa payment"
)]
struct CliArgs {
    /// Stdout log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Directory for the log files
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Command {
    /// Build, sign and submit a payment
    Send(SendArgs),
    /// Generate a new private key and print its address
    Genkeypair {
        #[arg(long, default_value = "testnet", value_parser = parse_network)]
        network: NetworkId,
    },
}

#[cfg(feature = "cli")]
#[derive(Args, Debug)]
struct SendArgs {
    /// REST server of the node (defaults to localhost:8000; a bare host gets port 8000)
    #[arg(short = 's', long = "rpcserver", default_value = "")]
    rpc_server: String,

    #[arg(long, default_value = "testnet", value_parser = parse_network)]
    network: NetworkId,

    /// Sender private key (64 hex characters)
    #[arg(long)]
    private_key: String,

    /// Recipient address (defaults to the sender's own address)
    #[arg(long)]
    to: Option<String>,

    /// Amount to send in sompi
    #[arg(long, default_value_t = DEFAULT_SEND_AMOUNT)]
    amount: u64,

    /// Fee in sompi
    #[arg(long, default_value_t = DEFAULT_FEE)]
    fee: u64,

    #[arg(long, default_value_t = DEFAULT_MAX_INPUTS)]
    max_inputs: usize,

    /// Confirmations a regular output needs before it is spent
    #[arg(long, default_value_t = MIN_CONFIRMATIONS)]
    min_confirmations: u64,

    /// Timeout for each node call, in seconds
    #[arg(long, default_value_t = 300)]
    timeout: u64,

    /// Print the signed transaction instead of submitting it
    #[arg(long)]
    dry_run: bool,
}

#[cfg(feature = "cli")]
fn parse_network(s: &str) -> Result<NetworkId, String> {
    s.parse::<NetworkId>().map_err(|e| e.to_string())
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let mut log_config = match LogConfig::default().with_stdout_level(&args.log_level) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(2);
        }
    };
    if let Some(dir) = &args.log_dir {
        log_config = log_config.with_log_dir(dir);
    }
    if let Err(e) = init_logging(&log_config) {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }

    let result = match args.command {
        Command::Send(send_args) => run_send(send_args).await,
        Command::Genkeypair { network } => {
            run_genkeypair(network);
            Ok(())
        }
    };

    match result {
        Ok(()) => {}
        Err(e @ SenderError::Cancelled { .. }) => {
            error!("{e}");
            std::process::exit(130); // Standard exit code for SIGINT
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "cli")]
fn run_genkeypair(network: NetworkId) {
    let wallet = Wallet::generate_new(network);
    println!("Private key: {}", wallet.export_private_key().as_str());
    println!("Address:     {}", wallet.address());
}

#[cfg(feature = "cli")]
fn sender_config(args: &SendArgs) -> SenderResult<SenderConfig> {
    let config = SenderConfig::new(args.network)
        .with_rpc_server(args.rpc_server.as_str())
        .with_fee(args.fee)
        .with_max_inputs(args.max_inputs)
        .with_min_confirmations(args.min_confirmations)
        .with_request_timeout(Duration::from_secs(args.timeout));
    config.validate()?;
    Ok(config)
}

#[cfg(feature = "cli")]
async fn run_send(args: SendArgs) -> SenderResult<()> {
    let config = sender_config(&args)?;

    let wallet = WalletBuilder::new()
        .from_private_key_hex(args.private_key)
        .with_network(args.network)
        .build()?;
    let recipient = match &args.to {
        Some(to) => parse_address(to, args.network.prefix())?,
        None => wallet.address().clone(),
    };
    info!("Sender address: {}", wallet.address());
    info!("Recipient address: {}", recipient);

    let rpc_address = config.rpc_server_address()?;
    let client = Arc::new(
        HttpRpcClient::new(&rpc_address, config.request_timeout)
            .map_err(|e| SenderError::ConfigurationError(e.to_string()))?,
    );
    info!("Using node at {}", client.base_url());

    // Abort at the next node call on Ctrl+C
    let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(true);
        }
    });

    let sender =
        TransactionSender::new(wallet, config, client.clone(), client)?.with_cancellation(cancel_rx);

    if args.dry_run {
        let prepared = sender.prepare(&recipient, args.amount).await?;
        let rpc_transaction = RpcTransaction::from(&prepared.transaction.tx);
        let json = serde_json::to_string_pretty(&rpc_transaction)
            .map_err(|e| SenderError::ConfigurationError(e.to_string()))?;
        println!("{json}");
        info!(
            "Dry run: transaction {} spends {} inputs ({} KAS), change {} KAS",
            prepared.transaction_id(),
            prepared.input_count(),
            format_kaspa(prepared.total_input),
            format_kaspa(prepared.change)
        );
        return Ok(());
    }

    let outcome = sender.send(&recipient, args.amount).await?;
    println!("{}", outcome.transaction_id);
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("This binary requires the 'cli' feature to be enabled.");
    eprintln!("Run with: cargo run --bin kaspa_tx_sender --features cli");
    std::process::exit(1);
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    fn send_args(extra: &[&str]) -> SendArgs {
        let mut argv = vec!["kaspa_tx_sender", "send", "--private-key", "00"];
        argv.extend_from_slice(extra);
        match CliArgs::try_parse_from(argv).unwrap().command {
            Command::Send(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_send_defaults() {
        let config = sender_config(&send_args(&[])).unwrap();
        assert_eq!(config, SenderConfig::new(NetworkId::Testnet));
        assert_eq!(config.rpc_server_address().unwrap(), "localhost:8000");
    }

    #[test]
    fn test_min_confirmations_flag() {
        let config = sender_config(&send_args(&["--min-confirmations", "25"])).unwrap();
        assert_eq!(config.min_confirmations, 25);

        let too_high = sender_config(&send_args(&["--min-confirmations", "100"]));
        assert!(matches!(too_high, Err(SenderError::ConfigurationError(_))));
    }
}
