//! ergo-tool - send ERG and inspect unspent boxes through an Ergo node.

use anyhow::Result;
use clap::{Parser, Subcommand};
use ergo_appkit::{
    box_operations, AppkitError, AppkitResult, BlockchainContext, ErgoClient, ErgoProver,
};
use ergo_client::RestApiErgoClient;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod config;

use config::ToolConfig;

/// Command line client for Ergo transactions.
#[derive(Parser, Debug)]
#[command(name = "ergo-tool")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "ergo-tool.toml")]
    config: PathBuf,

    /// Network to use (mainnet, testnet)
    #[arg(short, long)]
    network: Option<String>,

    /// Node API URL
    #[arg(long)]
    node_url: Option<String>,

    /// Node API key
    #[arg(long)]
    api_key: Option<String>,

    /// Password of the secret storage file
    #[arg(long)]
    storage_password: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the address of the configured secret
    Address,
    /// Send ERG to an address
    Send {
        /// Recipient address
        #[arg(long)]
        to: String,
        /// Amount in nanoERG
        #[arg(long)]
        amount: u64,
    },
    /// List unspent boxes of an address
    Unspent {
        /// Address to query
        #[arg(long)]
        address: String,
        /// Only select boxes covering this many nanoERG
        #[arg(long, default_value = "0")]
        amount: u64,
    },
    /// Show the balance of the node wallet
    Balance,
}

fn create_prover(
    ctx: &BlockchainContext,
    config: &ToolConfig,
    args: &Args,
) -> AppkitResult<ErgoProver> {
    if let Some(ref mnemonic) = config.wallet.mnemonic {
        let mut builder = ctx.new_prover_builder();
        builder.with_mnemonic(mnemonic, &config.wallet.mnemonic_password)?;
        return builder.build();
    }
    match (&config.wallet.storage_file, &args.storage_password) {
        (Some(file), Some(password)) => box_operations::create_prover(ctx, file, password),
        (Some(_), None) => Err(AppkitError::MissingConfiguration("storage password")),
        (None, _) => Err(AppkitError::MissingConfiguration("wallet secret")),
    }
}

fn run(args: &Args, config: &ToolConfig) -> Result<()> {
    let client = RestApiErgoClient::new(&config.client_config()?)?;

    match &args.command {
        Command::Address => {
            let address = client.execute(|ctx| create_prover(ctx, config, args)?.address())?;
            println!("{}", address);
        }
        Command::Send { to, amount } => {
            let json = client.execute(|ctx| {
                let prover = create_prover(ctx, config, args)?;
                box_operations::send(ctx, &prover, to, *amount)
            })?;
            println!("{}", json);
        }
        Command::Unspent { address, amount } => {
            let boxes = client.execute(|ctx| box_operations::load_top(ctx, address, *amount))?;
            for ergo_box in &boxes {
                println!(
                    "{} {}",
                    hex::encode(ergo_box.box_id().as_ref()),
                    u64::from(ergo_box.value)
                );
            }
            info!(count = boxes.len(), "Unspent boxes listed");
        }
        Command::Balance => {
            let balance = client.execute(|ctx| ctx.wallet().balance())?;
            println!("{}", balance);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = ToolConfig::load(&args.config, &args)?;
    info!(network = %config.network, node = %config.node.api_url, "Configuration loaded");

    run(&args, &config)
}
