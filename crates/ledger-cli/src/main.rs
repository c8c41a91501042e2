mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::common::{NetworkArg, WalletFile};

#[derive(Parser)]
#[command(name = "ledger-cli", about = "Wallet ledger maintenance CLI")]
struct Cli {
    /// Wallet file (JSON).
    #[arg(long, global = true, default_value = "wallet.json")]
    wallet: PathBuf,

    /// Network used for address encoding.
    #[arg(long, global = true, value_enum, default_value_t = NetworkArg::Mainnet)]
    network: NetworkArg,

    /// Write every key (public and secret) instead of only the secrets.
    #[arg(long, global = true)]
    include_keys: bool,

    /// Debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a wallet file from secret keys.
    Init(commands::init::InitArgs),
    /// Add transactions from a JSON file to the ledger.
    AddTx(commands::add_tx::AddTxArgs),
    /// Derive key images, attribute inputs and prune foreign entries.
    Reconcile,
    /// Show total, unlocked and locked balance.
    Balance(commands::inspect::BalanceArgs),
    /// List owned outputs and whether they are spent.
    Outputs,
    /// Print the wallet's public address.
    Address,
    /// Record the last scanned block height.
    SetHeight(commands::inspect::SetHeightArgs),
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let file = WalletFile {
        path: cli.wallet,
        network: cli.network.into(),
        include_keys: cli.include_keys,
    };
    let result = match cli.command {
        Commands::Init(args) => commands::init::run(&file, args),
        Commands::AddTx(args) => commands::add_tx::run(&file, args),
        Commands::Reconcile => commands::inspect::reconcile(&file),
        Commands::Balance(args) => commands::inspect::balance(&file, args),
        Commands::Outputs => commands::inspect::outputs(&file),
        Commands::Address => commands::inspect::address(&file),
        Commands::SetHeight(args) => commands::inspect::set_height(&file, args),
    };
    if let Err(err) = result {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}
