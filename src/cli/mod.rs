use crate::errors::AppResult;
use clap::{Parser, Subcommand};

pub mod commands;

/// Bitcoin chain indexer with an address-aware read API
#[derive(Parser)]
#[command(name = "blockindex")]
#[command(about = "Bitcoin chain indexer with an address-aware read API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Parse blocks from a hex file or Bitcoin Core RPC
    Parse(commands::parse::ParseCommand),
    /// Update the address and script-hash indexes
    UpdateIndexes(commands::update_indexes::UpdateIndexesCommand),
    /// Show the outputs of a transaction
    ShowTx(commands::show_tx::ShowTxCommand),
    /// Show the outputs paying an address
    ShowAddress(commands::show_address::ShowAddressCommand),
    /// Test Bitcoin RPC connectivity
    TestRpc(commands::test_rpc::TestRpcCommand),
}

pub async fn run() -> AppResult<()> {
    // RUST_LOG controls verbosity; errors only by default
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse(command) => command.run().await,
        Commands::UpdateIndexes(command) => command.run(),
        Commands::ShowTx(command) => command.run(),
        Commands::ShowAddress(command) => command.run(),
        Commands::TestRpc(command) => command.run().await,
    }
}
