use crate::chain::Blockchain;
use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use clap::Args;
use std::path::PathBuf;

/// List the outputs paying an address (requires an updated address index)
#[derive(Args)]
pub struct ShowAddressCommand {
    /// Encoded address, e.g. a bech32 or base58 string
    address: String,

    /// Include outputs to equivalent addresses of the same key or script
    #[arg(long)]
    equiv: bool,

    /// Data directory (overrides config.toml and env vars)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

impl ShowAddressCommand {
    pub fn run(&self) -> AppResult<()> {
        let mut app_config = AppConfig::load().map_err(|e| AppError::Config(e.to_string()))?;
        if let Some(data_dir) = &self.data_dir {
            app_config.paths.data_dir = data_dir.clone();
        }

        let chain = Blockchain::open(&app_config.paths.data_dir)?;
        let address = chain.address_from_string(&self.address)?;
        let outputs = if self.equiv {
            chain.equiv_outputs(&address)?
        } else {
            chain.outputs_for_address(&address)?
        };

        println!("{}", address);
        let mut balance = 0u64;
        for output in &outputs {
            if !output.is_spent() {
                balance += output.value();
            }
            println!("  {}:{} {}", output.tx()?.hash(), output.index(), output);
        }
        println!("{} outputs, unspent balance {} sat", outputs.len(), balance);
        Ok(())
    }
}
