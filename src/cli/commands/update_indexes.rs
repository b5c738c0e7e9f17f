use crate::chain::Blockchain;
use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::parser::update_indexes;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

/// Catch the address and script-hash indexes up with the parsed chain
#[derive(Args)]
pub struct UpdateIndexesCommand {
    /// Data directory (overrides config.toml and env vars)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory for index state files (defaults to <data_dir>/parser)
    #[arg(long)]
    parser_dir: Option<PathBuf>,
}

impl UpdateIndexesCommand {
    pub fn run(&self) -> AppResult<()> {
        info!("=== blockindex - Update indexes ===");

        let mut app_config = AppConfig::load().map_err(|e| AppError::Config(e.to_string()))?;
        if let Some(data_dir) = &self.data_dir {
            app_config.paths.data_dir = data_dir.clone();
        }
        if let Some(parser_dir) = &self.parser_dir {
            app_config.paths.parser_dir = Some(parser_dir.clone());
        }

        let chain = Blockchain::open(&app_config.paths.data_dir)?;
        let (addresses, hashes) = update_indexes(&chain, &app_config.paths.parser_dir())?;

        println!(
            "Address index: {} txes | Script-hash index: {} scripts",
            addresses.transactions, hashes.scripts
        );
        Ok(())
    }
}
