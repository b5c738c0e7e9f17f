use crate::chain::{Blockchain, OutputSummary};
use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::regression::output_regression;
use clap::Args;
use std::path::PathBuf;

/// Print every output of a transaction, ten fields per output
#[derive(Args)]
pub struct ShowTxCommand {
    /// Transaction hash (64 hex characters)
    txid: String,

    /// Emit a JSON array of output objects instead of plain lines
    #[arg(long)]
    json: bool,

    /// Data directory (overrides config.toml and env vars)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

impl ShowTxCommand {
    pub fn run(&self) -> AppResult<()> {
        let mut app_config = AppConfig::load().map_err(|e| AppError::Config(e.to_string()))?;
        if let Some(data_dir) = &self.data_dir {
            app_config.paths.data_dir = data_dir.clone();
        }

        let chain = Blockchain::open(&app_config.paths.data_dir)?;
        let tx = chain.tx_with_hash(&self.txid)?;

        if self.json {
            let summaries = tx
                .outputs()?
                .iter()
                .map(|output| output.summary())
                .collect::<AppResult<Vec<OutputSummary>>>()?;
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        } else {
            println!("{}", tx);
            output_regression(&tx, &mut std::io::stdout().lock())?;
        }
        Ok(())
    }
}
