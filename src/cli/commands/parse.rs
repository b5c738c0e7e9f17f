use crate::chain::Blockchain;
use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::parser::progress::ProgressTracker;
use crate::parser::{update_indexes, ChainParser, FileBlockSource, IngestStats};
use crate::rpc::BitcoinRpcClient;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

/// Append blocks to the chain database
#[derive(Args)]
pub struct ParseCommand {
    /// Read hex-encoded blocks from a file (one per line)
    #[arg(long, conflicts_with = "rpc", required_unless_present = "rpc")]
    blocks_file: Option<PathBuf>,

    /// Fetch blocks from Bitcoin Core RPC, starting after the current tip
    #[arg(long)]
    rpc: bool,

    /// Stop after this many blocks
    #[arg(long)]
    max_blocks: Option<usize>,

    /// Data directory (overrides config.toml and env vars)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Network for address encoding (overrides config.toml)
    #[arg(long)]
    network: Option<String>,

    /// Leave the address and script-hash indexes untouched
    #[arg(long)]
    skip_indexes: bool,

    /// Bitcoin RPC URL (overrides config.toml)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Bitcoin RPC username (overrides config.toml)
    #[arg(long)]
    rpc_username: Option<String>,

    /// Bitcoin RPC password (overrides config.toml)
    #[arg(long)]
    rpc_password: Option<String>,
}

impl ParseCommand {
    pub async fn run(&self) -> AppResult<()> {
        info!("=== blockindex - Parse ===");

        let mut app_config = AppConfig::load().map_err(|e| AppError::Config(e.to_string()))?;
        if let Some(data_dir) = &self.data_dir {
            app_config.paths.data_dir = data_dir.clone();
        }
        if let Some(network) = &self.network {
            app_config.parser.network = network.clone();
        }

        let network = app_config.parser.network()?;
        let mut parser = ChainParser::open(&app_config.paths.data_dir, network)?
            .with_progress_interval(app_config.parser.progress_interval);

        let stats = match &self.blocks_file {
            Some(path) => {
                info!("Reading blocks from {}", path.display());
                parser.ingest_blocks(FileBlockSource::open(path)?, self.max_blocks)?
            }
            None => self.parse_from_rpc(&mut parser, &app_config).await?,
        };

        println!(
            "Parsed {} blocks ({} txes); chain now has {} blocks",
            stats.blocks,
            stats.transactions,
            parser.state().block_count
        );

        if !self.skip_indexes {
            let chain = Blockchain::from_database(parser.into_database());
            update_indexes(&chain, &app_config.paths.parser_dir())?;
        }
        Ok(())
    }

    async fn parse_from_rpc(
        &self,
        parser: &mut ChainParser,
        app_config: &AppConfig,
    ) -> AppResult<IngestStats> {
        let mut rpc_config = app_config.bitcoin_rpc.clone();
        if let Some(url) = &self.rpc_url {
            rpc_config.url = url.clone();
        }
        if let Some(username) = &self.rpc_username {
            rpc_config.username = username.clone();
        }
        if let Some(password) = &self.rpc_password {
            rpc_config.password = password.clone();
        }

        let client = BitcoinRpcClient::new(rpc_config).await?;
        let node_tip = client.get_block_count().await?;
        let start = parser.state().block_count as u64;
        if start > node_tip {
            info!("Already at node tip {}", node_tip);
            return Ok(IngestStats::default());
        }

        let mut end = node_tip;
        if let Some(max) = self.max_blocks {
            if max == 0 {
                return Ok(IngestStats::default());
            }
            end = end.min(start + max as u64 - 1);
        }
        info!("Fetching blocks {}..={} from RPC", start, end);

        let total = (end - start + 1) as usize;
        let mut tracker = ProgressTracker::start("RPC block ingestion", Some(total));
        let mut totals = IngestStats::default();
        for height in start..=end {
            let block = client.get_block_at_height(height).await?;
            totals.add(&parser.ingest_block(&block)?);
            tracker.update(totals.blocks, &totals)?;
        }
        tracker.finish(totals.blocks, &totals);

        if client.get_error_count() > 0 {
            info!("{} RPC attempts were retried", client.get_error_count());
        }
        Ok(totals)
    }
}
