use crate::errors::{AppError, AppResult};
use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Application configuration loaded from config.toml or environment variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub parser: ParserConfig,
    pub bitcoin_rpc: BitcoinRpcConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the chain database
    pub data_dir: PathBuf,
    /// Directory holding per-index state files; defaults to `<data_dir>/parser`
    #[serde(default)]
    pub parser_dir: Option<PathBuf>,
}

impl PathsConfig {
    pub fn parser_dir(&self) -> PathBuf {
        self.parser_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("parser"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Network used when encoding addresses ("bitcoin", "testnet", "signet", "regtest")
    pub network: String,
    pub progress_interval: usize,
}

impl ParserConfig {
    pub fn network(&self) -> AppResult<bitcoin::Network> {
        bitcoin::Network::from_str(&self.network)
            .map_err(|e| AppError::Config(format!("Unknown network '{}': {}", self.network, e)))
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            network: "bitcoin".to_string(),
            progress_interval: 1000,
        }
    }
}

/// Bitcoin RPC configuration for fetching blocks from a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitcoinRpcConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub timeout_seconds: u64,
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_seconds: u64,
}

impl Default for BitcoinRpcConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8332".to_string(),
            username: "bitcoin".to_string(),
            password: "password".to_string(),
            timeout_seconds: 60,
            max_retries: 10,
            initial_backoff_ms: 100,
            backoff_multiplier: 2.0,
            max_backoff_seconds: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from config.toml file and environment variables
    /// Environment variables take precedence over file configuration
    pub fn load() -> Result<Self, ConfigError> {
        let rpc = BitcoinRpcConfig::default();
        let parser = ParserConfig::default();
        let config = Config::builder()
            .set_default("paths.data_dir", "./blockindex_data")?
            .set_default("parser.network", parser.network)?
            .set_default("parser.progress_interval", parser.progress_interval as i64)?
            .set_default("bitcoin_rpc.url", rpc.url)?
            .set_default("bitcoin_rpc.username", rpc.username)?
            .set_default("bitcoin_rpc.password", rpc.password)?
            .set_default("bitcoin_rpc.timeout_seconds", rpc.timeout_seconds)?
            .set_default("bitcoin_rpc.max_retries", rpc.max_retries as i64)?
            .set_default("bitcoin_rpc.initial_backoff_ms", rpc.initial_backoff_ms)?
            .set_default("bitcoin_rpc.backoff_multiplier", rpc.backoff_multiplier)?
            .set_default("bitcoin_rpc.max_backoff_seconds", rpc.max_backoff_seconds)?
            .add_source(File::with_name("config").required(false))
            // BLOCKINDEX_PARSER__NETWORK=regtest etc.
            .add_source(
                config::Environment::with_prefix("BLOCKINDEX")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;

        if let Ok(data_dir) = env::var("BLOCKINDEX_DATA_DIR") {
            app_config.paths.data_dir = PathBuf::from(data_dir);
        }

        Ok(app_config)
    }

    /// Defaults for when no config file or environment is available
    pub fn get_defaults() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(_) => Self {
                paths: PathsConfig {
                    data_dir: PathBuf::from("./blockindex_data"),
                    parser_dir: None,
                },
                parser: ParserConfig::default(),
                bitcoin_rpc: BitcoinRpcConfig::default(),
            },
        }
    }
}
