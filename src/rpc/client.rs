use crate::config::BitcoinRpcConfig;
use crate::errors::{RpcError, RpcResult};
use crate::rpc::{calculate_next_backoff, execute_with_timeout};
use bitcoin::consensus::encode::deserialize_hex;
use bitcoin::{Block, BlockHash};
use corepc_client::client_sync::{v28::Client, Auth};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Summary of the node's view of the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub chain: String,
    pub blocks: u64,
}

/// Bitcoin Core block fetcher with retry and per-call timeouts
///
/// The underlying corepc client is synchronous, so every call runs on the
/// blocking pool under [`execute_with_timeout`].
pub struct BitcoinRpcClient {
    client: Arc<Client>,
    config: BitcoinRpcConfig,
    error_count: Arc<AtomicU64>,
}

impl BitcoinRpcClient {
    /// Create the client and check that the node answers
    pub async fn new(config: BitcoinRpcConfig) -> RpcResult<Self> {
        let client = Self::create_sync_client(&config)?;
        let rpc = Self {
            client,
            config,
            error_count: Arc::new(AtomicU64::new(0)),
        };

        let info = rpc.test_connection().await.map_err(|e| {
            RpcError::ConnectionFailed(format!(
                "Failed to connect to Bitcoin RPC - check URL, credentials, and that Bitcoin Core is running: {}",
                e
            ))
        })?;
        info!(
            "Bitcoin RPC connection established ({} at height {})",
            info.chain, info.blocks
        );
        Ok(rpc)
    }

    /// Query `getblockchaininfo`
    pub async fn test_connection(&self) -> RpcResult<NodeInfo> {
        self.call_with_retry("get_blockchain_info", |client| {
            let info = client
                .get_blockchain_info()
                .map_err(|e| call_failed("get_blockchain_info", e))?;
            Ok(NodeInfo {
                chain: info.chain,
                blocks: info.blocks as u64,
            })
        })
        .await
    }

    /// Height of the node's tip
    pub async fn get_block_count(&self) -> RpcResult<u64> {
        self.call_with_retry("get_block_count", |client| {
            Ok(client
                .get_block_count()
                .map_err(|e| call_failed("get_block_count", e))?
                .0)
        })
        .await
    }

    pub async fn get_block_hash(&self, height: u64) -> RpcResult<BlockHash> {
        self.call_with_retry(&format!("get_block_hash({})", height), move |client| {
            let hash = client.get_block_hash(height).map_err(|e| {
                let message = e.to_string();
                if message.contains("Block height out of range") {
                    RpcError::BlockNotFound { height }
                } else {
                    call_failed("get_block_hash", message)
                }
            })?;
            BlockHash::from_str(&hash.0).map_err(|e| {
                RpcError::DeserialisationFailed(format!("Invalid block hash '{}': {}", hash.0, e))
            })
        })
        .await
    }

    /// Fetch and decode the raw block at `hash`
    pub async fn get_block(&self, hash: BlockHash) -> RpcResult<Block> {
        self.call_with_retry(&format!("get_block({})", hash), move |client| {
            let raw = client
                .get_block_verbose_zero(hash)
                .map_err(|e| call_failed("get_block_verbose_zero", e))?;
            deserialize_hex::<Block>(&raw.0).map_err(|e| {
                RpcError::DeserialisationFailed(format!("Failed to deserialise block {}: {}", hash, e))
            })
        })
        .await
    }

    pub async fn get_block_at_height(&self, height: u64) -> RpcResult<Block> {
        let hash = self.get_block_hash(height).await?;
        self.get_block(hash).await
    }

    /// Failed attempts across all calls so far
    pub fn get_error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    fn create_sync_client(config: &BitcoinRpcConfig) -> RpcResult<Arc<Client>> {
        let auth = Auth::UserPass(config.username.clone(), config.password.clone());
        let client = Client::new_with_auth(&config.url, auth).map_err(|e| {
            RpcError::ConnectionFailed(format!("Failed to create Bitcoin RPC client: {}", e))
        })?;

        Ok(Arc::new(client))
    }

    /// Run `call` on the blocking pool, retrying call failures and timeouts
    /// with exponential backoff. `BlockNotFound` is returned immediately.
    async fn call_with_retry<T, F>(&self, operation: &str, call: F) -> RpcResult<T>
    where
        T: Send + 'static,
        F: Fn(&Client) -> RpcResult<T> + Send + Sync + Clone + 'static,
    {
        let mut attempts = 0;
        let mut backoff = Duration::from_millis(self.config.initial_backoff_ms);

        loop {
            let client = Arc::clone(&self.client);
            let call = call.clone();

            let failure = match execute_with_timeout(self.config.timeout_seconds, move || {
                call(&client)
            })
            .await
            {
                Ok(Ok(Ok(value))) => {
                    if attempts > 0 {
                        debug!("{} succeeded after {} attempts", operation, attempts + 1);
                    }
                    return Ok(value);
                }
                Ok(Ok(Err(e @ RpcError::BlockNotFound { .. }))) => return Err(e),
                Ok(Ok(Err(e))) => e.to_string(),
                Ok(Err(e)) => {
                    self.error_count.fetch_add(1, Ordering::Relaxed);
                    error!("Spawn blocking error for {}: {}", operation, e);
                    return Err(RpcError::CallFailed {
                        method: "spawn_blocking".to_string(),
                        message: format!("Task execution error: {}", e),
                    });
                }
                Err(_) => format!("timed out after {}s", self.config.timeout_seconds),
            };

            attempts += 1;
            self.error_count.fetch_add(1, Ordering::Relaxed);

            if attempts >= self.config.max_retries {
                error!("{} failed after {} attempts: {}", operation, attempts, failure);
                return Err(RpcError::MaxRetriesExceeded {
                    operation: operation.to_string(),
                });
            }

            warn!(
                "RPC attempt {} failed for {}, retrying in {:?}: {}",
                attempts, operation, backoff, failure
            );
            sleep(backoff).await;
            backoff = calculate_next_backoff(
                backoff,
                self.config.backoff_multiplier,
                self.config.max_backoff_seconds,
            );
        }
    }
}

fn call_failed(method: &str, error: impl ToString) -> RpcError {
    RpcError::CallFailed {
        method: method.to_string(),
        message: error.to_string(),
    }
}
