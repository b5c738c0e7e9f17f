use thiserror::Error;

/// Application-wide error type - single point of truth
#[derive(Error, Debug)]
pub enum AppError {
    /// Database operations
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Bitcoin RPC operations
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Chain lookups and block ingestion
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    /// File I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration issues
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation/parsing
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Errors raised while resolving or extending the indexed chain
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChainError {
    /// Hash is well-formed but not present in the index
    #[error("Transaction not found: {txid}")]
    TransactionNotFound { txid: String },

    /// Hash string is not 64 hex characters
    #[error("Invalid txid: {txid}")]
    InvalidTxid { txid: String },

    /// No transaction at this position
    #[error("Transaction index out of range: {tx_index}")]
    TransactionIndexOutOfRange { tx_index: u32 },

    #[error("Block not found at height {height}")]
    BlockNotFound { height: u32 },

    #[error("Output not found: {tx_index}:{index}")]
    OutputNotFound { tx_index: u32, index: u32 },

    #[error("Script not found: {equiv_type} #{script_num}")]
    ScriptNotFound { equiv_type: String, script_num: u32 },

    #[error("Address not found: {address}")]
    AddressNotFound { address: String },

    /// Input refers to an outpoint the index has never seen
    #[error("Missing prevout {txid}:{vout} spent by {spending_txid}")]
    MissingPrevout {
        txid: String,
        vout: u32,
        spending_txid: String,
    },

    /// Outpoint was already consumed by an earlier transaction
    #[error("Double spend of {txid}:{vout} (already spent by tx #{spent_by})")]
    DoubleSpend {
        txid: String,
        vout: u32,
        spent_by: u32,
    },

    /// Block does not build on the current tip
    #[error("Block {hash} does not connect to tip {tip} (prev {prev_hash})")]
    Disconnected {
        hash: String,
        prev_hash: String,
        tip: String,
    },
}

/// RPC error types
#[derive(Error, Debug)]
pub enum RpcError {
    /// Failed to establish connection to Bitcoin Core RPC server
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// RPC method call failed (covers network errors, authentication, etc.)
    #[error("RPC call failed: {method} - {message}")]
    CallFailed { method: String, message: String },

    /// Failed to deserialise RPC response data
    #[error("Deserialisation failed: {0}")]
    DeserialisationFailed(String),

    /// Retry limit exceeded for RPC operation
    #[error("Max retries exceeded: {operation}")]
    MaxRetriesExceeded { operation: String },

    /// RPC request timed out
    #[error("Request timeout: {timeout_seconds}s for {operation}")]
    Timeout {
        timeout_seconds: u64,
        operation: String,
    },

    /// Block height beyond the node's tip
    #[error("Block not found at height {height}")]
    BlockNotFound { height: u64 },
}

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

/// Result type for RPC operations
pub type RpcResult<T> = Result<T, RpcError>;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidData(format!("JSON error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<bitcoin::consensus::encode::Error> for AppError {
    fn from(err: bitcoin::consensus::encode::Error) -> Self {
        AppError::InvalidData(format!("Consensus decode error: {}", err))
    }
}

impl From<hex::FromHexError> for AppError {
    fn from(err: hex::FromHexError) -> Self {
        AppError::InvalidData(format!("Hex decode error: {}", err))
    }
}
