//! Bitcoin Core RPC block source
//!
//! - **Client** - block count, block hash and raw block fetches
//! - **Retry** - exponential backoff and timeout wrappers

pub mod client;
pub mod retry;

pub use client::{BitcoinRpcClient, NodeInfo};
pub use retry::{calculate_next_backoff, execute_with_timeout};
