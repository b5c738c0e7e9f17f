//! Stored chain records
//!
//! These are the rows the parser writes and the read API loads. They carry
//! plain numbers only; the borrowed views in `crate::chain` resolve the
//! cross-references (block of a tx, spender of an output, and so on).

use super::address::{AddressType, EquivAddressType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub height: u32,
    pub hash: String,
    pub prev_hash: String,
    /// Header timestamp (unix seconds)
    pub timestamp: u32,
    pub first_tx_index: u32,
    pub tx_count: u32,
    pub size_bytes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRecord {
    /// Position of the transaction in the whole chain (0-based)
    pub tx_index: u32,
    pub txid: String,
    pub block_height: u32,
    pub version: i32,
    pub locktime: u32,
    pub size_bytes: u32,
    pub weight: u32,
    pub input_count: u32,
    pub output_count: u32,
    pub is_coinbase: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub tx_index: u32,
    /// vout
    pub index: u32,
    /// Satoshis
    pub value: u64,
    pub address_type: AddressType,
    pub script_num: u32,
    pub spending_tx_index: Option<u32>,
    pub spending_input_index: Option<u32>,
}

impl OutputRecord {
    pub fn is_spent(&self) -> bool {
        self.spending_tx_index.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub tx_index: u32,
    /// vin
    pub index: u32,
    pub spent_tx_index: u32,
    pub spent_output_index: u32,
    /// Value of the spent output (satoshis)
    pub value: u64,
    pub address_type: AddressType,
    pub script_num: u32,
    pub sequence: u32,
}

/// A numbered, deduplicated output script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRecord {
    pub equiv_type: EquivAddressType,
    pub script_num: u32,
    /// Type of the first output seen with this script
    pub address_type: AddressType,
    pub key_hex: Option<String>,
    pub script_hex: String,
    pub first_tx_index: u32,
}
