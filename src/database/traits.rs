//! Database trait abstractions
//!
//! Read operations are traits on [`super::Database`]. Block ingestion writes
//! go through the free functions in `chain_ops`, which take a connection so
//! they can run inside one SQLite transaction per block.

use crate::errors::AppResult;
use crate::types::{
    Address, AddressType, BlockRecord, ChainState, EquivAddressType, InputRecord, OutputRecord,
    ScriptRecord, TxRecord,
};

/// Read access to the parsed chain
pub trait ChainReadOperations {
    /// Current parser progress (empty state for a fresh database)
    fn get_chain_state(&self) -> AppResult<ChainState>;

    fn get_block(&self, height: u32) -> AppResult<Option<BlockRecord>>;

    /// Highest block, if any
    fn get_tip(&self) -> AppResult<Option<BlockRecord>>;

    fn get_tx(&self, tx_index: u32) -> AppResult<Option<TxRecord>>;

    fn get_tx_by_hash(&self, txid: &str) -> AppResult<Option<TxRecord>>;

    /// Transactions of a block in chain order
    fn get_block_txs(&self, height: u32) -> AppResult<Vec<TxRecord>>;

    /// Outputs of a transaction in vout order
    fn get_outputs(&self, tx_index: u32) -> AppResult<Vec<OutputRecord>>;

    fn get_output(&self, tx_index: u32, vout: u32) -> AppResult<Option<OutputRecord>>;

    /// Inputs of a transaction in vin order
    fn get_inputs(&self, tx_index: u32) -> AppResult<Vec<InputRecord>>;

    fn get_script(
        &self,
        equiv_type: EquivAddressType,
        script_num: u32,
    ) -> AppResult<Option<ScriptRecord>>;

    /// Address of a script as seen with a specific output type
    fn get_address(
        &self,
        equiv_type: EquivAddressType,
        script_num: u32,
        address_type: AddressType,
    ) -> AppResult<Option<Address>>;

    fn get_address_by_encoding(&self, encoded: &str) -> AppResult<Option<Address>>;
}

/// Secondary index tables maintained by the index updaters
pub trait IndexOperations {
    fn insert_address_output(&self, output: &OutputRecord) -> AppResult<()>;

    /// Outputs paying a script, optionally restricted to one address type
    fn get_address_outputs(
        &self,
        equiv_type: EquivAddressType,
        script_num: u32,
        address_type: Option<AddressType>,
    ) -> AppResult<Vec<OutputRecord>>;

    fn insert_script_hash(
        &self,
        hash_hex: &str,
        address_type: AddressType,
        script_num: u32,
    ) -> AppResult<()>;

    fn get_script_hash(&self, hash_hex: &str) -> AppResult<Option<(AddressType, u32)>>;
}
