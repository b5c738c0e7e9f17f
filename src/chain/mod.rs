//! Read API over an indexed chain
//!
//! [`Blockchain`] owns the database; [`Block`], [`Tx`], [`Output`] and
//! [`Input`] are lightweight views that borrow it and resolve their
//! cross-references on demand. Every resolution returns `AppResult` so a
//! missing row surfaces as a [`ChainError`] instead of a panic.

mod block;
mod input;
mod output;
mod tx;

pub use block::Block;
pub use input::Input;
pub use output::{Output, OutputSummary, OUTPUT_FIELDS};
pub use tx::Tx;

use crate::database::{ChainReadOperations, Database, IndexOperations};
use crate::errors::{AppResult, ChainError};
use crate::types::{Address, AddressType, ChainState, EquivAddressType, ScriptRecord};
use std::path::Path;
use tracing::debug;

pub struct Blockchain {
    db: Database,
}

impl Blockchain {
    /// Open the chain stored in `data_dir`
    pub fn open(data_dir: &Path) -> AppResult<Self> {
        Ok(Self {
            db: Database::open_in_dir(data_dir)?,
        })
    }

    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn state(&self) -> AppResult<ChainState> {
        self.db.get_chain_state()
    }

    pub fn block_count(&self) -> AppResult<u32> {
        Ok(self.state()?.block_count)
    }

    pub fn tx_count(&self) -> AppResult<u32> {
        Ok(self.state()?.tx_count)
    }

    pub fn block(&self, height: u32) -> AppResult<Block<'_>> {
        let record = self
            .db
            .get_block(height)?
            .ok_or(ChainError::BlockNotFound { height })?;
        Ok(Block::new(self, record))
    }

    /// Highest indexed block
    pub fn tip(&self) -> AppResult<Option<Block<'_>>> {
        Ok(self.db.get_tip()?.map(|record| Block::new(self, record)))
    }

    /// Blocks in height order
    pub fn blocks(&self) -> AppResult<Vec<Block<'_>>> {
        (0..self.block_count()?).map(|h| self.block(h)).collect()
    }

    pub fn tx(&self, tx_index: u32) -> AppResult<Tx<'_>> {
        let record = self
            .db
            .get_tx(tx_index)?
            .ok_or(ChainError::TransactionIndexOutOfRange { tx_index })?;
        Ok(Tx::new(self, record))
    }

    /// Look up a transaction by its hex txid
    pub fn tx_with_hash(&self, txid: &str) -> AppResult<Tx<'_>> {
        let normalised = txid.trim().to_ascii_lowercase();
        if normalised.len() != 64 || hex::decode(&normalised).is_err() {
            return Err(ChainError::InvalidTxid {
                txid: txid.to_string(),
            }
            .into());
        }

        let record = self
            .db
            .get_tx_by_hash(&normalised)?
            .ok_or_else(|| ChainError::TransactionNotFound {
                txid: normalised.clone(),
            })?;
        debug!("Resolved {} to tx #{}", normalised, record.tx_index);
        Ok(Tx::new(self, record))
    }

    /// Address of a numbered script as seen with `address_type`
    pub fn address(&self, address_type: AddressType, script_num: u32) -> AppResult<Address> {
        let equiv_type = address_type.equiv_type();
        self.db
            .get_address(equiv_type, script_num, address_type)?
            .ok_or_else(|| {
                ChainError::ScriptNotFound {
                    equiv_type: equiv_type.to_string(),
                    script_num,
                }
                .into()
            })
    }

    /// Find a known address from its human-readable encoding
    pub fn address_from_string(&self, encoded: &str) -> AppResult<Address> {
        self.db.get_address_by_encoding(encoded)?.ok_or_else(|| {
            ChainError::AddressNotFound {
                address: encoded.to_string(),
            }
            .into()
        })
    }

    pub fn script(&self, equiv_type: EquivAddressType, script_num: u32) -> AppResult<ScriptRecord> {
        self.db.get_script(equiv_type, script_num)?.ok_or_else(|| {
            ChainError::ScriptNotFound {
                equiv_type: equiv_type.to_string(),
                script_num,
            }
            .into()
        })
    }

    /// Outputs paying exactly this address (same type), in chain order
    ///
    /// Requires the address index to be up to date.
    pub fn outputs_for_address(&self, address: &Address) -> AppResult<Vec<Output<'_>>> {
        let records = self.db.get_address_outputs(
            address.equiv_type(),
            address.script_num,
            Some(address.address_type),
        )?;
        Ok(records
            .into_iter()
            .map(|record| Output::new(self, record))
            .collect())
    }

    /// Outputs paying any address equivalent to this one (e.g. P2PKH and
    /// P2WPKH of the same key)
    pub fn equiv_outputs(&self, address: &Address) -> AppResult<Vec<Output<'_>>> {
        let records =
            self.db
                .get_address_outputs(address.equiv_type(), address.script_num, None)?;
        Ok(records
            .into_iter()
            .map(|record| Output::new(self, record))
            .collect())
    }

    /// Resolve a P2SH hash160 or P2WSH sha256 (hex) to its address
    ///
    /// Requires the script-hash index to be up to date.
    pub fn script_with_hash(&self, hash_hex: &str) -> AppResult<Address> {
        let normalised = hash_hex.to_ascii_lowercase();
        let (address_type, script_num) =
            self.db
                .get_script_hash(&normalised)?
                .ok_or_else(|| ChainError::AddressNotFound {
                    address: hash_hex.to_string(),
                })?;
        self.address(address_type, script_num)
    }
}
