use super::{Blockchain, Tx};
use crate::database::ChainReadOperations;
use crate::errors::AppResult;
use crate::types::BlockRecord;
use chrono::{DateTime, Utc};
use std::fmt;

/// A block of the indexed chain
#[derive(Clone)]
pub struct Block<'a> {
    chain: &'a Blockchain,
    record: BlockRecord,
}

impl<'a> Block<'a> {
    pub(crate) fn new(chain: &'a Blockchain, record: BlockRecord) -> Self {
        Self { chain, record }
    }

    pub fn record(&self) -> &BlockRecord {
        &self.record
    }

    pub fn height(&self) -> u32 {
        self.record.height
    }

    pub fn hash(&self) -> &str {
        &self.record.hash
    }

    pub fn prev_hash(&self) -> &str {
        &self.record.prev_hash
    }

    pub fn timestamp(&self) -> u32 {
        self.record.timestamp
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.record.timestamp as i64, 0)
    }

    pub fn size_bytes(&self) -> u32 {
        self.record.size_bytes
    }

    pub fn tx_count(&self) -> u32 {
        self.record.tx_count
    }

    /// Transactions in block order
    pub fn txes(&self) -> AppResult<Vec<Tx<'a>>> {
        Ok(self
            .chain
            .database()
            .get_block_txs(self.record.height)?
            .into_iter()
            .map(|record| Tx::new(self.chain, record))
            .collect())
    }

    pub fn coinbase_tx(&self) -> AppResult<Tx<'a>> {
        self.chain.tx(self.record.first_tx_index)
    }

    pub fn prev_block(&self) -> AppResult<Option<Block<'a>>> {
        match self.record.height {
            0 => Ok(None),
            h => self.chain.block(h - 1).map(Some),
        }
    }
}

impl PartialEq for Block<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.record == other.record
    }
}

impl fmt::Debug for Block<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Block").field(&self.record).finish()
    }
}

impl fmt::Display for Block<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block(len(txes)={}, size_bytes={}, height={}, header_hash={})",
            self.record.tx_count, self.record.size_bytes, self.record.height, self.record.hash
        )
    }
}
