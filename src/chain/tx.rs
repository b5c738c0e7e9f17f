use super::{Block, Blockchain, Input, Output};
use crate::database::ChainReadOperations;
use crate::errors::{AppResult, ChainError};
use crate::types::TxRecord;
use std::fmt;

/// A transaction of the indexed chain
#[derive(Clone)]
pub struct Tx<'a> {
    chain: &'a Blockchain,
    record: TxRecord,
}

impl<'a> Tx<'a> {
    pub(crate) fn new(chain: &'a Blockchain, record: TxRecord) -> Self {
        Self { chain, record }
    }

    pub fn record(&self) -> &TxRecord {
        &self.record
    }

    pub fn hash(&self) -> &str {
        &self.record.txid
    }

    /// Position in the whole chain
    pub fn index(&self) -> u32 {
        self.record.tx_index
    }

    pub fn block_height(&self) -> u32 {
        self.record.block_height
    }

    pub fn block(&self) -> AppResult<Block<'a>> {
        self.chain.block(self.record.block_height)
    }

    pub fn is_coinbase(&self) -> bool {
        self.record.is_coinbase
    }

    pub fn version(&self) -> i32 {
        self.record.version
    }

    pub fn locktime(&self) -> u32 {
        self.record.locktime
    }

    pub fn size_bytes(&self) -> u32 {
        self.record.size_bytes
    }

    pub fn weight(&self) -> u32 {
        self.record.weight
    }

    /// Outputs in vout order
    pub fn outputs(&self) -> AppResult<Vec<Output<'a>>> {
        Ok(self
            .chain
            .database()
            .get_outputs(self.record.tx_index)?
            .into_iter()
            .map(|record| Output::new(self.chain, record))
            .collect())
    }

    pub fn output(&self, index: u32) -> AppResult<Output<'a>> {
        let record = self
            .chain
            .database()
            .get_output(self.record.tx_index, index)?
            .ok_or(ChainError::OutputNotFound {
                tx_index: self.record.tx_index,
                index,
            })?;
        Ok(Output::new(self.chain, record))
    }

    /// Inputs in vin order (empty for coinbase transactions)
    pub fn inputs(&self) -> AppResult<Vec<Input<'a>>> {
        Ok(self
            .chain
            .database()
            .get_inputs(self.record.tx_index)?
            .into_iter()
            .map(|record| Input::new(self.chain, record))
            .collect())
    }

    pub fn output_value(&self) -> AppResult<u64> {
        Ok(self.outputs()?.iter().map(|o| o.value()).sum())
    }

    pub fn input_value(&self) -> AppResult<u64> {
        Ok(self.inputs()?.iter().map(|i| i.value()).sum())
    }

    /// Miner fee; zero for coinbase transactions
    pub fn fee(&self) -> AppResult<u64> {
        if self.is_coinbase() {
            return Ok(0);
        }
        Ok(self.input_value()?.saturating_sub(self.output_value()?))
    }
}

impl PartialEq for Tx<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.record == other.record
    }
}

impl fmt::Debug for Tx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tx").field(&self.record).finish()
    }
}

impl fmt::Display for Tx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tx(len(txins)={}, len(txouts)={}, size_bytes={}, block_height={}, tx_index={})",
            self.record.input_count,
            self.record.output_count,
            self.record.size_bytes,
            self.record.block_height,
            self.record.tx_index
        )
    }
}
