use super::{Block, Blockchain, Input, Tx};
use crate::errors::AppResult;
use crate::types::{Address, AddressType, OutputRecord};
use serde::Serialize;
use std::fmt;

/// Field names of [`OutputSummary`], in serialization order
pub const OUTPUT_FIELDS: [&str; 10] = [
    "address",
    "address_type",
    "block",
    "index",
    "is_spent",
    "spending_tx",
    "spending_tx_index",
    "tx",
    "tx_index",
    "value",
];

/// Rendering used for absent optional values
const NONE: &str = "None";

/// A transaction output of the indexed chain
#[derive(Clone)]
pub struct Output<'a> {
    chain: &'a Blockchain,
    record: OutputRecord,
}

impl<'a> Output<'a> {
    pub(crate) fn new(chain: &'a Blockchain, record: OutputRecord) -> Self {
        Self { chain, record }
    }

    pub fn record(&self) -> &OutputRecord {
        &self.record
    }

    pub fn address(&self) -> AppResult<Address> {
        self.chain
            .address(self.record.address_type, self.record.script_num)
    }

    pub fn address_type(&self) -> AddressType {
        self.record.address_type
    }

    /// Block containing the creating transaction
    pub fn block(&self) -> AppResult<Block<'a>> {
        self.tx()?.block()
    }

    /// Position within the creating transaction (vout)
    pub fn index(&self) -> u32 {
        self.record.index
    }

    pub fn is_spent(&self) -> bool {
        self.record.is_spent()
    }

    pub fn spending_tx(&self) -> AppResult<Option<Tx<'a>>> {
        self.record
            .spending_tx_index
            .map(|index| self.chain.tx(index))
            .transpose()
    }

    pub fn spending_tx_index(&self) -> Option<u32> {
        self.record.spending_tx_index
    }

    /// Input that consumes this output, if spent
    pub fn spending_input(&self) -> AppResult<Option<Input<'a>>> {
        let Some(vin) = self.record.spending_input_index else {
            return Ok(None);
        };
        let Some(tx) = self.spending_tx()? else {
            return Ok(None);
        };
        Ok(tx.inputs()?.into_iter().find(|input| input.index() == vin))
    }

    /// Creating transaction
    pub fn tx(&self) -> AppResult<Tx<'a>> {
        self.chain.tx(self.record.tx_index)
    }

    pub fn tx_index(&self) -> u32 {
        self.record.tx_index
    }

    /// Satoshis
    pub fn value(&self) -> u64 {
        self.record.value
    }

    /// Resolve every field into its printable form
    pub fn summary(&self) -> AppResult<OutputSummary> {
        Ok(OutputSummary {
            address: self.address()?.to_string(),
            address_type: self.address_type().to_string(),
            block: self.block()?.to_string(),
            index: self.index().to_string(),
            is_spent: self.is_spent().to_string(),
            spending_tx: self
                .spending_tx()?
                .map(|tx| tx.to_string())
                .unwrap_or_else(|| NONE.to_string()),
            spending_tx_index: self
                .spending_tx_index()
                .map(|i| i.to_string())
                .unwrap_or_else(|| NONE.to_string()),
            tx: self.tx()?.to_string(),
            tx_index: self.tx_index().to_string(),
            value: self.value().to_string(),
        })
    }
}

impl PartialEq for Output<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.record == other.record
    }
}

impl fmt::Debug for Output<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Output").field(&self.record).finish()
    }
}

impl fmt::Display for Output<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spending = self
            .record
            .spending_tx_index
            .map(|i| i.to_string())
            .unwrap_or_else(|| NONE.to_string());
        write!(
            f,
            "TxOut(spending_tx_index={}, address_type={}, value={})",
            spending, self.record.address_type, self.record.value
        )
    }
}

/// The ten printable fields of an output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSummary {
    pub address: String,
    pub address_type: String,
    pub block: String,
    pub index: String,
    pub is_spent: String,
    pub spending_tx: String,
    pub spending_tx_index: String,
    pub tx: String,
    pub tx_index: String,
    pub value: String,
}

impl OutputSummary {
    /// Fields in the fixed order of [`OUTPUT_FIELDS`]
    pub fn lines(&self) -> [&str; 10] {
        [
            &self.address,
            &self.address_type,
            &self.block,
            &self.index,
            &self.is_spent,
            &self.spending_tx,
            &self.spending_tx_index,
            &self.tx,
            &self.tx_index,
            &self.value,
        ]
    }
}
