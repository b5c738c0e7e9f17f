use super::{Blockchain, Output, Tx};
use crate::errors::AppResult;
use crate::types::{Address, AddressType, InputRecord};
use std::fmt;

/// A transaction input of the indexed chain
#[derive(Clone)]
pub struct Input<'a> {
    chain: &'a Blockchain,
    record: InputRecord,
}

impl<'a> Input<'a> {
    pub(crate) fn new(chain: &'a Blockchain, record: InputRecord) -> Self {
        Self { chain, record }
    }

    pub fn record(&self) -> &InputRecord {
        &self.record
    }

    /// Position within the spending transaction (vin)
    pub fn index(&self) -> u32 {
        self.record.index
    }

    pub fn tx(&self) -> AppResult<Tx<'a>> {
        self.chain.tx(self.record.tx_index)
    }

    pub fn tx_index(&self) -> u32 {
        self.record.tx_index
    }

    /// Transaction that created the spent output
    pub fn spent_tx(&self) -> AppResult<Tx<'a>> {
        self.chain.tx(self.record.spent_tx_index)
    }

    pub fn spent_tx_index(&self) -> u32 {
        self.record.spent_tx_index
    }

    pub fn spent_output(&self) -> AppResult<Output<'a>> {
        self.spent_tx()?.output(self.record.spent_output_index)
    }

    /// Value of the spent output (satoshis)
    pub fn value(&self) -> u64 {
        self.record.value
    }

    pub fn address_type(&self) -> AddressType {
        self.record.address_type
    }

    pub fn address(&self) -> AppResult<Address> {
        self.chain
            .address(self.record.address_type, self.record.script_num)
    }

    pub fn sequence(&self) -> u32 {
        self.record.sequence
    }
}

impl PartialEq for Input<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.record == other.record
    }
}

impl fmt::Debug for Input<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Input").field(&self.record).finish()
    }
}

impl fmt::Display for Input<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TxIn(spent_tx_index={}, address_type={}, value={})",
            self.record.spent_tx_index, self.record.address_type, self.record.value
        )
    }
}
