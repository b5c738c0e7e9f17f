use super::index::ParserIndex;
use crate::chain::{Blockchain, Tx};
use crate::database::IndexOperations;
use crate::errors::AppResult;

/// Maps each output to the script it pays, for address lookups
#[derive(Debug, Default)]
pub struct AddressIndex;

impl ParserIndex for AddressIndex {
    fn name(&self) -> &'static str {
        "address_index"
    }

    fn process_tx(&mut self, chain: &Blockchain, tx: &Tx<'_>) -> AppResult<()> {
        for output in tx.outputs()? {
            chain.database().insert_address_output(output.record())?;
        }
        Ok(())
    }
}
