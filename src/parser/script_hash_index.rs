use super::index::ParserIndex;
use crate::chain::{Blockchain, Tx};
use crate::database::IndexOperations;
use crate::errors::AppResult;
use crate::types::EquivAddressType;
use tracing::warn;

/// Maps P2SH hash160s and P2WSH sha256s to their script numbers
#[derive(Debug, Default)]
pub struct ScriptHashIndex;

impl ParserIndex for ScriptHashIndex {
    fn name(&self) -> &'static str {
        "script_hash_index"
    }

    fn process_tx(&mut self, _chain: &Blockchain, _tx: &Tx<'_>) -> AppResult<()> {
        Ok(())
    }

    fn processes_script(&self, equiv_type: EquivAddressType) -> bool {
        equiv_type == EquivAddressType::Scripthash
    }

    fn process_script(
        &mut self,
        chain: &Blockchain,
        equiv_type: EquivAddressType,
        script_num: u32,
    ) -> AppResult<()> {
        let script = chain.script(equiv_type, script_num)?;
        match &script.key_hex {
            Some(hash_hex) => {
                chain
                    .database()
                    .insert_script_hash(hash_hex, script.address_type, script_num)?;
            }
            None => warn!("Script {} #{} has no hash", equiv_type, script_num),
        }
        Ok(())
    }
}
