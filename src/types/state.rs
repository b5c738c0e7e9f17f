//! Progress marker of the parser and of each secondary index

use super::address::EquivAddressType;
use crate::errors::AppResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// How far the chain (or an index) has been processed
///
/// Counts are exclusive upper bounds: `tx_count` transactions have indices
/// `0..tx_count`, and script numbers run `1..=script_counts[equiv]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainState {
    pub block_count: u32,
    pub tx_count: u32,
    #[serde(default)]
    pub script_counts: BTreeMap<EquivAddressType, u32>,
}

impl ChainState {
    pub fn script_count(&self, equiv_type: EquivAddressType) -> u32 {
        self.script_counts.get(&equiv_type).copied().unwrap_or(0)
    }

    /// Allocate the next script number in a family
    pub fn next_script_num(&mut self, equiv_type: EquivAddressType) -> u32 {
        let count = self.script_counts.entry(equiv_type).or_insert(0);
        *count += 1;
        *count
    }

    /// Load from a JSON file; a missing file is an empty state
    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
