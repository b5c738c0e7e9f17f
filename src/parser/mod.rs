//! Chain ingestion and incremental indexes
//!
//! - `processor`: appends blocks to the chain database
//! - `source`: block sources (hex block files)
//! - `index`: the [`ParserIndex`] trait and its [`IndexUpdater`]
//! - `address_index`, `script_hash_index`: the two built-in indexes
//! - `progress`: progress line and run summaries

pub mod address_index;
pub mod index;
pub mod processor;
pub mod progress;
pub mod script_hash_index;
pub mod source;

pub use address_index::AddressIndex;
pub use index::{IndexUpdater, ParserIndex, UpdateStats};
pub use processor::{ChainParser, IngestStats};
pub use script_hash_index::ScriptHashIndex;
pub use source::FileBlockSource;

use crate::chain::Blockchain;
use crate::errors::AppResult;
use std::path::Path;

/// Catch both built-in indexes up with the chain
pub fn update_indexes(chain: &Blockchain, parser_dir: &Path) -> AppResult<(UpdateStats, UpdateStats)> {
    let state = chain.state()?;

    let mut addresses = IndexUpdater::new(AddressIndex, parser_dir)?;
    let address_stats = addresses.run_update(chain, &state)?;

    let mut hashes = IndexUpdater::new(ScriptHashIndex, parser_dir)?;
    let hash_stats = hashes.run_update(chain, &state)?;

    Ok((address_stats, hash_stats))
}
