//! Incremental secondary indexes
//!
//! An index remembers the [`ChainState`] it last caught up to, persisted as
//! `<parser_dir>/<name>.json`. Each update feeds it only what the parser has
//! added since: transactions `[latest.tx_count, state.tx_count)` and, for the
//! families it cares about, script numbers `(latest, current]`.

use super::progress::{ProgressMetrics, ProgressTracker};
use crate::chain::{Blockchain, Tx};
use crate::errors::AppResult;
use crate::types::{ChainState, EquivAddressType};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub trait ParserIndex {
    /// Stable name, also used for the state file
    fn name(&self) -> &'static str;

    fn process_tx(&mut self, chain: &Blockchain, tx: &Tx<'_>) -> AppResult<()>;

    fn processes_script(&self, _equiv_type: EquivAddressType) -> bool {
        false
    }

    fn process_script(
        &mut self,
        _chain: &Blockchain,
        _equiv_type: EquivAddressType,
        _script_num: u32,
    ) -> AppResult<()> {
        Ok(())
    }
}

/// Work done by one [`IndexUpdater::run_update`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateStats {
    pub transactions: usize,
    pub scripts: usize,
}

impl ProgressMetrics for UpdateStats {
    fn format_metrics(&self) -> String {
        format!("Txes: {} | Scripts: {}", self.transactions, self.scripts)
    }
}

pub struct IndexUpdater<I: ParserIndex> {
    index: I,
    state_path: PathBuf,
    latest: ChainState,
}

impl<I: ParserIndex> IndexUpdater<I> {
    pub fn new(index: I, parser_dir: &Path) -> AppResult<Self> {
        let state_path = parser_dir.join(format!("{}.json", index.name()));
        let latest = ChainState::load_from(&state_path)?;
        debug!(
            "Index {} last updated at tx {}",
            index.name(),
            latest.tx_count
        );
        Ok(Self {
            index,
            state_path,
            latest,
        })
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    /// State the index has caught up to
    pub fn latest(&self) -> &ChainState {
        &self.latest
    }

    /// Bring the index up to `state`, then persist the new marker
    pub fn run_update(&mut self, chain: &Blockchain, state: &ChainState) -> AppResult<UpdateStats> {
        let mut stats = UpdateStats::default();
        if *state == self.latest {
            debug!("Index {} already up to date", self.index.name());
            return Ok(stats);
        }

        let pending = state.tx_count.saturating_sub(self.latest.tx_count) as usize;
        let operation = format!("Index update ({})", self.index.name());
        let mut tracker = ProgressTracker::start(&operation, Some(pending));

        // One SQLite transaction for the whole batch of index rows
        let batch = chain.database().connection().unchecked_transaction()?;

        for tx_index in self.latest.tx_count..state.tx_count {
            let tx = chain.tx(tx_index)?;
            self.index.process_tx(chain, &tx)?;
            stats.transactions += 1;
            tracker.update(stats.transactions, &stats)?;
        }

        for equiv_type in EquivAddressType::ALL {
            if !self.index.processes_script(equiv_type) {
                continue;
            }
            let first = self.latest.script_count(equiv_type) + 1;
            for script_num in first..=state.script_count(equiv_type) {
                self.index.process_script(chain, equiv_type, script_num)?;
                stats.scripts += 1;
            }
        }

        batch.commit()?;
        tracker.finish(stats.transactions, &stats);

        self.latest = state.clone();
        self.latest.save_to(&self.state_path)?;
        info!(
            "Index {} now at block {} (tx {})",
            self.index.name(),
            self.latest.block_count,
            self.latest.tx_count
        );
        Ok(stats)
    }
}
