//! Block ingestion
//!
//! Each block is written inside one SQLite transaction: the block row, its
//! transactions with their inputs and outputs, newly numbered scripts, and
//! the updated [`ChainState`]. If anything fails the whole block is rolled
//! back and the in-memory state is left untouched.

use super::progress::{ProgressMetrics, ProgressTracker};
use crate::database::chain_ops::{
    find_script_num, insert_block, insert_input, insert_output, insert_script,
    insert_script_encoding, insert_tx, mark_output_spent, read_output, read_tip,
    read_tx_by_hash, write_chain_state,
};
use crate::database::{ChainReadOperations, Database};
use crate::errors::{AppResult, ChainError};
use crate::types::{
    classify_script, encode_address, script_key, BlockRecord, ChainState, InputRecord,
    OutputRecord, ScriptRecord, TxRecord,
};
use bitcoin::{Network, Transaction, TxOut};
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info, warn};

/// Totals of one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub blocks: usize,
    pub transactions: usize,
    pub inputs: usize,
    pub outputs: usize,
    pub new_scripts: usize,
}

impl ProgressMetrics for IngestStats {
    fn format_metrics(&self) -> String {
        format!(
            "Blocks: {} | Txes: {} | Outputs: {} | New scripts: {}",
            self.blocks, self.transactions, self.outputs, self.new_scripts
        )
    }
}

pub struct ChainParser {
    db: Database,
    network: Network,
    state: ChainState,
    progress_interval: usize,
}

impl ChainParser {
    /// Resume parsing from the state stored in `db`
    pub fn new(db: Database, network: Network) -> AppResult<Self> {
        let state = db.get_chain_state()?;
        info!(
            "Parser resuming at block {} (tx {})",
            state.block_count, state.tx_count
        );
        Ok(Self {
            db,
            network,
            state,
            progress_interval: 1000,
        })
    }

    /// Log a checkpoint every `interval` blocks during [`Self::ingest_blocks`]; 0 disables
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn open(data_dir: &Path, network: Network) -> AppResult<Self> {
        Self::new(Database::open_in_dir(data_dir)?, network)
    }

    pub fn state(&self) -> &ChainState {
        &self.state
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn into_database(self) -> Database {
        self.db
    }

    /// Append one block on top of the current tip
    pub fn ingest_block(&mut self, block: &bitcoin::Block) -> AppResult<IngestStats> {
        let hash = block.block_hash().to_string();
        let prev_hash = block.header.prev_blockhash.to_string();

        if let Some(tip) = read_tip(self.db.connection())? {
            if tip.hash != prev_hash {
                return Err(ChainError::Disconnected {
                    hash,
                    prev_hash,
                    tip: tip.hash,
                }
                .into());
            }
        }

        let network = self.network;
        let mut state = self.state.clone();
        let stats = self.db.execute_transaction(|conn| {
            let record = BlockRecord {
                height: state.block_count,
                hash,
                prev_hash,
                timestamp: block.header.time,
                first_tx_index: state.tx_count,
                tx_count: block.txdata.len() as u32,
                size_bytes: block.total_size() as u32,
            };
            insert_block(conn, &record)?;

            let mut stats = IngestStats {
                blocks: 1,
                ..Default::default()
            };
            for transaction in &block.txdata {
                ingest_transaction(
                    conn,
                    transaction,
                    record.height,
                    &mut state,
                    network,
                    &mut stats,
                )?;
            }

            state.block_count += 1;
            write_chain_state(conn, &state)?;
            debug!(
                "Block {} at height {}: {} txes",
                record.hash, record.height, record.tx_count
            );
            Ok(stats)
        })?;

        self.state = state;
        Ok(stats)
    }

    /// Ingest blocks in order until the source is exhausted or `max_blocks` is reached
    pub fn ingest_blocks<I>(&mut self, blocks: I, max_blocks: Option<usize>) -> AppResult<IngestStats>
    where
        I: IntoIterator<Item = AppResult<bitcoin::Block>>,
    {
        let mut tracker = ProgressTracker::start("Block ingestion", max_blocks);
        let mut totals = IngestStats::default();

        for block in blocks {
            if max_blocks.is_some_and(|max| totals.blocks >= max) {
                break;
            }
            let stats = self.ingest_block(&block?)?;
            totals.add(&stats);
            tracker.update(totals.blocks, &totals)?;
            if self.progress_interval > 0 && totals.blocks % self.progress_interval == 0 {
                info!(
                    "Ingested {} blocks, chain now has {} blocks and {} txes",
                    totals.blocks, self.state.block_count, self.state.tx_count
                );
            }
        }

        tracker.finish(totals.blocks, &totals);
        Ok(totals)
    }
}

impl IngestStats {
    pub fn add(&mut self, other: &IngestStats) {
        self.blocks += other.blocks;
        self.transactions += other.transactions;
        self.inputs += other.inputs;
        self.outputs += other.outputs;
        self.new_scripts += other.new_scripts;
    }
}

fn ingest_transaction(
    conn: &Connection,
    transaction: &Transaction,
    height: u32,
    state: &mut ChainState,
    network: Network,
    stats: &mut IngestStats,
) -> AppResult<()> {
    let tx_index = state.tx_count;
    let txid = transaction.compute_txid().to_string();
    let is_coinbase = transaction.is_coinbase();

    if let Some(earlier) = read_tx_by_hash(conn, &txid)? {
        warn!(
            "Duplicate txid {} at height {} (previously tx_index {})",
            txid, height, earlier.tx_index
        );
    }

    insert_tx(
        conn,
        &TxRecord {
            tx_index,
            txid: txid.clone(),
            block_height: height,
            version: transaction.version.0,
            locktime: transaction.lock_time.to_consensus_u32(),
            size_bytes: transaction.total_size() as u32,
            weight: transaction.weight().to_wu() as u32,
            input_count: if is_coinbase {
                0
            } else {
                transaction.input.len() as u32
            },
            output_count: transaction.output.len() as u32,
            is_coinbase,
        },
    )?;

    if !is_coinbase {
        for (vin, txin) in transaction.input.iter().enumerate() {
            let prev_txid = txin.previous_output.txid.to_string();
            let vout = txin.previous_output.vout;
            let missing = || ChainError::MissingPrevout {
                txid: prev_txid.clone(),
                vout,
                spending_txid: txid.clone(),
            };

            let prev_tx = read_tx_by_hash(conn, &prev_txid)?.ok_or_else(missing)?;
            let spent = read_output(conn, prev_tx.tx_index, vout)?.ok_or_else(missing)?;
            if let Some(spent_by) = spent.spending_tx_index {
                return Err(ChainError::DoubleSpend {
                    txid: prev_txid,
                    vout,
                    spent_by,
                }
                .into());
            }

            mark_output_spent(conn, prev_tx.tx_index, vout, tx_index, vin as u32)?;
            insert_input(
                conn,
                &InputRecord {
                    tx_index,
                    index: vin as u32,
                    spent_tx_index: prev_tx.tx_index,
                    spent_output_index: vout,
                    value: spent.value,
                    address_type: spent.address_type,
                    script_num: spent.script_num,
                    sequence: txin.sequence.0,
                },
            )?;
            stats.inputs += 1;
        }
    }

    for (vout, txout) in transaction.output.iter().enumerate() {
        let record = output_record(conn, txout, tx_index, vout as u32, state, network, stats)?;
        insert_output(conn, &record)?;
        stats.outputs += 1;
    }

    state.tx_count += 1;
    stats.transactions += 1;
    Ok(())
}

/// Classify an output and number its script, reusing the number of an identical key
fn output_record(
    conn: &Connection,
    txout: &TxOut,
    tx_index: u32,
    vout: u32,
    state: &mut ChainState,
    network: Network,
    stats: &mut IngestStats,
) -> AppResult<OutputRecord> {
    let script = txout.script_pubkey.as_script();
    let address_type = classify_script(script);
    let key = script_key(script, address_type);
    let key_hex = key.to_hex();

    let existing = match &key_hex {
        Some(key_hex) => find_script_num(conn, key.equiv_type, key_hex)?,
        None => None,
    };
    let script_num = match existing {
        Some(num) => num,
        None => {
            let num = state.next_script_num(key.equiv_type);
            insert_script(
                conn,
                &ScriptRecord {
                    equiv_type: key.equiv_type,
                    script_num: num,
                    address_type,
                    key_hex,
                    script_hex: hex::encode(script.as_bytes()),
                    first_tx_index: tx_index,
                },
            )?;
            stats.new_scripts += 1;
            num
        }
    };

    let encoded = encode_address(script, network);
    insert_script_encoding(
        conn,
        key.equiv_type,
        script_num,
        address_type,
        encoded.as_deref(),
    )?;

    Ok(OutputRecord {
        tx_index,
        index: vout,
        value: txout.value.to_sat(),
        address_type,
        script_num,
        spending_tx_index: None,
        spending_input_index: None,
    })
}
