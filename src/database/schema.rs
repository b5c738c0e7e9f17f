//! Chain index schema
//!
//! ## Tables
//!
//! - `blocks`, `transactions`, `outputs`, `inputs`: the parsed chain. Spends
//!   are recorded on the output row (`spending_tx_index`, `spending_input_index`)
//!   so that `is_spent` is a column read, not a join.
//! - `scripts`: one row per numbered script, unique per `(equiv_type, key_hex)`.
//! - `script_encodings`: human-readable address of each (script, type) pair.
//! - `chain_state`: single-row JSON progress marker written with every block.
//! - `address_outputs`, `script_hashes`: secondary indexes maintained by the
//!   incremental index updaters, not by block ingestion.

use crate::errors::AppResult;
use rusqlite::Connection;
use tracing::debug;

pub const SCHEMA_VERSION: i64 = 1;

/// Create all tables and indexes if they do not exist yet
pub fn setup_schema(connection: &Connection) -> AppResult<()> {
    connection.execute_batch(
        r#"
        PRAGMA user_version = 1;
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS blocks (
            height INTEGER PRIMARY KEY,
            block_hash TEXT NOT NULL UNIQUE,
            prev_hash TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            first_tx_index INTEGER NOT NULL,
            tx_count INTEGER NOT NULL,
            size_bytes INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS transactions (
            tx_index INTEGER PRIMARY KEY,
            txid TEXT NOT NULL,
            block_height INTEGER NOT NULL REFERENCES blocks(height),
            version INTEGER NOT NULL,
            locktime INTEGER NOT NULL,
            size_bytes INTEGER NOT NULL,
            weight INTEGER NOT NULL,
            input_count INTEGER NOT NULL,
            output_count INTEGER NOT NULL,
            is_coinbase BOOLEAN NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transactions_block ON transactions(block_height);
        CREATE INDEX IF NOT EXISTS idx_transactions_txid ON transactions(txid);

        CREATE TABLE IF NOT EXISTS outputs (
            tx_index INTEGER NOT NULL REFERENCES transactions(tx_index),
            vout INTEGER NOT NULL,
            value INTEGER NOT NULL,
            address_type TEXT NOT NULL,
            script_num INTEGER NOT NULL,
            spending_tx_index INTEGER,
            spending_input_index INTEGER,
            PRIMARY KEY (tx_index, vout)
        );

        CREATE TABLE IF NOT EXISTS inputs (
            tx_index INTEGER NOT NULL REFERENCES transactions(tx_index),
            vin INTEGER NOT NULL,
            spent_tx_index INTEGER NOT NULL,
            spent_output_index INTEGER NOT NULL,
            value INTEGER NOT NULL,
            address_type TEXT NOT NULL,
            script_num INTEGER NOT NULL,
            sequence INTEGER NOT NULL,
            PRIMARY KEY (tx_index, vin)
        );

        CREATE TABLE IF NOT EXISTS scripts (
            equiv_type TEXT NOT NULL,
            script_num INTEGER NOT NULL,
            address_type TEXT NOT NULL,
            key_hex TEXT,
            script_hex TEXT NOT NULL,
            first_tx_index INTEGER NOT NULL,
            PRIMARY KEY (equiv_type, script_num)
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_scripts_key ON scripts(equiv_type, key_hex)
            WHERE key_hex IS NOT NULL;

        -- One row per (script, address type) actually seen on chain
        CREATE TABLE IF NOT EXISTS script_encodings (
            equiv_type TEXT NOT NULL,
            script_num INTEGER NOT NULL,
            address_type TEXT NOT NULL,
            encoded TEXT,
            PRIMARY KEY (equiv_type, script_num, address_type)
        );

        CREATE INDEX IF NOT EXISTS idx_script_encodings_encoded ON script_encodings(encoded)
            WHERE encoded IS NOT NULL;

        CREATE TABLE IF NOT EXISTS chain_state (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            state_json TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS address_outputs (
            equiv_type TEXT NOT NULL,
            script_num INTEGER NOT NULL,
            address_type TEXT NOT NULL,
            tx_index INTEGER NOT NULL,
            vout INTEGER NOT NULL,
            PRIMARY KEY (equiv_type, script_num, tx_index, vout)
        );

        CREATE INDEX IF NOT EXISTS idx_address_outputs_type
            ON address_outputs(equiv_type, script_num, address_type);

        CREATE TABLE IF NOT EXISTS script_hashes (
            hash_hex TEXT PRIMARY KEY,
            address_type TEXT NOT NULL,
            script_num INTEGER NOT NULL
        );
        "#,
    )?;

    debug!("Schema version {} ready", SCHEMA_VERSION);
    Ok(())
}
