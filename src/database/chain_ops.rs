//! Chain reads (trait impls on `Database`) and block-ingestion writes

use super::helpers::*;
use super::traits::{ChainReadOperations, IndexOperations};
use super::Database;
use crate::errors::AppResult;
use crate::types::{
    Address, AddressType, BlockRecord, ChainState, EquivAddressType, InputRecord, OutputRecord,
    ScriptRecord, TxRecord,
};
use rusqlite::{params, Connection, OptionalExtension};

impl ChainReadOperations for Database {
    fn get_chain_state(&self) -> AppResult<ChainState> {
        read_chain_state(self.connection())
    }

    fn get_block(&self, height: u32) -> AppResult<Option<BlockRecord>> {
        let sql = format!("SELECT {} FROM blocks WHERE height = ?1", BLOCK_COLUMNS);
        Ok(self
            .connection()
            .query_row(&sql, params![height], block_from_row)
            .optional()?)
    }

    fn get_tip(&self) -> AppResult<Option<BlockRecord>> {
        read_tip(self.connection())
    }

    fn get_tx(&self, tx_index: u32) -> AppResult<Option<TxRecord>> {
        let sql = format!("SELECT {} FROM transactions WHERE tx_index = ?1", TX_COLUMNS);
        Ok(self
            .connection()
            .query_row(&sql, params![tx_index], tx_from_row)
            .optional()?)
    }

    fn get_tx_by_hash(&self, txid: &str) -> AppResult<Option<TxRecord>> {
        read_tx_by_hash(self.connection(), txid)
    }

    fn get_block_txs(&self, height: u32) -> AppResult<Vec<TxRecord>> {
        let sql = format!(
            "SELECT {} FROM transactions WHERE block_height = ?1 ORDER BY tx_index",
            TX_COLUMNS
        );
        let mut stmt = self.connection().prepare_cached(&sql)?;
        let rows = stmt.query_map(params![height], tx_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn get_outputs(&self, tx_index: u32) -> AppResult<Vec<OutputRecord>> {
        let sql = format!(
            "SELECT {} FROM outputs WHERE tx_index = ?1 ORDER BY vout",
            OUTPUT_COLUMNS
        );
        let mut stmt = self.connection().prepare_cached(&sql)?;
        let rows = stmt.query_map(params![tx_index], output_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn get_output(&self, tx_index: u32, vout: u32) -> AppResult<Option<OutputRecord>> {
        read_output(self.connection(), tx_index, vout)
    }

    fn get_inputs(&self, tx_index: u32) -> AppResult<Vec<InputRecord>> {
        let sql = format!(
            "SELECT {} FROM inputs WHERE tx_index = ?1 ORDER BY vin",
            INPUT_COLUMNS
        );
        let mut stmt = self.connection().prepare_cached(&sql)?;
        let rows = stmt.query_map(params![tx_index], input_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn get_script(
        &self,
        equiv_type: EquivAddressType,
        script_num: u32,
    ) -> AppResult<Option<ScriptRecord>> {
        let sql = format!(
            "SELECT {} FROM scripts WHERE equiv_type = ?1 AND script_num = ?2",
            SCRIPT_COLUMNS
        );
        Ok(self
            .connection()
            .query_row(&sql, params![equiv_type, script_num], script_from_row)
            .optional()?)
    }

    fn get_address(
        &self,
        equiv_type: EquivAddressType,
        script_num: u32,
        address_type: AddressType,
    ) -> AppResult<Option<Address>> {
        let sql = format!(
            "SELECT {} FROM script_encodings
             WHERE equiv_type = ?1 AND script_num = ?2 AND address_type = ?3",
            ADDRESS_COLUMNS
        );
        Ok(self
            .connection()
            .query_row(
                &sql,
                params![equiv_type, script_num, address_type],
                address_from_row,
            )
            .optional()?)
    }

    fn get_address_by_encoding(&self, encoded: &str) -> AppResult<Option<Address>> {
        let sql = format!(
            "SELECT {} FROM script_encodings WHERE encoded = ?1",
            ADDRESS_COLUMNS
        );
        Ok(self
            .connection()
            .query_row(&sql, params![encoded], address_from_row)
            .optional()?)
    }
}

impl IndexOperations for Database {
    fn insert_address_output(&self, output: &OutputRecord) -> AppResult<()> {
        self.connection().execute(
            "INSERT OR IGNORE INTO address_outputs (equiv_type, script_num, address_type, tx_index, vout)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                output.address_type.equiv_type(),
                output.script_num,
                output.address_type,
                output.tx_index,
                output.index
            ],
        )?;
        Ok(())
    }

    fn get_address_outputs(
        &self,
        equiv_type: EquivAddressType,
        script_num: u32,
        address_type: Option<AddressType>,
    ) -> AppResult<Vec<OutputRecord>> {
        let sql = format!(
            "SELECT {} FROM outputs o
             JOIN address_outputs a ON a.tx_index = o.tx_index AND a.vout = o.vout
             WHERE a.equiv_type = ?1 AND a.script_num = ?2
               AND (?3 IS NULL OR a.address_type = ?3)
             ORDER BY o.tx_index, o.vout",
            OUTPUT_COLUMNS
                .split(", ")
                .map(|c| format!("o.{}", c))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let mut stmt = self.connection().prepare(&sql)?;
        let rows = stmt.query_map(params![equiv_type, script_num, address_type], output_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn insert_script_hash(
        &self,
        hash_hex: &str,
        address_type: AddressType,
        script_num: u32,
    ) -> AppResult<()> {
        self.connection().execute(
            "INSERT OR REPLACE INTO script_hashes (hash_hex, address_type, script_num)
             VALUES (?1, ?2, ?3)",
            params![hash_hex, address_type, script_num],
        )?;
        Ok(())
    }

    fn get_script_hash(&self, hash_hex: &str) -> AppResult<Option<(AddressType, u32)>> {
        Ok(self
            .connection()
            .query_row(
                "SELECT address_type, script_num FROM script_hashes WHERE hash_hex = ?1",
                params![hash_hex],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?)
    }
}

pub fn read_chain_state(conn: &Connection) -> AppResult<ChainState> {
    let json: Option<String> = conn
        .query_row("SELECT state_json FROM chain_state WHERE id = 1", [], |row| {
            row.get(0)
        })
        .optional()?;
    match json {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(ChainState::default()),
    }
}

pub fn write_chain_state(conn: &Connection, state: &ChainState) -> AppResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO chain_state (id, state_json) VALUES (1, ?1)",
        params![serde_json::to_string(state)?],
    )?;
    Ok(())
}

pub fn read_tip(conn: &Connection) -> AppResult<Option<BlockRecord>> {
    let sql = format!(
        "SELECT {} FROM blocks ORDER BY height DESC LIMIT 1",
        BLOCK_COLUMNS
    );
    Ok(conn.query_row(&sql, [], block_from_row).optional()?)
}

pub fn read_tx_by_hash(conn: &Connection, txid: &str) -> AppResult<Option<TxRecord>> {
    // Duplicate txids resolve to the most recent occurrence
    let sql = format!(
        "SELECT {} FROM transactions WHERE txid = ?1 ORDER BY tx_index DESC LIMIT 1",
        TX_COLUMNS
    );
    Ok(conn.query_row(&sql, params![txid], tx_from_row).optional()?)
}

pub fn read_output(conn: &Connection, tx_index: u32, vout: u32) -> AppResult<Option<OutputRecord>> {
    let sql = format!(
        "SELECT {} FROM outputs WHERE tx_index = ?1 AND vout = ?2",
        OUTPUT_COLUMNS
    );
    Ok(conn
        .query_row(&sql, params![tx_index, vout], output_from_row)
        .optional()?)
}

/// Script number already assigned to a dedup key, if any
pub fn find_script_num(
    conn: &Connection,
    equiv_type: EquivAddressType,
    key_hex: &str,
) -> AppResult<Option<u32>> {
    Ok(conn
        .query_row(
            "SELECT script_num FROM scripts WHERE equiv_type = ?1 AND key_hex = ?2",
            params![equiv_type, key_hex],
            |row| row.get(0),
        )
        .optional()?)
}

pub fn insert_block(conn: &Connection, block: &BlockRecord) -> AppResult<()> {
    conn.execute(
        "INSERT INTO blocks (height, block_hash, prev_hash, timestamp, first_tx_index, tx_count, size_bytes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            block.height,
            block.hash,
            block.prev_hash,
            block.timestamp,
            block.first_tx_index,
            block.tx_count,
            block.size_bytes
        ],
    )?;
    Ok(())
}

pub fn insert_tx(conn: &Connection, tx: &TxRecord) -> AppResult<()> {
    conn.prepare_cached(
        "INSERT INTO transactions (tx_index, txid, block_height, version, locktime, size_bytes, weight, input_count, output_count, is_coinbase)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?
    .execute(params![
        tx.tx_index,
        tx.txid,
        tx.block_height,
        tx.version,
        tx.locktime,
        tx.size_bytes,
        tx.weight,
        tx.input_count,
        tx.output_count,
        tx.is_coinbase
    ])?;
    Ok(())
}

pub fn insert_output(conn: &Connection, output: &OutputRecord) -> AppResult<()> {
    conn.prepare_cached(
        "INSERT INTO outputs (tx_index, vout, value, address_type, script_num, spending_tx_index, spending_input_index)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?
    .execute(params![
        output.tx_index,
        output.index,
        output.value as i64,
        output.address_type,
        output.script_num,
        output.spending_tx_index,
        output.spending_input_index
    ])?;
    Ok(())
}

pub fn insert_input(conn: &Connection, input: &InputRecord) -> AppResult<()> {
    conn.prepare_cached(
        "INSERT INTO inputs (tx_index, vin, spent_tx_index, spent_output_index, value, address_type, script_num, sequence)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?
    .execute(params![
        input.tx_index,
        input.index,
        input.spent_tx_index,
        input.spent_output_index,
        input.value as i64,
        input.address_type,
        input.script_num,
        input.sequence
    ])?;
    Ok(())
}

pub fn insert_script(conn: &Connection, script: &ScriptRecord) -> AppResult<()> {
    conn.prepare_cached(
        "INSERT INTO scripts (equiv_type, script_num, address_type, key_hex, script_hex, first_tx_index)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?
    .execute(params![
        script.equiv_type,
        script.script_num,
        script.address_type,
        script.key_hex,
        script.script_hex,
        script.first_tx_index
    ])?;
    Ok(())
}

/// Remember the encoding of a script for one address type (first sighting wins)
pub fn insert_script_encoding(
    conn: &Connection,
    equiv_type: EquivAddressType,
    script_num: u32,
    address_type: AddressType,
    encoded: Option<&str>,
) -> AppResult<()> {
    conn.prepare_cached(
        "INSERT OR IGNORE INTO script_encodings (equiv_type, script_num, address_type, encoded)
         VALUES (?1, ?2, ?3, ?4)",
    )?
    .execute(params![equiv_type, script_num, address_type, encoded])?;
    Ok(())
}

/// Record that `(tx_index, vout)` is consumed by input `input_index` of `spending_tx_index`
pub fn mark_output_spent(
    conn: &Connection,
    tx_index: u32,
    vout: u32,
    spending_tx_index: u32,
    input_index: u32,
) -> AppResult<()> {
    conn.prepare_cached(
        "UPDATE outputs SET spending_tx_index = ?3, spending_input_index = ?4
         WHERE tx_index = ?1 AND vout = ?2",
    )?
    .execute(params![tx_index, vout, spending_tx_index, input_index])?;
    Ok(())
}
