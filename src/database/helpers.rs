//! Shared database helper functions
//!
//! Row mappers and SQL conversions for the chain record types. Column order
//! for each mapper is fixed by the matching `*_COLUMNS` constant.

use crate::types::{
    Address, AddressType, BlockRecord, EquivAddressType, InputRecord, OutputRecord, ScriptRecord,
    TxRecord,
};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Row;

impl ToSql for AddressType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AddressType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

impl ToSql for EquivAddressType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for EquivAddressType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

pub const BLOCK_COLUMNS: &str =
    "height, block_hash, prev_hash, timestamp, first_tx_index, tx_count, size_bytes";

pub fn block_from_row(row: &Row) -> rusqlite::Result<BlockRecord> {
    Ok(BlockRecord {
        height: row.get(0)?,
        hash: row.get(1)?,
        prev_hash: row.get(2)?,
        timestamp: row.get(3)?,
        first_tx_index: row.get(4)?,
        tx_count: row.get(5)?,
        size_bytes: row.get(6)?,
    })
}

pub const TX_COLUMNS: &str = "tx_index, txid, block_height, version, locktime, size_bytes, weight, input_count, output_count, is_coinbase";

pub fn tx_from_row(row: &Row) -> rusqlite::Result<TxRecord> {
    Ok(TxRecord {
        tx_index: row.get(0)?,
        txid: row.get(1)?,
        block_height: row.get(2)?,
        version: row.get(3)?,
        locktime: row.get(4)?,
        size_bytes: row.get(5)?,
        weight: row.get(6)?,
        input_count: row.get(7)?,
        output_count: row.get(8)?,
        is_coinbase: row.get(9)?,
    })
}

pub const OUTPUT_COLUMNS: &str =
    "tx_index, vout, value, address_type, script_num, spending_tx_index, spending_input_index";

pub fn output_from_row(row: &Row) -> rusqlite::Result<OutputRecord> {
    Ok(OutputRecord {
        tx_index: row.get(0)?,
        index: row.get(1)?,
        value: row.get::<_, i64>(2)? as u64,
        address_type: row.get(3)?,
        script_num: row.get(4)?,
        spending_tx_index: row.get(5)?,
        spending_input_index: row.get(6)?,
    })
}

pub const INPUT_COLUMNS: &str = "tx_index, vin, spent_tx_index, spent_output_index, value, address_type, script_num, sequence";

pub fn input_from_row(row: &Row) -> rusqlite::Result<InputRecord> {
    Ok(InputRecord {
        tx_index: row.get(0)?,
        index: row.get(1)?,
        spent_tx_index: row.get(2)?,
        spent_output_index: row.get(3)?,
        value: row.get::<_, i64>(4)? as u64,
        address_type: row.get(5)?,
        script_num: row.get(6)?,
        sequence: row.get(7)?,
    })
}

pub const SCRIPT_COLUMNS: &str =
    "equiv_type, script_num, address_type, key_hex, script_hex, first_tx_index";

pub fn script_from_row(row: &Row) -> rusqlite::Result<ScriptRecord> {
    Ok(ScriptRecord {
        equiv_type: row.get(0)?,
        script_num: row.get(1)?,
        address_type: row.get(2)?,
        key_hex: row.get(3)?,
        script_hex: row.get(4)?,
        first_tx_index: row.get(5)?,
    })
}

pub const ADDRESS_COLUMNS: &str = "address_type, script_num, encoded";

pub fn address_from_row(row: &Row) -> rusqlite::Result<Address> {
    Ok(Address {
        address_type: row.get(0)?,
        script_num: row.get(1)?,
        encoded: row.get(2)?,
    })
}
