//! Line-oriented output dump for golden-file comparison
//!
//! Each output of a transaction is written as ten lines, in the order of
//! [`OUTPUT_FIELDS`]: address, address_type, block, index, is_spent,
//! spending_tx, spending_tx_index, tx, tx_index, value. Outputs follow the
//! transaction's vout order with no separators, so `N` outputs give exactly
//! `10 * N` lines. Any field that cannot be resolved aborts the dump.

use crate::chain::{Tx, OUTPUT_FIELDS};
use crate::errors::AppResult;
use std::io::Write;
use tracing::debug;

/// Write every output of `tx` to `sink`, ten lines per output
pub fn output_regression<W: Write>(tx: &Tx<'_>, sink: &mut W) -> AppResult<()> {
    let outputs = tx.outputs()?;
    for output in &outputs {
        let summary = output.summary()?;
        for line in summary.lines() {
            writeln!(sink, "{}", line)?;
        }
    }
    debug!(
        "Wrote {} lines for tx #{}",
        outputs.len() * OUTPUT_FIELDS.len(),
        tx.index()
    );
    Ok(())
}

/// Same as [`output_regression`], collected into a string
pub fn output_regression_string(tx: &Tx<'_>) -> AppResult<String> {
    let mut buf = Vec::new();
    output_regression(tx, &mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| crate::errors::AppError::InvalidData(format!("Non-UTF-8 output: {}", e)))
}
