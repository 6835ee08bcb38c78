//! Statement export.

use std::io::Write;

use anyhow::Result;

use shared::statement::{build_statement, STATEMENT_COLUMNS};
use shared::Party;

/// Write a party's statement as CSV: one column header, then the identity
/// row and one row per transaction in chronological order. Returns the
/// number of statement rows written (excluding the column header).
pub fn write_statement_csv<W: Write>(party: &Party, writer: W) -> Result<usize> {
    let rows = build_statement(party);
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(STATEMENT_COLUMNS)?;
    for row in &rows {
        csv_writer.write_record(row.cells())?;
    }
    csv_writer.flush()?;

    Ok(rows.len())
}
