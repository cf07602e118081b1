use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::columns::{resolve_columns, ColumnMap, Field};
use crate::error::{IngestError, Result};
use crate::normalize::{clean_cell, RawRecord};

/// Reads a CSV license register. Headers are resolved by synonym, rows may
/// be ragged, and placeholder cells ("nan", "none", blank) read as absent.
///
/// An unreadable header row or an I/O failure is fatal; a row that fails to
/// decode is skipped.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let header_names: Vec<&str> = headers.iter().collect();
    let columns = resolve_columns(&header_names);
    if columns.get(Field::TxFrequency).is_none() {
        return Err(IngestError::MissingColumn(Field::TxFrequency));
    }
    debug!(?columns, "resolved register columns");

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in rdr.records() {
        match row {
            Ok(row) => records.push(raw_record(&columns, &row)),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                skipped += 1;
                debug!(error = %e, "skipping unreadable register row");
            }
        }
    }
    if skipped > 0 {
        debug!(skipped, read = records.len(), "register rows skipped");
    }
    Ok(records)
}

pub fn read_records_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
    read_records(File::open(path)?)
}

fn raw_record(columns: &ColumnMap, row: &csv::StringRecord) -> RawRecord {
    let cell = |field| clean_cell(columns.cell(field, row)).map(str::to_string);
    RawRecord {
        license_id: cell(Field::LicenseId),
        customer: cell(Field::Customer),
        tx_frequency: cell(Field::TxFrequency),
        rx_frequency: cell(Field::RxFrequency),
        emission: cell(Field::Emission),
        latitude: cell(Field::Latitude),
        longitude: cell(Field::Longitude),
        province: cell(Field::Province),
        address: cell(Field::Address),
        conditions: cell(Field::Conditions),
    }
}
