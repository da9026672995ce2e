//! CSV serialization of result tables.

use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::models::{ResultRow, ResultTable, COLUMNS};

/// Errors that can occur while writing or reading a table
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to move output into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Write `table` as CSV: a header row with [`COLUMNS`], then one row per record.
///
/// The header is written even for an empty table.
pub fn write_table<W: Write>(table: &ResultTable, writer: W) -> Result<(), OutputError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(COLUMNS)?;
    for row in table {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;

    Ok(())
}

/// Write `table` to `path`.
///
/// The CSV goes to a temporary file next to `path` that is renamed over it once
/// complete, so a failed write never leaves a truncated file behind.
pub fn save_table(table: &ResultTable, path: &Path) -> Result<(), OutputError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    write_table(table, file.as_file_mut())?;
    file.as_file().sync_all()?;
    file.persist(path)?;

    Ok(())
}

/// Read a table previously written by [`write_table`]
pub fn read_table<R: Read>(reader: R) -> Result<ResultTable, OutputError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if headers.iter().ne(COLUMNS.iter().copied()) {
        return Err(OutputError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("unexpected header row: {:?}", headers),
        )));
    }

    csv_reader
        .deserialize::<ResultRow>()
        .map(|row| row.map_err(OutputError::from))
        .collect()
}
