//! CSV import of input series (prices, loads, production).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// Reads one numeric column from a CSV file.
///
/// A header row is optional and detected by its first selected field not
/// parsing as a number. `column` picks a column by header name; without it
/// the last column is used, so both bare value lists and `datetime,value`
/// files work.
///
/// # Errors
///
/// Returns [`Error::Series`] if the file cannot be read, the column is
/// missing or a value is not a number.
pub fn read_series(path: &Path, column: Option<&str>) -> Result<Vec<f64>> {
    let file = File::open(path).map_err(|e| series_error(path, e.to_string()))?;
    parse_series(file, column).map_err(|message| series_error(path, message))
}

/// Parses one numeric column from CSV text. See [`read_series`].
///
/// # Errors
///
/// Returns a description of the first problem found.
pub fn parse_series(reader: impl Read, column: Option<&str>) -> Result<Vec<f64>, String> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut records = rdr.records().enumerate();
    let Some((_, first)) = records.next() else {
        return Ok(Vec::new());
    };
    let first = first.map_err(|e| e.to_string())?;

    let index = match column {
        Some(name) => first
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| format!("no column named \"{name}\""))?,
        None => first.len().saturating_sub(1),
    };

    let mut values = Vec::new();
    match first.get(index).map(str::parse::<f64>) {
        Some(Ok(v)) if column.is_none() => values.push(v),
        // Header row.
        _ => {}
    }

    for (i, record) in records {
        let record = record.map_err(|e| e.to_string())?;
        let field = record
            .get(index)
            .ok_or_else(|| format!("line {}: missing column {}", i + 1, index + 1))?;
        let value = field
            .parse::<f64>()
            .map_err(|_| format!("line {}: \"{field}\" is not a number", i + 1))?;
        values.push(value);
    }
    Ok(values)
}

fn series_error(path: &Path, message: String) -> Error {
    Error::Series {
        path: path.to_path_buf(),
        message,
    }
}
