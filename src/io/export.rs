//! CSV export for battery curves and strategy results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::NaiveDateTime;

use crate::devices::CurveRow;
use crate::dispatch::{LimitRow, LoadFollowingRow, Transaction};

/// Timestamp layout shared by every exported table.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A row type with a fixed CSV column layout.
pub trait CsvRow {
    /// Column names, in output order.
    const HEADER: &'static [&'static str];

    /// Formatted values, one per header column.
    fn fields(&self) -> Vec<String>;
}

fn datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

impl CsvRow for CurveRow {
    const HEADER: &'static [&'static str] = &["datetime", "soc", "power_kw", "energy_kwh"];

    fn fields(&self) -> Vec<String> {
        vec![
            datetime(&self.datetime),
            format!("{:.6}", self.soc),
            format!("{:.4}", self.power_kw),
            format!("{:.4}", self.energy_kwh),
        ]
    }
}

impl CsvRow for Transaction {
    const HEADER: &'static [&'static str] = &[
        "datetime",
        "transaction_type",
        "price_eur_per_mwh",
        "volume_mwh",
        "revenue_eur",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            datetime(&self.datetime),
            self.kind.to_string(),
            format!("{:.2}", self.price_eur_per_mwh),
            format!("{:.6}", self.volume_mwh),
            format!("{:.4}", self.revenue_eur),
        ]
    }
}

impl CsvRow for LimitRow {
    const HEADER: &'static [&'static str] =
        &["datetime", "original_kw", "battery_kw", "new_kw", "soc"];

    fn fields(&self) -> Vec<String> {
        vec![
            datetime(&self.datetime),
            format!("{:.4}", self.original_kw),
            format!("{:.4}", self.battery_kw),
            format!("{:.4}", self.new_kw),
            format!("{:.6}", self.soc),
        ]
    }
}

impl CsvRow for LoadFollowingRow {
    const HEADER: &'static [&'static str] =
        &["datetime", "original_load_kw", "uncovered_load_kw", "soc"];

    fn fields(&self) -> Vec<String> {
        vec![
            datetime(&self.datetime),
            format!("{:.4}", self.original_load_kw),
            format!("{:.4}", self.uncovered_load_kw),
            format!("{:.6}", self.soc),
        ]
    }
}

/// Exports rows to a CSV file at the given path.
///
/// Writes a header row followed by one data row per entry. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv<R: CsvRow>(rows: &[R], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(rows, buf)
}

/// Writes rows as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv<R: CsvRow>(rows: &[R], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(R::HEADER)?;
    for row in rows {
        wtr.write_record(row.fields())?;
    }

    wtr.flush()?;
    Ok(())
}
