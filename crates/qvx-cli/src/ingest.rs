//! CSV input: reads a table and infers column types from its values.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use qvx_writer::{Column, QvxTable};
use tracing::debug;

/// Read a CSV file whose first record is the header row.
pub fn read_csv_table(path: &Path) -> Result<QvxTable> {
    let reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("read csv: {}", path.display()))?;
    let table =
        collect_table(reader).with_context(|| format!("read records: {}", path.display()))?;
    debug!(
        path = %path.display(),
        columns = table.num_columns(),
        rows = table.num_rows(),
        "read csv table"
    );
    Ok(table)
}

/// Read CSV text from any reader.
pub fn parse_csv_table(input: impl Read) -> Result<QvxTable> {
    let reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);
    collect_table(reader)
}

fn collect_table<R: Read>(mut reader: csv::Reader<R>) -> Result<QvxTable> {
    let mut records = reader.records();
    let Some(header) = records.next().transpose().context("read header row")? else {
        return Ok(QvxTable::default());
    };
    let headers: Vec<String> = header.iter().map(normalize_header).collect();

    let mut rows = Vec::new();
    for record in records {
        let record = record.context("read record")?;
        // Short rows are padded with missing values, long rows truncated.
        let row: Vec<String> = (0..headers.len())
            .map(|idx| record.get(idx).map(normalize_cell).unwrap_or_default())
            .collect();
        rows.push(row);
    }

    let columns = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| infer_column(name, rows.iter().map(|row| row[idx].as_str())))
        .collect();
    Ok(QvxTable { columns, rows })
}

/// Infer a column's type from its values; empty values are ignored.
///
/// Integers keep their observed range as bounds, so non-negative columns
/// become unsigned fields.
pub fn infer_column<'a>(name: &str, values: impl Iterator<Item = &'a str> + Clone) -> Column {
    let present = values.filter(|value| !value.is_empty());
    if present.clone().next().is_none() {
        return Column::string(name);
    }

    let integers: Option<Vec<i64>> = present.clone().map(|v| v.parse().ok()).collect();
    if let Some(integers) = integers {
        let lower = integers.iter().copied().min().unwrap_or_default();
        let upper = integers.iter().copied().max().unwrap_or_default();
        return Column::integer(name).with_bounds(lower, upper);
    }

    if present.clone().all(|value| value.parse::<f64>().is_ok()) {
        return Column::double(name);
    }
    Column::string(name)
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().to_string()
}
