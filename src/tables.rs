//! Delimited-table readers and writers for call tables, position maps and
//! bedRMod output.

use crate::aggregate::{AggregatedInterval, CallRow};
use crate::types::{PositionMap, RefPos};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct MetaRow {
    pos: RefPos,
    name: String,
}

/// Tab for `.tsv`/`.tab`/`.txt`, comma for anything else.
pub fn call_table_delimiter(path: &Path) -> u8 {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ["tsv", "tab", "txt"].iter().any(|e| ext.eq_ignore_ascii_case(e)) => b'\t',
        _ => b',',
    }
}

fn reader_builder(delimiter: u8, has_headers: bool) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.delimiter(delimiter).has_headers(has_headers);
    builder
}

fn writer_builder(has_headers: bool) -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder.delimiter(b'\t').has_headers(has_headers);
    builder
}

pub fn read_call_rows<R: Read>(reader: R, delimiter: u8) -> Result<Vec<CallRow>> {
    let mut reader = reader_builder(delimiter, true).from_reader(reader);
    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<CallRow>().enumerate() {
        rows.push(result.with_context(|| format!("invalid call row {}", idx + 1))?);
    }
    Ok(rows)
}

pub fn load_call_rows(path: &Path) -> Result<Vec<CallRow>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_call_rows(file, call_table_delimiter(path))
        .with_context(|| format!("failed to read call table {}", path.display()))
}

pub fn read_position_map<R: Read>(reader: R) -> Result<PositionMap> {
    let mut reader = reader_builder(b'\t', true).from_reader(reader);
    let mut map = PositionMap::new();
    for result in reader.deserialize::<MetaRow>() {
        let row = result?;
        if let Some(previous) = map.insert(row.pos, row.name) {
            tracing::warn!(pos = row.pos, previous = %previous, "duplicate position in meta table");
        }
    }
    Ok(map)
}

pub fn load_position_map(path: &Path) -> Result<PositionMap> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_position_map(file).with_context(|| format!("failed to read meta table {}", path.display()))
}

/// Two columns `pos`, `name`, ascending by position. The header is written
/// even when the map is empty.
pub fn write_position_map<W: Write>(writer: W, map: &PositionMap) -> Result<()> {
    let mut writer = writer_builder(false).from_writer(writer);
    writer.write_record(["pos", "name"])?;
    for (pos, name) in map {
        writer.serialize(MetaRow {
            pos: *pos,
            name: name.clone(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// bedRMod body: 11 tab-separated columns, no header.
pub fn write_intervals<W: Write>(writer: W, rows: &[AggregatedInterval]) -> Result<()> {
    let mut writer = writer_builder(false).from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}
