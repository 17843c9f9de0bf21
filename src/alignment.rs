use crate::types::{HashMap, HashMapExt};
use anyhow::{Context, Result, anyhow};
use std::io::Read;
use std::path::Path;

const QUERY_ID_COL: usize = 0;
const REF_START_COL: usize = 3;
const EDIT_SCRIPT_COL: usize = 5;

/// One aligned query: where it starts on the reference and how it aligns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentRecord {
    pub query_id: String,
    /// 1-based start on the reference.
    pub ref_start: u64,
    pub edit_script: String,
}

impl AlignmentRecord {
    pub fn new(query_id: impl Into<String>, ref_start: u64, edit_script: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
            ref_start,
            edit_script: edit_script.into(),
        }
    }

    /// Dictionary column for this query: the last `_`-separated segment of its id.
    pub fn source_column(&self) -> &str {
        self.query_id.rsplit('_').next().unwrap_or(&self.query_id)
    }
}

pub fn load_alignments(path: &Path) -> Result<Vec<AlignmentRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open alignment table {}", path.display()))?;
    read_alignments(file).with_context(|| format!("failed to read {}", path.display()))
}

/// Read a SAM-like table. `@` lines are metadata; unmapped records (`*` edit
/// script) are skipped. A query id seen twice keeps its first slot but takes
/// the later record.
pub fn read_alignments<R: Read>(reader: R) -> Result<Vec<AlignmentRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'@'))
        .from_reader(reader);

    let mut records: Vec<AlignmentRecord> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut unmapped = 0u64;

    for result in reader.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        if row.len() <= EDIT_SCRIPT_COL {
            return Err(anyhow!(
                "line {}: expected at least {} columns, found {}",
                line,
                EDIT_SCRIPT_COL + 1,
                row.len()
            ));
        }

        let query_id = &row[QUERY_ID_COL];
        let edit_script = &row[EDIT_SCRIPT_COL];
        if edit_script == "*" {
            tracing::debug!(line, query_id, "unmapped alignment skipped");
            unmapped += 1;
            continue;
        }
        let ref_start: u64 = row[REF_START_COL].parse().map_err(|e| {
            anyhow!("line {}: invalid reference start '{}': {}", line, &row[REF_START_COL], e)
        })?;

        let record = AlignmentRecord::new(query_id, ref_start, edit_script);
        if let Some(&slot) = slots.get(query_id) {
            tracing::warn!(line, query_id, "duplicate query id, later alignment replaces earlier");
            records[slot] = record;
        } else {
            slots.insert(query_id.to_string(), records.len());
            records.push(record);
        }
    }

    tracing::debug!(alignments = records.len(), unmapped, "read alignment table");
    Ok(records)
}
