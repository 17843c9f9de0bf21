//! Modification dictionary: `(source column, code)` -> canonical base and short name.

use crate::error::{RefmodError, Result};
use crate::types::HashMap;
use anyhow::{Context, anyhow};
use std::path::Path;

pub const UNMODIFIED_BASE_COLUMN: &str = "unmodified_base";
pub const SHORT_NAME_COLUMN: &str = "short_name";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModificationEntry {
    pub source_column: String,
    pub code: char,
    pub canonical_base: char,
    pub short_name: String,
}

/// Resolves a modification code observed in a query of a given source.
pub trait ModificationLookup {
    fn lookup(&self, source_column: &str, code: char) -> Result<&ModificationEntry>;
}

#[derive(Debug, Default, Clone)]
pub struct ModificationDictionary {
    /// Source column -> code -> entry.
    entries: HashMap<String, HashMap<char, ModificationEntry>>,
    columns: Vec<String>,
}

impl ModificationDictionary {
    /// Build from entries; the first entry for a `(column, code)` pair wins.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = ModificationEntry>,
    {
        let mut dict = Self::default();
        for entry in entries {
            dict.insert(entry);
        }
        dict
    }

    fn insert(&mut self, entry: ModificationEntry) {
        if !self.columns.contains(&entry.source_column) {
            self.columns.push(entry.source_column.clone());
        }
        let codes = self.entries.entry(entry.source_column.clone()).or_default();
        if let Some(existing) = codes.get(&entry.code) {
            tracing::debug!(
                column = %entry.source_column,
                code = %entry.code,
                kept = %existing.short_name,
                ignored = %entry.short_name,
                "duplicate dictionary code"
            );
            return;
        }
        codes.insert(entry.code, entry);
    }

    /// Load a dictionary table with one column per source tag plus
    /// `unmodified_base` and `short_name`. `.csv` files are comma separated,
    /// anything else is read as tab separated.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let delimiter = match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => b',',
            _ => b'\t',
        };
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("failed to open dictionary {}", path.display()))?;

        let headers = reader.headers()?.clone();
        let column_index = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| anyhow!("dictionary {} has no '{}' column", path.display(), name))
        };
        let base_idx = column_index(UNMODIFIED_BASE_COLUMN)?;
        let name_idx = column_index(SHORT_NAME_COLUMN)?;
        let sources: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != base_idx && *i != name_idx)
            .map(|(i, h)| (i, h.trim().to_string()))
            .collect();

        let mut dict = Self::default();
        for column in sources.iter().map(|(_, c)| c) {
            dict.columns.push(column.clone());
        }

        for (line, result) in reader.records().enumerate() {
            let record = result.with_context(|| {
                format!("failed to parse dictionary {} row {}", path.display(), line + 2)
            })?;
            let base = record.get(base_idx).map(str::trim).unwrap_or("");
            let short_name = record.get(name_idx).map(str::trim).unwrap_or("");
            let Some(canonical_base) = base.chars().next() else {
                tracing::debug!(row = line + 2, "dictionary row without unmodified base skipped");
                continue;
            };
            if short_name.is_empty() {
                tracing::debug!(row = line + 2, "dictionary row without short name skipped");
                continue;
            }
            if !matches!(canonical_base, 'A' | 'C' | 'G' | 'U') {
                tracing::warn!(
                    row = line + 2,
                    base = %canonical_base,
                    short_name,
                    "dictionary row has a non-canonical unmodified base"
                );
            }

            for (idx, column) in &sources {
                let cell = record.get(*idx).map(str::trim).unwrap_or("");
                let mut chars = cell.chars();
                let Some(code) = chars.next() else {
                    continue;
                };
                if chars.next().is_some() {
                    tracing::debug!(
                        row = line + 2,
                        column = %column,
                        cell,
                        "multi-character code cannot appear in a query sequence, skipped"
                    );
                    continue;
                }
                dict.insert(ModificationEntry {
                    source_column: column.clone(),
                    code,
                    canonical_base,
                    short_name: short_name.to_string(),
                });
            }
        }

        tracing::info!(
            path = %path.display(),
            entries = dict.len(),
            columns = dict.columns.len(),
            "loaded modification dictionary"
        );
        Ok(dict)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(|codes| codes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl ModificationLookup for ModificationDictionary {
    fn lookup(&self, source_column: &str, code: char) -> Result<&ModificationEntry> {
        self.entries
            .get(source_column)
            .and_then(|codes| codes.get(&code))
            .ok_or_else(|| RefmodError::DictionaryLookup {
                column: source_column.to_string(),
                code,
            })
    }
}
