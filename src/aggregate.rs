//! Aggregate per-molecule modification calls into single-base bedRMod rows.
//!
//! Frequency is coverage over *all* accepted molecules of the input, modified
//! or not, expressed as a percentage.

use crate::error::{RefmodError, Result};
use crate::types::{PositionMap, RefPos};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix restored on the first token of an oligo string.
pub const TOKEN_MARKER: &str = "p";
pub const TOKEN_DELIMITER: char = '-';
/// Tokens of unmodified ribonucleotides.
pub const CANONICAL_TOKENS: [&str; 4] = ["pAr", "pUr", "pGr", "pCr"];

/// Row of a call table as written by the upstream caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallRow {
    #[serde(rename = "Positions")]
    pub positions: String,
    #[serde(rename = "Oligo Sequence")]
    pub oligo_sequence: String,
    #[serde(rename = "Best ASR")]
    pub best_asr: Option<f64>,
    #[serde(rename = "Conf. Score")]
    pub conf_score: Option<f64>,
}

/// One accepted molecule.
#[derive(Debug, Clone, PartialEq)]
pub struct ModificationCall {
    pub tokens: Vec<String>,
    pub pos_start: i64,
    pub pos_end: i64,
    pub acceptance_score: f64,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmatchedNames {
    /// Keep rows without a position-map entry, with an empty name.
    #[default]
    Keep,
    Drop,
}

#[derive(Debug, Clone)]
pub struct AggregationConfig {
    /// Highest accepted `Best ASR`.
    pub max_acceptance: f64,
    /// Lowest accepted `Conf. Score`.
    pub min_confidence: f64,
    pub unmatched: UnmatchedNames,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            max_acceptance: 1.0,
            min_confidence: 100.0,
            unmatched: UnmatchedNames::Keep,
        }
    }
}

impl AggregationConfig {
    pub fn accepts(&self, row: &CallRow) -> bool {
        match (row.best_asr, row.conf_score) {
            (Some(asr), Some(conf)) => asr <= self.max_acceptance && conf >= self.min_confidence,
            _ => false,
        }
    }
}

/// One output row; field order is the column order of the bedRMod table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedInterval {
    pub chrom: String,
    pub chrom_start: i64,
    pub chrom_end: i64,
    pub name: Option<String>,
    pub score: f64,
    pub strand: char,
    pub thick_start: i64,
    pub thick_end: i64,
    pub item_rgb: u32,
    pub coverage: u64,
    pub frequency: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AggregateStats {
    pub rows: u64,
    pub accepted: u64,
    pub observations: u64,
    pub intervals: u64,
    pub unnamed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub intervals: Vec<AggregatedInterval>,
    pub stats: AggregateStats,
}

/// Parse `"<start>-<end>"`.
pub fn parse_positions(value: &str) -> Result<(i64, i64)> {
    let invalid = || RefmodError::InvalidPositions { value: value.to_string() };
    let (start, end) = value.trim().split_once('-').ok_or_else(invalid)?;
    let start = start.trim().parse().map_err(|_| invalid())?;
    let end = end.trim().parse().map_err(|_| invalid())?;
    Ok((start, end))
}

/// Split an oligo string into tokens. The first base lost its marker and the
/// string ends with a delimiter, so the marker is restored and the final
/// element dropped.
pub fn split_tokens(oligo: &str) -> Vec<String> {
    let marked = format!("{TOKEN_MARKER}{oligo}");
    let mut tokens: Vec<String> = marked.split(TOKEN_DELIMITER).map(str::to_string).collect();
    tokens.pop();
    tokens
}

/// `(token, index)` for every token that is not an unmodified base.
pub fn modified_tokens(tokens: &[String]) -> Vec<(&str, usize)> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| !CANONICAL_TOKENS.contains(&token.as_str()))
        .map(|(idx, token)| (token.as_str(), idx))
        .collect()
}

impl ModificationCall {
    pub fn from_row(row: &CallRow) -> Result<Self> {
        let (pos_start, pos_end) = parse_positions(&row.positions)?;
        Ok(Self {
            tokens: split_tokens(&row.oligo_sequence),
            pos_start,
            pos_end,
            acceptance_score: row.best_asr.unwrap_or(f64::NAN),
            confidence_score: row.conf_score.unwrap_or(f64::NAN),
        })
    }
}

#[derive(Debug, Default)]
struct Bucket {
    coverage: u64,
    confidence_sum: f64,
}

/// Aggregate the accepted calls of one input. `positions` is the
/// position/name map of the same region.
pub fn aggregate_calls(
    chrom: &str,
    calls: &[ModificationCall],
    positions: &PositionMap,
    config: &AggregationConfig,
) -> Result<Aggregation> {
    let mut stats = AggregateStats {
        accepted: calls.len() as u64,
        ..AggregateStats::default()
    };

    let mut buckets: BTreeMap<(&str, i64, i64), Bucket> = BTreeMap::new();
    for call in calls {
        for (token, idx) in modified_tokens(&call.tokens) {
            let (chrom_start, chrom_end) = site_of(call, idx)?;
            let bucket = buckets.entry((token, chrom_start, chrom_end)).or_default();
            bucket.coverage += 1;
            bucket.confidence_sum += call.confidence_score;
            stats.observations += 1;
        }
    }

    let total = calls.len() as f64;
    let mut intervals = Vec::with_capacity(buckets.len());
    for ((token, chrom_start, chrom_end), bucket) in buckets {
        let name = RefPos::try_from(chrom_end)
            .ok()
            .and_then(|pos| positions.get(&pos))
            .cloned();
        if name.is_none() {
            stats.unnamed += 1;
            tracing::debug!(chrom, token, chrom_end, "no position-map entry for modified site");
            if config.unmatched == UnmatchedNames::Drop {
                continue;
            }
        }
        intervals.push(AggregatedInterval {
            chrom: chrom.to_string(),
            chrom_start,
            chrom_end,
            name,
            score: bucket.confidence_sum / bucket.coverage as f64,
            strand: '.',
            thick_start: chrom_start,
            thick_end: chrom_end,
            item_rgb: 0,
            coverage: bucket.coverage,
            frequency: (bucket.coverage as f64 / total) * 100.0,
        });
    }

    // Stable: equal starts stay in token order.
    intervals.sort_by_key(|row| row.chrom_start);
    stats.intervals = intervals.len() as u64;

    Ok(Aggregation { intervals, stats })
}

/// `(chromStart, chromEnd)` of the token at `idx`; out-of-range coordinates
/// are rejected rather than wrapped.
fn site_of(call: &ModificationCall, idx: usize) -> Result<(i64, i64)> {
    let invalid = || RefmodError::InvalidPositions {
        value: format!("{}-{}", call.pos_start, call.pos_end),
    };
    let chrom_end = i64::try_from(idx)
        .ok()
        .and_then(|idx| call.pos_start.checked_add(idx))
        .ok_or_else(invalid)?;
    let chrom_start = chrom_end.checked_sub(1).ok_or_else(invalid)?;
    Ok((chrom_start, chrom_end))
}

/// Filter raw rows, then aggregate the accepted ones.
pub fn aggregate_rows(
    chrom: &str,
    rows: &[CallRow],
    positions: &PositionMap,
    config: &AggregationConfig,
) -> Result<Aggregation> {
    let calls = rows
        .iter()
        .filter(|row| config.accepts(row))
        .map(ModificationCall::from_row)
        .collect::<Result<Vec<_>>>()?;
    let mut aggregation = aggregate_calls(chrom, &calls, positions, config)?;
    aggregation.stats.rows = rows.len() as u64;
    Ok(aggregation)
}
