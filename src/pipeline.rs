use crate::aggregate::{self, AggregatedInterval, AggregationConfig, UnmatchedNames};
use crate::alignment;
use crate::cli::{BedrmodArgs, ConvertArgs, UpdateArgs};
use crate::convert::{self, ConvertStats};
use crate::dictionary::ModificationDictionary;
use crate::fasta::{self, FastaDb, Sequence};
use crate::reconcile::{self, ReconcileConfig, ReconcileStats};
use crate::tables;
use anyhow::{Context, Result, anyhow, bail};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct UpdateStats {
    pub queries: u64,
    pub alignments: u64,
    pub modified_positions: u64,
    pub reconcile: ReconcileStats,
}

#[derive(Debug, Default)]
pub struct BedrmodStats {
    pub inputs: u64,
    pub rows: u64,
    pub accepted: u64,
    pub intervals: u64,
    pub unnamed: u64,
}

pub fn run_convert(args: &ConvertArgs) -> Result<ConvertStats> {
    convert::convert_file(&args.input, &args.output, args.mode)
}

pub fn run_update(args: &UpdateArgs) -> Result<UpdateStats> {
    let reference = FastaDb::load(&args.reference)?
        .into_reference(&args.reference.display().to_string())?;
    let queries = FastaDb::load(&args.query)?;
    let alignments = alignment::load_alignments(&args.alignment)?;
    let dictionary = ModificationDictionary::load(&args.dictionary)?;

    let config = ReconcileConfig {
        order: args.order,
        strict_ops: !args.allow_unsupported_ops,
    };
    let result = reconcile::reconcile(&reference, &queries, &alignments, &dictionary, &config)
        .with_context(|| format!("failed to update reference {}", args.reference.display()))?;

    let updated = Sequence {
        header: reference.header.clone(),
        bases: result.reference_string(),
    };
    // Both outputs must open before either is written.
    let mut out = tables::create_output(&args.output)?;
    let meta = match tables::create_output(&args.meta) {
        Ok(meta) => meta,
        Err(e) => {
            drop(out);
            let _ = std::fs::remove_file(&args.output);
            return Err(e);
        }
    };
    fasta::write_sequence(&mut out, &updated)?;
    out.flush()?;
    tables::write_position_map(meta, &result.positions)?;

    Ok(UpdateStats {
        queries: queries.len() as u64,
        alignments: alignments.len() as u64,
        modified_positions: result.positions.len() as u64,
        reconcile: result.stats,
    })
}

/// Chromosome label from a call table name, e.g. field 1 of `HRPC_5.8S_rRNA.csv` is `5.8S`.
pub fn chrom_from_path(path: &Path, field: usize) -> Result<String> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("cannot derive a chromosome label from {}", path.display()))?;
    stem.split('_')
        .nth(field)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            anyhow!(
                "file name {} has no '_'-separated field {} to use as chromosome label",
                path.display(),
                field
            )
        })
}

/// One region's inputs for the bedRMod stage.
#[derive(Debug, Clone)]
pub struct RegionInput {
    pub chrom: String,
    pub calls: PathBuf,
    pub meta: PathBuf,
}

pub fn region_inputs(args: &BedrmodArgs) -> Result<Vec<RegionInput>> {
    if args.calls.len() != args.meta.len() {
        bail!(
            "{} call tables but {} meta tables; pass one --meta per --calls",
            args.calls.len(),
            args.meta.len()
        );
    }
    if !args.chrom.is_empty() && args.chrom.len() != args.calls.len() {
        bail!(
            "{} chromosome labels for {} call tables",
            args.chrom.len(),
            args.calls.len()
        );
    }

    args.calls
        .iter()
        .zip(&args.meta)
        .enumerate()
        .map(|(i, (calls, meta))| {
            let chrom = match args.chrom.get(i) {
                Some(chrom) => chrom.clone(),
                None => chrom_from_path(calls, args.chrom_field)?,
            };
            Ok(RegionInput {
                chrom,
                calls: calls.clone(),
                meta: meta.clone(),
            })
        })
        .collect()
}

/// Aggregate each region independently and concatenate in input order.
pub fn aggregate_regions(
    inputs: &[RegionInput],
    config: &AggregationConfig,
) -> Result<(Vec<AggregatedInterval>, BedrmodStats)> {
    let mut stats = BedrmodStats::default();
    let mut rows = Vec::new();
    for input in inputs {
        let calls = tables::load_call_rows(&input.calls)?;
        let positions = tables::load_position_map(&input.meta)?;
        let aggregation = aggregate::aggregate_rows(&input.chrom, &calls, &positions, config)
            .with_context(|| format!("failed to aggregate {}", input.calls.display()))?;
        tracing::info!(
            chrom = %input.chrom,
            rows = aggregation.stats.rows,
            accepted = aggregation.stats.accepted,
            intervals = aggregation.stats.intervals,
            "aggregated call table"
        );
        stats.inputs += 1;
        stats.rows += aggregation.stats.rows;
        stats.accepted += aggregation.stats.accepted;
        stats.intervals += aggregation.stats.intervals;
        stats.unnamed += aggregation.stats.unnamed;
        rows.extend(aggregation.intervals);
    }
    Ok((rows, stats))
}

pub fn run_bedrmod(args: &BedrmodArgs) -> Result<BedrmodStats> {
    let inputs = region_inputs(args)?;
    let config = AggregationConfig {
        max_acceptance: args.max_asr,
        min_confidence: args.min_conf,
        unmatched: if args.drop_unnamed {
            UnmatchedNames::Drop
        } else {
            UnmatchedNames::Keep
        },
    };
    let (rows, stats) = aggregate_regions(&inputs, &config)?;
    tables::write_intervals(tables::create_output(&args.output)?, &rows)?;
    Ok(stats)
}
