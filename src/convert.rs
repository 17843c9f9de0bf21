//! Line-wise FASTA rewriting ahead of alignment.
//!
//! Reference sequences are turned into RNA (`T` -> `U`). Query sequences are
//! masked so any non-canonical symbol becomes `N`, which keeps aligners from
//! choking on modification codes.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConversionMode {
    /// DNA reference to RNA
    #[value(name = "ref")]
    Reference,
    /// Mask modified query bases as N
    #[value(name = "qry")]
    Query,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConvertStats {
    pub headers: u64,
    pub sequence_lines: u64,
    pub changed_bases: u64,
}

pub fn convert_base(base: char, mode: ConversionMode) -> char {
    match mode {
        ConversionMode::Reference => {
            if base == 'T' {
                'U'
            } else {
                base
            }
        }
        ConversionMode::Query => {
            if matches!(base, 'A' | 'C' | 'G' | 'U') {
                base
            } else {
                'N'
            }
        }
    }
}

/// Convert one sequence line (without its line terminator).
pub fn convert_line(line: &str, mode: ConversionMode) -> (String, u64) {
    let mut changed = 0u64;
    let converted = line
        .chars()
        .map(|base| {
            let out = convert_base(base, mode);
            if out != base {
                changed += 1;
            }
            out
        })
        .collect();
    (converted, changed)
}

pub fn convert_fasta<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    mode: ConversionMode,
) -> Result<ConvertStats> {
    let mut stats = ConvertStats::default();
    for line in reader.lines() {
        let line = line?;
        if line.starts_with('>') {
            stats.headers += 1;
            writeln!(writer, "{line}")?;
            continue;
        }
        let (converted, changed) = convert_line(&line, mode);
        stats.sequence_lines += 1;
        stats.changed_bases += changed;
        writeln!(writer, "{converted}")?;
    }
    Ok(stats)
}

pub fn convert_file(input: &Path, output: &Path, mode: ConversionMode) -> Result<ConvertStats> {
    let reader = BufReader::new(
        File::open(input).with_context(|| format!("failed to open {}", input.display()))?,
    );
    let mut writer = BufWriter::new(
        File::create(output).with_context(|| format!("failed to create {}", output.display()))?,
    );
    let stats = convert_fasta(reader, &mut writer, mode)
        .with_context(|| format!("failed to convert {}", input.display()))?;
    writer.flush()?;
    Ok(stats)
}
