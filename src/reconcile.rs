//! Rewrite a reference from modification-annotated query alignments.
//!
//! Each alignment is applied to the *current* reference, i.e. the output of
//! the previous alignment, and its `ref_start` is read in that sequence's
//! coordinates. Overlapping alignments therefore depend on processing order:
//! the later alignment wins both the base and the modification name.
//! [`AlignmentOrder::RefStart`] (the default) fixes that order by sorting on
//! `ref_start`, keeping table order for ties.

use crate::alignment::AlignmentRecord;
use crate::cigar::{self, EditOp};
use crate::dictionary::ModificationLookup;
use crate::error::{RefmodError, Result, SequenceKind};
use crate::fasta::{FastaDb, Sequence};
use crate::types::{PositionMap, RefPos};

/// Unmarked query symbols; anything else is a modification code.
pub const CANONICAL_BASES: [char; 4] = ['A', 'C', 'G', 'U'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum AlignmentOrder {
    /// Order of the alignment table
    File,
    /// Ascending reference start, ties in table order
    #[default]
    RefStart,
}

#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    pub order: AlignmentOrder,
    /// Fail on `N`, `S`, `H`, `P`, `=` and `X` instead of skipping them.
    pub strict_ops: bool,
}

impl ReconcileConfig {
    pub fn strict() -> Self {
        Self {
            order: AlignmentOrder::RefStart,
            strict_ops: true,
        }
    }

    /// Table order, unsupported operations skipped with a warning.
    pub fn legacy() -> Self {
        Self {
            order: AlignmentOrder::File,
            strict_ops: false,
        }
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self::strict()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileStats {
    pub alignments: u64,
    pub modified_bases: u64,
    pub inserted_bases: u64,
    pub deleted_bases: u64,
    /// Positions whose name was replaced by a different one.
    pub overwritten_positions: u64,
    pub skipped_ops: u64,
}

/// Read cursor into the query, write cursor into the reference (both 0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursors {
    pub read: usize,
    pub write: usize,
}

impl Cursors {
    pub fn new(write: usize) -> Self {
        Self { read: 0, write }
    }

    pub fn advance(self, op: EditOp) -> Self {
        match op {
            EditOp::Match => Self {
                read: self.read + 1,
                write: self.write + 1,
            },
            EditOp::Insert => Self {
                read: self.read + 1,
                ..self
            },
            EditOp::Delete => Self {
                write: self.write + 1,
                ..self
            },
            EditOp::Other(_) => self,
        }
    }
}

/// Working state of a reconciliation run: the live reference and the
/// modification names recorded so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub reference: Vec<char>,
    pub positions: PositionMap,
    pub stats: ReconcileStats,
}

impl Reconciliation {
    pub fn new(reference: &str) -> Self {
        Self {
            reference: reference.chars().collect(),
            ..Self::default()
        }
    }

    pub fn reference_string(&self) -> String {
        self.reference.iter().collect()
    }

    /// Apply one alignment and return the updated state.
    pub fn apply<D>(
        self,
        alignment: &AlignmentRecord,
        query: &str,
        dictionary: &D,
        config: &ReconcileConfig,
    ) -> Result<Self>
    where
        D: ModificationLookup + ?Sized,
    {
        let Reconciliation {
            reference,
            mut positions,
            mut stats,
        } = self;
        let query_id = alignment.query_id.as_str();
        let runs = cigar::parse_edit_script(&alignment.edit_script)?;
        let query: Vec<char> = query.chars().collect();
        let column = alignment.source_column();

        if alignment.ref_start == 0 {
            return Err(RefmodError::InvalidAnchor {
                query_id: query_id.to_string(),
                ref_start: alignment.ref_start,
            });
        }
        let anchor = (alignment.ref_start - 1) as usize;
        if anchor > reference.len() {
            return Err(overrun(query_id, SequenceKind::Reference, anchor, reference.len()));
        }

        tracing::debug!(
            query_id,
            ref_start = alignment.ref_start,
            script = %cigar::runs_to_string(&runs),
            "applying alignment"
        );

        let mut out: Vec<char> = Vec::with_capacity(reference.len());
        out.extend_from_slice(&reference[..anchor]);
        let mut cursors = Cursors::new(anchor);

        // Walked run by run; the expanded script is never materialized.
        for &(len, kind) in &runs {
            let op = EditOp::from(kind);
            if len == 0 {
                continue;
            }
            if let EditOp::Other(kind) = op {
                if config.strict_ops {
                    return Err(RefmodError::UnknownEditOperation {
                        query_id: query_id.to_string(),
                        op: kind.code(),
                    });
                }
                tracing::warn!(query_id, op = %kind.code(), len, "unsupported edit operation skipped");
                stats.skipped_ops += u64::from(len);
                continue;
            }

            for _ in 0..len {
                match op {
                    EditOp::Insert => {
                        if cursors.read >= query.len() {
                            return Err(overrun(query_id, SequenceKind::Query, cursors.read, query.len()));
                        }
                        stats.inserted_bases += 1;
                    }
                    EditOp::Delete => {
                        let base = reference_base(&reference, cursors.write, query_id)?;
                        out.push(base);
                        stats.deleted_bases += 1;
                    }
                    EditOp::Match => {
                        let symbol = *query.get(cursors.read).ok_or_else(|| {
                            overrun(query_id, SequenceKind::Query, cursors.read, query.len())
                        })?;
                        let base = reference_base(&reference, cursors.write, query_id)?;
                        if CANONICAL_BASES.contains(&symbol) {
                            out.push(base);
                        } else {
                            let entry = dictionary.lookup(column, symbol)?;
                            let pos = (cursors.write + 1) as RefPos;
                            if let Some(previous) = positions.insert(pos, entry.short_name.clone()) {
                                if previous != entry.short_name {
                                    tracing::warn!(
                                        pos,
                                        previous = %previous,
                                        replacement = %entry.short_name,
                                        query_id,
                                        "overlapping alignments disagree, keeping the later name"
                                    );
                                    stats.overwritten_positions += 1;
                                }
                            }
                            out.push(entry.canonical_base);
                            stats.modified_bases += 1;
                        }
                    }
                    EditOp::Other(_) => {}
                }
                cursors = cursors.advance(op);
            }
        }

        if cursors.write < reference.len() {
            out.extend_from_slice(&reference[cursors.write..]);
        }
        stats.alignments += 1;

        Ok(Reconciliation {
            reference: out,
            positions,
            stats,
        })
    }
}

fn reference_base(reference: &[char], cursor: usize, query_id: &str) -> Result<char> {
    reference
        .get(cursor)
        .copied()
        .ok_or_else(|| overrun(query_id, SequenceKind::Reference, cursor, reference.len()))
}

fn overrun(query_id: &str, sequence: SequenceKind, cursor: usize, length: usize) -> RefmodError {
    RefmodError::SequenceLengthMismatch {
        query_id: query_id.to_string(),
        sequence,
        cursor,
        length,
    }
}

/// Alignments in the order they will be applied.
pub fn order_alignments(alignments: &[AlignmentRecord], order: AlignmentOrder) -> Vec<&AlignmentRecord> {
    let mut ordered: Vec<&AlignmentRecord> = alignments.iter().collect();
    if order == AlignmentOrder::RefStart {
        ordered.sort_by_key(|aln| aln.ref_start);
    }
    ordered
}

/// Fold every alignment over `reference`, starting from an empty position map.
pub fn reconcile<D>(
    reference: &Sequence,
    queries: &FastaDb,
    alignments: &[AlignmentRecord],
    dictionary: &D,
    config: &ReconcileConfig,
) -> Result<Reconciliation>
where
    D: ModificationLookup + ?Sized,
{
    order_alignments(alignments, config.order)
        .into_iter()
        .try_fold(Reconciliation::new(&reference.bases), |state, alignment| {
            let query = queries.get(&alignment.query_id).ok_or_else(|| RefmodError::MissingQuery {
                query_id: alignment.query_id.clone(),
            })?;
            state.apply(alignment, &query.bases, dictionary, config)
        })
}
