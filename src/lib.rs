//! refmod-rs: reconcile direct-RNA references with modification-annotated
//! alignments, then aggregate per-molecule modification calls into bedRMod rows.
//!
//! # Library usage
//!
//! ```no_run
//! use refmod_rs::{AlignmentRecord, FastaDb, ModificationDictionary, ReconcileConfig, reconcile};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let reference = FastaDb::load(Path::new("ref.fa"))?.into_reference("ref.fa")?;
//! let queries = FastaDb::load(Path::new("qry.fa"))?;
//! let dictionary = ModificationDictionary::load(Path::new("modifications.tsv"))?;
//! let alignments = vec![AlignmentRecord::new("read1_ont", 12, "20M1I5M")];
//!
//! let result = reconcile(&reference, &queries, &alignments, &dictionary, &ReconcileConfig::default())?;
//! for (pos, name) in &result.positions {
//!     println!("{pos}\t{name}");
//! }
//! # Ok(())
//! # }
//! ```

// Binary-only plumbing.
pub mod cli;
pub mod pipeline;

// Library surface.
pub mod aggregate;
pub mod alignment;
pub mod cigar;
pub mod convert;
pub mod dictionary;
pub mod error;
pub mod fasta;
pub mod reconcile;
pub mod tables;
pub mod types;

// Flat re-exports for the most commonly used public types.
pub use aggregate::{AggregatedInterval, AggregationConfig, UnmatchedNames, aggregate_calls, aggregate_rows};
pub use alignment::AlignmentRecord;
pub use cigar::{CigarOp, EditOp, expand_edit_script};
pub use dictionary::{ModificationDictionary, ModificationEntry, ModificationLookup};
pub use error::RefmodError;
pub use fasta::{FastaDb, Sequence};
pub use reconcile::{AlignmentOrder, ReconcileConfig, Reconciliation, reconcile};
pub use types::PositionMap;
