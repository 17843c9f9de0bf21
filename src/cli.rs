use crate::convert::ConversionMode;
use crate::reconcile::AlignmentOrder;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "refmod-rs",
    about = "Reconcile direct-RNA references with modification calls and build bedRMod tables",
    version
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Set logging level to WARN
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rewrite FASTA sequence lines (DNA reference to RNA, or mask query modifications)
    Convert(ConvertArgs),
    /// Rewrite a reference from modification-annotated query alignments
    Update(UpdateArgs),
    /// Aggregate per-molecule modification calls into a bedRMod table
    Bedrmod(BedrmodArgs),
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Input FASTA
    pub input: PathBuf,

    /// Output FASTA path
    #[arg(short = 'o', long = "out", value_name = "FASTA")]
    pub output: PathBuf,

    /// Conversion to apply to sequence lines
    #[arg(short = 'm', long, value_enum)]
    pub mode: ConversionMode,
}

#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// Reference FASTA (first record is used)
    #[arg(long = "reference", value_name = "FASTA")]
    pub reference: PathBuf,

    /// Query FASTA carrying modification codes
    #[arg(long = "query", value_name = "FASTA")]
    pub query: PathBuf,

    /// SAM-like alignment table of the queries against the reference
    #[arg(long = "alignment", value_name = "SAM")]
    pub alignment: PathBuf,

    /// Modification dictionary (TSV, or CSV by extension)
    #[arg(short = 'd', long = "dictionary", value_name = "TABLE")]
    pub dictionary: PathBuf,

    /// Output path for the rewritten reference
    #[arg(short = 'o', long = "out", value_name = "FASTA")]
    pub output: PathBuf,

    /// Output path for the position/name table
    #[arg(short = 'm', long = "meta", value_name = "TSV")]
    pub meta: PathBuf,

    /// Order in which alignments are applied
    #[arg(long, value_enum, default_value_t = AlignmentOrder::RefStart)]
    pub order: AlignmentOrder,

    /// Skip N/S/H/P/=/X operations with a warning instead of failing
    #[arg(long)]
    pub allow_unsupported_ops: bool,
}

#[derive(Parser, Debug)]
pub struct BedrmodArgs {
    /// Call tables, one per region
    #[arg(short = 'c', long = "calls", value_name = "CSV", required = true, num_args = 1..)]
    pub calls: Vec<PathBuf>,

    /// Position/name tables written by `update`, in the same order as --calls
    #[arg(short = 'm', long = "meta", value_name = "TSV", required = true, num_args = 1..)]
    pub meta: Vec<PathBuf>,

    /// Chromosome label per call table; derived from the file name when omitted
    #[arg(long = "chrom", value_name = "NAME", num_args = 1..)]
    pub chrom: Vec<String>,

    /// `_`-separated field of the call table's file stem used as the chromosome label
    #[arg(long, default_value_t = 1)]
    pub chrom_field: usize,

    /// Highest accepted Best ASR
    #[arg(long, default_value_t = 1.0)]
    pub max_asr: f64,

    /// Lowest accepted Conf. Score
    #[arg(long, default_value_t = 100.0)]
    pub min_conf: f64,

    /// Drop sites without an entry in the position/name table
    #[arg(long)]
    pub drop_unnamed: bool,

    /// Output bedRMod table
    #[arg(short = 'o', long = "out", value_name = "TSV")]
    pub output: PathBuf,
}
