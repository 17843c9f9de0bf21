use anyhow::Result;
use clap::Parser;
use mimalloc::MiMalloc;
use refmod_rs::cli::{self, Command};
use refmod_rs::pipeline;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    // Initialize tracing subscriber
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.quiet {
            EnvFilter::new("warn")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &args.command {
        Command::Convert(convert_args) => {
            let stats = pipeline::run_convert(convert_args)?;
            tracing::info!(
                headers = stats.headers,
                sequence_lines = stats.sequence_lines,
                changed_bases = stats.changed_bases,
                "refmod-rs convert: complete"
            );
        }
        Command::Update(update_args) => {
            let stats = pipeline::run_update(update_args)?;
            tracing::info!(
                queries = stats.queries,
                alignments = stats.alignments,
                modified_positions = stats.modified_positions,
                modified_bases = stats.reconcile.modified_bases,
                overwritten_positions = stats.reconcile.overwritten_positions,
                skipped_ops = stats.reconcile.skipped_ops,
                "refmod-rs update: complete"
            );
        }
        Command::Bedrmod(bedrmod_args) => {
            let stats = pipeline::run_bedrmod(bedrmod_args)?;
            tracing::info!(
                inputs = stats.inputs,
                rows = stats.rows,
                accepted = stats.accepted,
                intervals = stats.intervals,
                unnamed = stats.unnamed,
                "refmod-rs bedrmod: complete"
            );
        }
    }
    Ok(())
}
