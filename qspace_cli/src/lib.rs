#![allow(clippy::missing_errors_doc)]
#![allow(missing_docs)]

mod backend;
mod info;
mod merge;
mod progress;
mod rebin;
mod reduce;
mod trim;

use clap::Parser;
use enum_dispatch::enum_dispatch;
use std::process::ExitCode;

/// Flags shared by every subcommand.
#[derive(Parser)]
pub struct GlobalConfiguration {
    /// Suppress progress output; only errors are printed.
    #[arg(global = true, long)]
    pub quiet: bool,
}

#[enum_dispatch]
pub trait Subcommand {
    /// Runs the subcommand, returning the process exit code.
    ///
    /// # Errors
    ///
    /// Returns an error for any unrecoverable driver failure (bad configuration, an unwritable
    /// output path). Partial failures within a run — a skipped scan, a merge branch that's
    /// retried later — are reported on the progress channel and do not surface as `Err`.
    fn run(&self, cfg: &GlobalConfiguration) -> anyhow::Result<ExitCode>;
}

#[enum_dispatch(Subcommand)]
#[derive(Parser)]
pub enum SubcommandEnum {
    /// Runs the local or cluster job pipeline and writes the resulting space.
    Reduce(reduce::Opts),
    /// Merges two or more space files.
    Merge(merge::Opts),
    /// Prints a space file's axes without loading its dense arrays.
    Info(info::Opts),
    /// Shrinks a space to the bounding box of its non-empty bins.
    Trim(trim::Opts),
    /// Coarsens a space's axes by integer factors.
    Rebin(rebin::Opts),
}

/// Top-level CLI parser.
#[derive(Parser)]
#[command(arg_required_else_help = true, author, about, name = "qspace", version)]
pub struct Opts {
    #[command(flatten)]
    pub configuration: GlobalConfiguration,
    #[command(subcommand)]
    pub subcommand: SubcommandEnum,
}
