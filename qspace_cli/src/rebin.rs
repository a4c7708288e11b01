use crate::GlobalConfiguration;
use anyhow::{Context, Result};
use clap::{Parser, ValueHint};
use qspace::Space;
use std::path::PathBuf;
use std::process::ExitCode;

/// Coarsens a space's axes by integer factors (one per axis, in order) and writes the result.
#[derive(Parser)]
pub struct Opts {
    /// Path of the input space file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
    /// Path of the rebinned output file.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
    /// One positive even rebin factor per axis, in axis order.
    #[arg(required = true)]
    factors: Vec<u32>,
}

impl crate::Subcommand for Opts {
    fn run(&self, _: &GlobalConfiguration) -> Result<ExitCode> {
        let space = Space::read_from_file(&self.input)?;
        let rebinned = space
            .rebin(&self.factors)
            .context("rebin factors must match the space's dimension and each be even")?;
        rebinned.write_to_file(&self.output)?;
        Ok(ExitCode::SUCCESS)
    }
}
