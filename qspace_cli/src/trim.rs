use crate::GlobalConfiguration;
use anyhow::Result;
use clap::{Parser, ValueHint};
use qspace::Space;
use std::path::PathBuf;
use std::process::ExitCode;

/// Shrinks a space to the bounding box of its non-empty bins and writes the result.
#[derive(Parser)]
pub struct Opts {
    /// Path of the input space file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
    /// Path of the trimmed output file.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

impl crate::Subcommand for Opts {
    fn run(&self, _: &GlobalConfiguration) -> Result<ExitCode> {
        let mut space = Space::read_from_file(&self.input)?;
        space.trim();
        space.write_to_file(&self.output)?;
        Ok(ExitCode::SUCCESS)
    }
}
