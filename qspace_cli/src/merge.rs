use crate::GlobalConfiguration;
use anyhow::Result;
use clap::{Parser, ValueHint};
use qspace::Space;
use std::path::PathBuf;
use std::process::ExitCode;

/// Merges one or more space files together.
#[derive(Parser)]
pub struct Opts {
    /// Path of the merged output file.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
    /// Path(s) of the files that should be merged.
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    input: Vec<PathBuf>,
}

impl crate::Subcommand for Opts {
    fn run(&self, _: &GlobalConfiguration) -> Result<ExitCode> {
        let (first, rest) = self.input.split_first().expect("clap enforces at least one input");
        let mut merged = Space::read_from_file(first)?;

        for path in rest {
            let next = Space::read_from_file(path)?;
            merged.merge(&next)?;
        }

        merged.write_to_file(&self.output)?;
        Ok(ExitCode::SUCCESS)
    }
}
