use crate::GlobalConfiguration;
use anyhow::Result;
use clap::{Parser, ValueHint};
use qspace::Space;
use std::path::PathBuf;
use std::process::ExitCode;

/// Prints a space file's axes, without loading its `photons`/`contributions` arrays.
#[derive(Parser)]
pub struct Opts {
    /// Path of the space file to inspect.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

impl crate::Subcommand for Opts {
    fn run(&self, _: &GlobalConfiguration) -> Result<ExitCode> {
        let axes = Space::read_axes_only(&self.input)?;
        println!("{} dimension(s)", axes.len());
        for axis in &axes {
            println!(
                "  {} (min={}, max={}, res={}, count={})",
                axis.label(),
                axis.min(),
                axis.max(),
                axis.res(),
                axis.length()
            );
        }
        Ok(ExitCode::SUCCESS)
    }
}
