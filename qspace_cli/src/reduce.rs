use crate::backend::CsvBackend;
use crate::progress::IndicatifProgressSink;
use crate::GlobalConfiguration;
use anyhow::{Context, Result};
use clap::{Parser, ValueHint};
use qspace::dispatcher::{run_local, Configuration, IdentityProjection, ProgressSink, TracingProgressSink};
use std::path::PathBuf;
use std::process::ExitCode;

/// Runs the local job pipeline over a directory of per-scan CSV inputs and writes the merged
/// space to the configured destination.
#[derive(Parser)]
pub struct Opts {
    /// Path to the pipeline configuration file (`[dispatcher]`/`[input]`/`[projection]` sections).
    #[arg(value_hint = ValueHint::FilePath)]
    config: PathBuf,
    /// Directory of per-scan CSV files; overrides the `[input] directory` configuration key.
    #[arg(long, value_hint = ValueHint::DirPath)]
    input_dir: Option<PathBuf>,
}

impl crate::Subcommand for Opts {
    fn run(&self, cfg: &GlobalConfiguration) -> Result<ExitCode> {
        let text = std::fs::read_to_string(&self.config)
            .with_context(|| format!("reading configuration {}", self.config.display()))?;
        let config = Configuration::from_ini(&text)?;

        let input_dir = self
            .input_dir
            .clone()
            .or_else(|| config.input.get("directory").map(PathBuf::from))
            .context("no input directory given on the command line or in [input]")?;

        let target_axes = config.target_axes()?;
        let backend = CsvBackend::discover(&input_dir)?;
        let workers = config.worker_count()?;

        let progress: Box<dyn ProgressSink> = if cfg.quiet {
            Box::new(TracingProgressSink)
        } else {
            Box::new(IndicatifProgressSink::new())
        };

        let result = run_local(
            target_axes,
            &backend,
            &IdentityProjection,
            progress.as_ref(),
            workers,
        )?;

        let Some(mut space) = result else {
            tracing::warn!("every scan failed; nothing was written");
            return Ok(ExitCode::FAILURE);
        };

        space.trim();
        space.write_to_file(config.output_path()?)?;

        Ok(ExitCode::SUCCESS)
    }
}
