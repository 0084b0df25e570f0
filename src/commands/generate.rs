//! Generate command - writes all artifacts.

use anyhow::{Context, Result};

use crate::artifact::{Layout, OutputSet, WriteOutcome};
use crate::config::Config;
use crate::generate::generate;
use crate::input;
use crate::timing::Timer;
use crate::unit::SystemdRenderer;

/// Execute the generate command.
pub fn cmd_generate(config: &Config, force: bool) -> Result<WriteOutcome> {
    let timer = Timer::start("generate");

    let snapshot = input::load(&config.input)?;
    let artifacts = generate(&snapshot).context("Generation failed, nothing was written")?;

    let renderer = SystemdRenderer::new(&config.exec);
    let layout = Layout::new(&config.unit_dir);
    let outputs = OutputSet::render(&artifacts, &layout, &renderer);
    let outcome = outputs.write(&config.output, force)?;

    match &outcome {
        WriteOutcome::UpToDate => {
            println!("Up to date: {}", config.output.display());
        }
        WriteOutcome::Written { files, removed } => {
            println!("Wrote {} files to {}", files, config.output.display());
            if *removed > 0 {
                println!("  Removed {} stale files", removed);
            }
        }
    }

    timer.finish();
    Ok(outcome)
}
