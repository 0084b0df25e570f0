//! Check command - runs preflight checks.

use anyhow::Result;

use crate::config::Config;
use crate::preflight;

/// Execute the check command.
///
/// With `strict`, failed checks make the command fail.
pub fn cmd_check(config: &Config, strict: bool) -> Result<()> {
    if strict {
        preflight::run_preflight_or_fail(&config.input)
    } else {
        preflight::run_preflight(&config.input).print();
        Ok(())
    }
}
