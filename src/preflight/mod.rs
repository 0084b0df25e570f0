//! Preflight checks.
//!
//! Validates the configuration snapshot and looks for the tools generated
//! format units will call. Run with `recfs check`.

mod host_tools;
mod types;

use std::path::Path;

use anyhow::{bail, Result};
use tracing::info;

pub use host_tools::required_tools;
pub use types::{CheckResult, CheckStatus, PreflightReport};

use crate::generate::generate;
use crate::input;

/// Run all preflight checks against the snapshot at `input_path`.
pub fn run_preflight(input_path: &Path) -> PreflightReport {
    let mut checks = Vec::new();

    info!("checking configuration {}", input_path.display());
    let config = match input::load(input_path) {
        Ok(config) => {
            checks.push(CheckResult::pass_with(
                "configuration",
                &format!(
                    "{} file systems, {} swap devices",
                    config.file_systems.len(),
                    config.swap_devices.len()
                ),
            ));
            config
        }
        Err(e) => {
            checks.push(CheckResult::fail("configuration", &format!("{:#}", e)));
            return PreflightReport { checks };
        }
    };

    let artifacts = match generate(&config) {
        Ok(artifacts) => {
            checks.push(CheckResult::pass("device resolution"));
            artifacts
        }
        Err(e) => {
            checks.push(CheckResult::fail("device resolution", &e.to_string()));
            return PreflightReport { checks };
        }
    };

    if artifacts.filesystems.initrd.is_empty() {
        checks.push(CheckResult::warn(
            "root file system",
            "No entry mounts '/' and none is neededForBoot",
        ));
    } else {
        checks.push(CheckResult::pass_with(
            "root file system",
            &format!("initrd types: {}", artifacts.filesystems.initrd.join(", ")),
        ));
    }

    info!("checking format tools");
    checks.extend(host_tools::check_format_tools(&artifacts.format_units));

    PreflightReport { checks }
}

/// Run preflight and bail if any checks fail.
pub fn run_preflight_or_fail(input_path: &Path) -> Result<()> {
    let report = run_preflight(input_path);
    report.print();

    if !report.all_passed() {
        bail!(
            "Preflight failed: {} check(s) failed. Fix the issues above before generating.",
            report.fail_count()
        );
    }

    println!("All preflight checks passed!\n");
    Ok(())
}
