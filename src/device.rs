//! Format actions, executed on the target system.
//!
//! Generated format units run `recfs format`, which ends up in
//! [`run_format_action`]. The action:
//!
//! 1. fails with [`ActionError::DeviceMissing`] if the device node is absent,
//! 2. probes for any file system or partition table signature,
//! 3. creates the file system only if nothing was found.
//!
//! A device that carries any signature, even one of a different type, is
//! never touched.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::ActionError;
use crate::process::Cmd;
use crate::unit::FormatAction;

/// `blkid -p` exit code for "nothing found".
const BLKID_NOTHING_FOUND: i32 = 2;

/// Access to block devices.
pub trait BlockDevices {
    fn exists(&self, device: &Path) -> bool;

    /// Signature type found on `device`, `None` if it is blank.
    fn probe_signature(&self, device: &Path) -> Result<Option<String>, ActionError>;

    fn make_filesystem(
        &self,
        device: &Path,
        fs_type: &str,
        options: &[String],
    ) -> Result<(), ActionError>;
}

/// Real devices, probed with `blkid` and formatted with `mkfs.<type>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostBlockDevices;

impl BlockDevices for HostBlockDevices {
    fn exists(&self, device: &Path) -> bool {
        device.exists()
    }

    fn probe_signature(&self, device: &Path) -> Result<Option<String>, ActionError> {
        let result = Cmd::new("blkid")
            .args(["-p", "-o", "value", "-s", "TYPE", "-s", "PTTYPE"])
            .arg_path(device)
            .allow_fail()
            .run()
            .map_err(|e| ActionError::ProbeFailed {
                device: device.to_path_buf(),
                reason: e.to_string(),
            })?;

        match result.code() {
            0 => Ok(parse_signature(&result.stdout)),
            BLKID_NOTHING_FOUND => Ok(None),
            code => Err(ActionError::ProbeFailed {
                device: device.to_path_buf(),
                reason: format!("blkid exited with {}: {}", code, result.stderr_trimmed()),
            }),
        }
    }

    fn make_filesystem(
        &self,
        device: &Path,
        fs_type: &str,
        options: &[String],
    ) -> Result<(), ActionError> {
        Cmd::new(format!("mkfs.{}", fs_type))
            .args(options)
            .arg_path(device)
            .run()
            .map(|_| ())
            .map_err(|e| ActionError::FormatFailed {
                device: device.to_path_buf(),
                fs_type: fs_type.to_string(),
                reason: e.to_string(),
            })
    }
}

/// First reported signature. `blkid` succeeding with no value still means
/// something was recognized.
fn parse_signature(stdout: &str) -> Option<String> {
    let first = stdout.lines().map(str::trim).find(|l| !l.is_empty());
    Some(first.unwrap_or("unknown").to_string())
}

/// How a format action ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    Formatted,
    /// The device already had a signature.
    Skipped { existing: String },
}

pub fn run_format_action(
    devices: &dyn BlockDevices,
    action: &FormatAction,
) -> Result<FormatOutcome, ActionError> {
    let device = PathBuf::from(&action.device);
    if !devices.exists(&device) {
        return Err(ActionError::DeviceMissing(device));
    }

    if let Some(existing) = devices.probe_signature(&device)? {
        info!(
            "{} already contains a {} signature, not formatting",
            device.display(),
            existing
        );
        return Ok(FormatOutcome::Skipped { existing });
    }

    info!("creating {} file system on {}", action.fs_type, device.display());
    devices.make_filesystem(&device, &action.fs_type, &action.format_options)?;
    Ok(FormatOutcome::Formatted)
}
