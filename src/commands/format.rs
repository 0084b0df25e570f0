//! Format command - the action behind generated `mkfs-*.service` units.

use anyhow::Result;

use crate::device::{run_format_action, FormatOutcome, HostBlockDevices};
use crate::unit::FormatAction;

/// Execute the format command.
pub fn cmd_format(device: String, fs_type: String, format_options: Vec<String>) -> Result<()> {
    let action = FormatAction {
        device,
        fs_type,
        format_options,
    };

    match run_format_action(&HostBlockDevices, &action)? {
        FormatOutcome::Formatted => {
            println!("Created {} file system on {}", action.fs_type, action.device);
        }
        FormatOutcome::Skipped { existing } => {
            println!("{} already contains {}, left untouched", action.device, existing);
        }
    }
    Ok(())
}
