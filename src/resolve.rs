//! Device resolution.
//!
//! Splits entries into single-device and multi-device groups and resolves the
//! device path of every single-device entry. Resolution is purely syntactic:
//! whether the device exists is only checked by the format action on the
//! target system.

use std::collections::HashMap;
use std::fmt::Write;

use crate::entry::FilesystemEntry;
use crate::error::ConfigError;
use crate::unit::escape_path;

/// Directory udev populates with label symlinks.
pub const BY_LABEL_DIR: &str = "/dev/disk/by-label";

/// A single-device entry with its effective device path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleDevice<'a> {
    pub entry: &'a FilesystemEntry,
    pub device: String,
}

/// Entries split by how their devices are obtained. Input order is kept
/// within each group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub single_device: Vec<SingleDevice<'a>>,
    pub multi_device: Vec<&'a FilesystemEntry>,
}

/// Resolve all entries. Any invalid entry fails the whole resolution.
pub fn resolve(entries: &[FilesystemEntry]) -> Result<Resolution<'_>, ConfigError> {
    ensure_unique_mount_points(entries)?;
    ensure_unique_format_devices(entries)?;

    let mut resolution = Resolution::default();
    for entry in entries {
        if entry.is_multi_device() {
            resolution.multi_device.push(entry);
        } else {
            resolution.single_device.push(SingleDevice {
                entry,
                device: device_path(entry)?,
            });
        }
    }
    Ok(resolution)
}

/// Effective device of a single-device entry.
pub fn device_path(entry: &FilesystemEntry) -> Result<String, ConfigError> {
    if let Some(device) = &entry.device {
        return Ok(device.clone());
    }
    if let Some(label) = &entry.label {
        return Ok(format!("{}/{}", BY_LABEL_DIR, encode_label(label)));
    }
    Err(ConfigError::NoDevice {
        mount_point: entry.mount_point.clone(),
    })
}

/// Name udev gives the label symlink. ASCII alphanumerics, `#+-.:=@_` and
/// non-ASCII characters are kept, everything else becomes `\xNN`, so a
/// space turns into `\x20`.
pub fn encode_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() || "#+-.:=@_".contains(c) || !c.is_ascii() {
            out.push(c);
        } else {
            let _ = write!(out, "\\x{:02x}", c as u32);
        }
    }
    out
}

/// Reject two entries sharing a mount point. Mount points are compared by
/// the unit name systemd derives, so `/data` and `/data/` collide.
pub fn ensure_unique_mount_points(entries: &[FilesystemEntry]) -> Result<(), ConfigError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for entry in entries {
        if let Some(first) = seen.insert(escape_path(&entry.mount_point), &entry.name) {
            return Err(ConfigError::DuplicateMountPoint {
                mount_point: entry.mount_point.clone(),
                first: first.to_string(),
                second: entry.name.clone(),
            });
        }
    }
    Ok(())
}

/// Reject two auto-formatted entries on the same device. Both would get the
/// same format unit.
pub fn ensure_unique_format_devices(entries: &[FilesystemEntry]) -> Result<(), ConfigError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for entry in entries.iter().filter(|e| e.auto_format) {
        let Some(device) = &entry.device else {
            continue;
        };
        if let Some(first) = seen.insert(escape_path(device), &entry.name) {
            return Err(ConfigError::DuplicateFormatDevice {
                device: device.clone(),
                first: first.to_string(),
                second: entry.name.clone(),
            });
        }
    }
    Ok(())
}
