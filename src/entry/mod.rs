//! Filesystem and swap entries.
//!
//! A [`FilesystemEntry`] is the normalized, immutable form of one
//! `fileSystems.<key>` declaration. Declarations arrive as one or more
//! [`EntryPatch`]es which are merged by [`EntryBuilder`] into a [`RawEntry`],
//! then normalized here (defaults applied, contradictions rejected).
//!
//! # Defaults
//!
//! | Field         | Default                          |
//! |---------------|----------------------------------|
//! | mountPoint    | the entry key                    |
//! | fsType        | `auto`                           |
//! | options       | `defaults,relatime`              |
//! | formatOptions | `-q` for ext2/3/4, xfs and btrfs |
//!
//! An options list that is empty after merging also gets the default, since
//! a mount table line cannot have an empty options field.

mod patch;

pub use patch::{ConfigBuilder, EntryBuilder, EntryPatch, Fragment};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File system type used when none is declared.
pub const DEFAULT_FS_TYPE: &str = "auto";

/// Mount options used when no declaration sets any.
pub const DEFAULT_OPTIONS: &[&str] = &["defaults", "relatime"];

/// File system types whose mkfs accepts `-q`.
const QUIET_MKFS_TYPES: &[&str] = &["ext2", "ext3", "ext4", "xfs", "btrfs"];

/// One requested mount, after merging and normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesystemEntry {
    /// Key the entry was declared under.
    pub name: String,
    pub mount_point: String,
    pub device: Option<String>,
    /// Member devices of an assembled volume. Never empty when set.
    pub devices: Option<Vec<String>>,
    pub label: Option<String>,
    pub fs_type: String,
    pub options: Vec<String>,
    pub auto_format: bool,
    /// Extra arguments for `mkfs.<fsType>`.
    pub format_options: Vec<String>,
    pub no_check: bool,
    pub needed_for_boot: bool,
}

/// Merged but not yet normalized declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub mount_point: Option<String>,
    pub device: Option<String>,
    pub devices: Option<Vec<String>>,
    pub label: Option<String>,
    pub fs_type: Option<String>,
    pub options: Option<Vec<String>>,
    pub auto_format: bool,
    pub format_options: Option<Vec<String>>,
    pub no_check: bool,
    pub needed_for_boot: bool,
}

impl FilesystemEntry {
    /// Validate `raw` and apply defaults.
    pub fn normalize(key: &str, raw: RawEntry) -> Result<Self, ConfigError> {
        if raw.device.is_some() && raw.devices.is_some() {
            return Err(ConfigError::DeviceAndDevices {
                key: key.to_string(),
            });
        }
        if raw.devices.as_ref().is_some_and(|d| d.is_empty()) {
            return Err(ConfigError::EmptyDevices {
                key: key.to_string(),
            });
        }

        let mount_point = raw.mount_point.unwrap_or_else(|| key.to_string());
        if mount_point.is_empty() {
            return Err(ConfigError::EmptyMountPoint {
                key: key.to_string(),
            });
        }
        if !is_normalized_absolute(&mount_point) {
            return Err(ConfigError::InvalidMountPoint {
                key: key.to_string(),
                mount_point,
            });
        }

        let fs_type = raw
            .fs_type
            .unwrap_or_else(|| DEFAULT_FS_TYPE.to_string());
        if raw.auto_format && fs_type == DEFAULT_FS_TYPE {
            return Err(ConfigError::AutoFormatWithoutType {
                key: key.to_string(),
            });
        }

        let mut options = raw.options.unwrap_or_default();
        options.retain(|o| !o.is_empty());
        if options.is_empty() {
            options = DEFAULT_OPTIONS.iter().map(|o| o.to_string()).collect();
        }
        let format_options = raw
            .format_options
            .unwrap_or_else(|| default_format_options(&fs_type));

        Ok(Self {
            name: key.to_string(),
            mount_point,
            device: raw.device,
            devices: raw.devices,
            label: raw.label,
            fs_type,
            options,
            auto_format: raw.auto_format,
            format_options,
            no_check: raw.no_check,
            needed_for_boot: raw.needed_for_boot,
        })
    }

    /// Entry assembled from more than one device.
    pub fn is_multi_device(&self) -> bool {
        self.devices.is_some()
    }

    /// Options as they appear in the mount table.
    pub fn options_string(&self) -> String {
        self.options.join(",")
    }
}

/// Absolute and free of `.` and `..` components.
fn is_normalized_absolute(path: &str) -> bool {
    path.starts_with('/') && !path.split('/').any(|c| c == "." || c == "..")
}

fn default_format_options(fs_type: &str) -> Vec<String> {
    if QUIET_MKFS_TYPES.contains(&fs_type) {
        vec!["-q".to_string()]
    } else {
        Vec::new()
    }
}

/// A device used for paging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwapEntry {
    pub device: String,
}

/// The complete, immutable configuration snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfig {
    pub file_systems: Vec<FilesystemEntry>,
    pub swap_devices: Vec<SwapEntry>,
}
