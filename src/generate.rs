//! One generation pass over a configuration snapshot.
//!
//! ```text
//! SystemConfig ──▶ resolve ──┬──▶ fstab::render        (single-device)
//!                            └──▶ unit::mount_units    (multi-device)
//!              ──────────────────▶ unit::format_units   (autoFormat)
//!              ──────────────────▶ aggregate            (all entries)
//! ```
//!
//! Everything is computed in memory first; an error anywhere means nothing is
//! produced.

use serde::Serialize;
use tracing::info;

use crate::aggregate::{self, SupportedFilesystems};
use crate::entry::SystemConfig;
use crate::error::ConfigError;
use crate::fstab;
use crate::resolve::resolve;
use crate::unit::{self, FormatUnit, MountUnit};

/// Everything derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifacts {
    pub fstab: String,
    pub mount_units: Vec<MountUnit>,
    pub format_units: Vec<FormatUnit>,
    pub filesystems: SupportedFilesystems,
}

pub fn generate(config: &SystemConfig) -> Result<Artifacts, ConfigError> {
    let resolution = resolve(&config.file_systems)?;

    let fstab = fstab::render(&resolution.single_device, &config.swap_devices);
    let mount_units = unit::mount_units(&resolution.multi_device);
    let format_units = unit::format_units(&config.file_systems);
    let filesystems = aggregate::supported_filesystems(&config.file_systems);

    info!(
        "generated {} fstab entries, {} swap, {} mount units, {} format units",
        resolution.single_device.len(),
        config.swap_devices.len(),
        mount_units.len(),
        format_units.len()
    );

    Ok(Artifacts {
        fstab,
        mount_units,
        format_units,
        filesystems,
    })
}
