//! Unit descriptors for multi-device mounts and auto-format actions.
//!
//! Descriptors are plain data. How they look on disk is decided by a
//! [`UnitRenderer`]; [`SystemdRenderer`] produces native unit files.
//!
//! ```text
//! mkfs-dev-sdb.service ──Before──▶ data.mount ──Before──▶ local-fs.target
//!        │                              │
//!        └──Requires/After──▶ dev-sdb.device ◀──Requires/After──┘
//! ```

mod escape;
mod render;
mod synth;

pub use escape::{device_unit_name, escape_path, mount_unit_name};
pub use render::{SystemdRenderer, UnitRenderer};
pub use synth::{format_unit, format_units, mount_unit, mount_units};

use serde::Serialize;

/// Target every generated mount is ordered before and wanted by.
pub const LOCAL_FS_TARGET: &str = "local-fs.target";

/// Service that completes once udev has processed all queued events.
pub const UDEV_SETTLE_SERVICE: &str = "systemd-udev-settle.service";

/// Ordering and requirement edges of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependencies {
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub wants: Vec<String>,
    pub requires: Vec<String>,
    pub wanted_by: Vec<String>,
    pub requires_mounts_for: Vec<String>,
    /// When false the unit gets none of the implicit ordering systemd
    /// normally adds.
    pub default_dependencies: bool,
}

impl Default for Dependencies {
    fn default() -> Self {
        Self {
            before: Vec::new(),
            after: Vec::new(),
            wants: Vec::new(),
            requires: Vec::new(),
            wanted_by: Vec::new(),
            requires_mounts_for: Vec::new(),
            default_dependencies: true,
        }
    }
}

/// Mount of an assembled multi-device volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MountUnit {
    pub name: String,
    pub description: String,
    /// First member device.
    pub what: String,
    #[serde(rename = "where")]
    pub where_: String,
    pub fs_type: String,
    pub options: String,
    /// Device units that must be ready, one per member device.
    pub device_units: Vec<String>,
    pub deps: Dependencies,
}

/// What a format unit does when it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatAction {
    pub device: String,
    pub fs_type: String,
    pub format_options: Vec<String>,
}

/// One-shot unit creating a file system on a blank device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatUnit {
    pub name: String,
    pub description: String,
    /// Mount unit this format unit runs before.
    pub mount_unit: String,
    pub action: FormatAction,
    pub deps: Dependencies,
}
