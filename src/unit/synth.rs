use std::path::Path;

use tracing::{debug, warn};

use super::{
    device_unit_name, escape_path, mount_unit_name, Dependencies, FormatAction, FormatUnit,
    MountUnit, LOCAL_FS_TARGET, UDEV_SETTLE_SERVICE,
};
use crate::entry::FilesystemEntry;

/// Mount unit for a multi-device entry. `None` for single-device entries,
/// which go to the mount table instead.
pub fn mount_unit(entry: &FilesystemEntry) -> Option<MountUnit> {
    let devices = entry.devices.as_ref()?;
    let what = devices.first()?.clone();
    let device_units: Vec<String> = devices.iter().map(|d| device_unit_name(d)).collect();

    let mut after = vec![UDEV_SETTLE_SERVICE.to_string()];
    after.extend(device_units.iter().cloned());

    Some(MountUnit {
        name: mount_unit_name(&entry.mount_point),
        description: format!("Mount {}", devices.join(", ")),
        what,
        where_: entry.mount_point.clone(),
        fs_type: entry.fs_type.clone(),
        options: entry.options_string(),
        device_units: device_units.clone(),
        deps: Dependencies {
            before: vec![LOCAL_FS_TARGET.to_string()],
            after,
            wants: vec![UDEV_SETTLE_SERVICE.to_string()],
            requires: device_units,
            wanted_by: vec![LOCAL_FS_TARGET.to_string()],
            ..Dependencies::default()
        },
    })
}

pub fn mount_units(multi_device: &[&FilesystemEntry]) -> Vec<MountUnit> {
    multi_device
        .iter()
        .filter_map(|entry| mount_unit(entry))
        .collect()
}

/// Format unit for an entry with `autoFormat` and an explicit `device`.
pub fn format_unit(entry: &FilesystemEntry) -> Option<FormatUnit> {
    if !entry.auto_format {
        return None;
    }
    let Some(device) = entry.device.as_ref() else {
        warn!(
            "{}: autoFormat needs an explicit device, no format unit generated",
            entry.mount_point
        );
        return None;
    };

    let escaped = escape_path(device);
    let device_unit = device_unit_name(device);
    let mount_unit = mount_unit_name(&entry.mount_point);
    let requires_mounts_for = Path::new(device)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .filter(|p| !p.is_empty())
        .into_iter()
        .collect();

    debug!("{}: format unit mkfs-{}.service", entry.mount_point, escaped);

    Some(FormatUnit {
        name: format!("mkfs-{}.service", escaped),
        description: format!("Initialisation of Filesystem {}", device),
        mount_unit: mount_unit.clone(),
        action: FormatAction {
            device: device.clone(),
            fs_type: entry.fs_type.clone(),
            format_options: entry.format_options.clone(),
        },
        deps: Dependencies {
            before: vec![
                mount_unit.clone(),
                format!("systemd-fsck@{}.service", escaped),
            ],
            after: vec![device_unit.clone()],
            requires: vec![device_unit],
            wanted_by: vec![mount_unit],
            requires_mounts_for,
            default_dependencies: false,
            ..Dependencies::default()
        },
    })
}

pub fn format_units(entries: &[FilesystemEntry]) -> Vec<FormatUnit> {
    entries.iter().filter_map(format_unit).collect()
}
