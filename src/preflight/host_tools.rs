//! Tools the generated format units need.
//!
//! The units run on the target, so a missing tool on this host is only a
//! warning.

use crate::unit::FormatUnit;

use super::types::CheckResult;

/// Package providing `mkfs.<fs_type>`, for the hint in the report.
fn mkfs_package(fs_type: &str) -> &'static str {
    match fs_type {
        "ext2" | "ext3" | "ext4" => "e2fsprogs",
        "xfs" => "xfsprogs",
        "btrfs" => "btrfs-progs",
        "vfat" | "fat" | "msdos" => "dosfstools",
        "f2fs" => "f2fs-tools",
        "exfat" => "exfatprogs",
        "ntfs" => "ntfs-3g",
        _ => "the matching filesystem tools",
    }
}

/// Programs needed by `units`, in first-use order.
pub fn required_tools(units: &[FormatUnit]) -> Vec<(String, &'static str)> {
    let mut tools: Vec<(String, &'static str)> = Vec::new();
    if units.is_empty() {
        return tools;
    }
    tools.push(("blkid".to_string(), "util-linux"));
    for unit in units {
        let fs_type = &unit.action.fs_type;
        let tool = format!("mkfs.{}", fs_type);
        if !tools.iter().any(|(t, _)| *t == tool) {
            tools.push((tool, mkfs_package(fs_type)));
        }
    }
    tools
}

pub fn check_format_tools(units: &[FormatUnit]) -> Vec<CheckResult> {
    required_tools(units)
        .into_iter()
        .map(|(tool, package)| check_tool_exists(&tool, package))
        .collect()
}

fn check_tool_exists(tool: &str, package: &str) -> CheckResult {
    match which::which(tool) {
        Ok(path) => CheckResult::pass_with(tool, &path.to_string_lossy()),
        Err(_) => CheckResult::warn(
            tool,
            &format!(
                "Not found on this host. The target needs the '{}' package for auto-format units.",
                package
            ),
        ),
    }
}
