//! Supported file system types for the initrd and the running system.
//!
//! Plain projections: order is kept, duplicates and `auto` pass through.

use serde::Serialize;

use crate::entry::FilesystemEntry;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedFilesystems {
    /// Types needed to mount `/` and every `neededForBoot` entry.
    pub initrd: Vec<String>,
    /// Types of every entry.
    pub runtime: Vec<String>,
}

pub fn initrd_types(entries: &[FilesystemEntry]) -> Vec<String> {
    entries
        .iter()
        .filter(|e| e.mount_point == "/" || e.needed_for_boot)
        .map(|e| e.fs_type.clone())
        .collect()
}

pub fn runtime_types(entries: &[FilesystemEntry]) -> Vec<String> {
    entries.iter().map(|e| e.fs_type.clone()).collect()
}

pub fn supported_filesystems(entries: &[FilesystemEntry]) -> SupportedFilesystems {
    SupportedFilesystems {
        initrd: initrd_types(entries),
        runtime: runtime_types(entries),
    }
}
