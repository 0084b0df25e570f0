//! Error types.
//!
//! `ConfigError` covers everything that can be wrong with the configuration
//! snapshot. It is raised at generation time and aborts the whole pass.
//! `ActionError` is raised later, when a generated format unit runs.

use std::path::PathBuf;
use thiserror::Error;

/// Malformed or contradictory filesystem configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("file system '{key}' sets both 'device' and 'devices'")]
    DeviceAndDevices { key: String },

    #[error("file system '{key}' has an empty 'devices' list")]
    EmptyDevices { key: String },

    #[error("file system '{key}' has an empty mount point")]
    EmptyMountPoint { key: String },

    #[error("file system '{key}' has mount point '{mount_point}', which is not a normalized absolute path")]
    InvalidMountPoint { key: String, mount_point: String },

    #[error("no device or label specified for mount point '{mount_point}'")]
    NoDevice { mount_point: String },

    #[error("mount point '{mount_point}' is declared more than once ('{first}' and '{second}')")]
    DuplicateMountPoint {
        mount_point: String,
        first: String,
        second: String,
    },

    #[error("device '{device}' is auto-formatted by both '{first}' and '{second}'")]
    DuplicateFormatDevice {
        device: String,
        first: String,
        second: String,
    },

    #[error("file system '{key}': option '{field}' has conflicting definitions '{existing}' and '{new}'")]
    ConflictingDefinition {
        key: String,
        field: &'static str,
        existing: String,
        new: String,
    },

    #[error("file system '{key}' sets autoFormat but fsType is 'auto'")]
    AutoFormatWithoutType { key: String },
}

/// Failure of a format action on the target system.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("device {0} does not exist")]
    DeviceMissing(PathBuf),

    #[error("probing {device} failed: {reason}")]
    ProbeFailed { device: PathBuf, reason: String },

    #[error("creating {fs_type} file system on {device} failed: {reason}")]
    FormatFailed {
        device: PathBuf,
        fs_type: String,
        reason: String,
    },
}
