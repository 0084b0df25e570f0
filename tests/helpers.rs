//! Shared test utilities for recfs tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use recfs::config::Config;
use recfs::device::BlockDevices;
use recfs::entry::{ConfigBuilder, EntryPatch, SwapEntry, SystemConfig};
use recfs::error::ActionError;

/// Test environment with a scratch input directory and staging root.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Fragment directory
    pub input: PathBuf,
    /// Staging root artifacts are written to
    pub output: PathBuf,
    /// Base directory (project root simulation)
    pub base_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = temp_dir.path();

        let input = base.join("recfs.d");
        let output = base.join("output/root");
        fs::create_dir_all(&input).expect("Failed to create input dir");

        Self {
            base_dir: base.to_path_buf(),
            input,
            output,
            _temp_dir: temp_dir,
        }
    }

    /// Write a fragment into the input directory.
    pub fn fragment(&self, name: &str, json: &str) -> PathBuf {
        let path = self.input.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create fragment dir");
        }
        fs::write(&path, json).expect("Failed to write fragment");
        path
    }

    /// Tool configuration pointing at this environment.
    pub fn config(&self) -> Config {
        Config {
            input: self.input.clone(),
            output: self.output.clone(),
            unit_dir: PathBuf::from("etc/systemd/system"),
            exec: PathBuf::from("/usr/bin/recfs"),
        }
    }

    pub fn unit_path(&self, name: &str) -> PathBuf {
        self.output.join("etc/systemd/system").join(name)
    }
}

/// Build a snapshot from `(key, patch JSON)` pairs.
pub fn snapshot(entries: &[(&str, &str)], swap: &[&str]) -> SystemConfig {
    let mut builder = ConfigBuilder::new();
    for (key, json) in entries {
        let patch: EntryPatch = serde_json::from_str(json).expect("invalid patch JSON");
        builder.patch(key, patch).expect("patch rejected");
    }
    for device in swap {
        builder.swap(SwapEntry {
            device: device.to_string(),
        });
    }
    builder.build().expect("snapshot rejected")
}

/// Assert that a symlink exists and points to the expected target.
pub fn assert_symlink(path: &Path, expected_target: &str) {
    assert!(
        path.is_symlink(),
        "Expected symlink at {}, but it's not a symlink",
        path.display()
    );

    let target = fs::read_link(path).expect("Failed to read symlink");
    assert_eq!(
        target.to_string_lossy(),
        expected_target,
        "Symlink {} points to {:?}, expected {}",
        path.display(),
        target,
        expected_target
    );
}

/// Assert that a file contains expected content.
pub fn assert_file_contains(path: &Path, expected: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
    assert!(
        content.contains(expected),
        "File {} does not contain expected content.\nExpected to find: {}\nActual content: {}",
        path.display(),
        expected,
        content
    );
}

pub fn assert_file_exists(path: &Path) {
    assert!(path.is_file(), "Expected file at {}", path.display());
}

/// In-memory block devices recording every mkfs call.
#[derive(Default)]
pub struct FakeDevices {
    pub present: Vec<PathBuf>,
    pub signatures: HashMap<PathBuf, String>,
    pub probe_error: bool,
    pub formatted: RefCell<Vec<(PathBuf, String, Vec<String>)>>,
}

impl FakeDevices {
    pub fn with_device(mut self, device: &str) -> Self {
        self.present.push(PathBuf::from(device));
        self
    }

    pub fn with_signature(mut self, device: &str, signature: &str) -> Self {
        self.present.push(PathBuf::from(device));
        self.signatures
            .insert(PathBuf::from(device), signature.to_string());
        self
    }
}

impl BlockDevices for FakeDevices {
    fn exists(&self, device: &Path) -> bool {
        self.present.iter().any(|d| d == device)
    }

    fn probe_signature(&self, device: &Path) -> Result<Option<String>, ActionError> {
        if self.probe_error {
            return Err(ActionError::ProbeFailed {
                device: device.to_path_buf(),
                reason: "probe exploded".to_string(),
            });
        }
        Ok(self.signatures.get(device).cloned())
    }

    fn make_filesystem(
        &self,
        device: &Path,
        fs_type: &str,
        options: &[String],
    ) -> Result<(), ActionError> {
        self.formatted
            .borrow_mut()
            .push((device.to_path_buf(), fs_type.to_string(), options.to_vec()));
        Ok(())
    }
}
