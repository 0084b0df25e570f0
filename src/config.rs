//! Configuration management for recfs.
//!
//! Reads configuration from a .env file and environment variables.
//! Environment variables take precedence over the .env file; command line
//! flags take precedence over both (applied by the command handlers).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::artifact::DEFAULT_UNIT_DIR;

/// Default configuration snapshot, relative to the base directory.
pub const DEFAULT_INPUT: &str = "recfs.json";
/// Default staging root, relative to the base directory.
pub const DEFAULT_OUTPUT: &str = "output/root";
/// Where generated format units find the recfs binary on the target.
pub const DEFAULT_EXEC: &str = "/usr/bin/recfs";

/// recfs configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Snapshot file or fragment directory (RECFS_INPUT)
    pub input: PathBuf,
    /// Staging root artifacts are written under (RECFS_OUTPUT)
    pub output: PathBuf,
    /// Unit directory relative to the staging root (RECFS_UNIT_DIR)
    pub unit_dir: PathBuf,
    /// recfs path used in ExecStart= of format units (RECFS_EXEC)
    pub exec: PathBuf,
}

impl Config {
    /// Load configuration from `<base_dir>/.env` and the environment.
    pub fn load(base_dir: &Path) -> Self {
        let mut env_vars = HashMap::new();

        let env_path = base_dir.join(".env");
        if env_path.exists() {
            match dotenvy::from_path_iter(&env_path) {
                Ok(iter) => {
                    for item in iter {
                        match item {
                            Ok((key, value)) => {
                                env_vars.insert(key, value);
                            }
                            Err(e) => warn!("skipping line in {}: {}", env_path.display(), e),
                        }
                    }
                }
                Err(e) => warn!("failed to read {}: {}", env_path.display(), e),
            }
        }

        // Environment variables override .env file
        env_vars.extend(std::env::vars());

        let path_var = |key: &str, default: &str| {
            let path = PathBuf::from(env_vars.get(key).map(String::as_str).unwrap_or(default));
            if path.is_absolute() {
                path
            } else {
                base_dir.join(path)
            }
        };

        let input = path_var("RECFS_INPUT", DEFAULT_INPUT);
        let output = path_var("RECFS_OUTPUT", DEFAULT_OUTPUT);
        let unit_dir = PathBuf::from(
            env_vars
                .get("RECFS_UNIT_DIR")
                .map(String::as_str)
                .unwrap_or(DEFAULT_UNIT_DIR),
        );
        let exec = PathBuf::from(
            env_vars
                .get("RECFS_EXEC")
                .map(String::as_str)
                .unwrap_or(DEFAULT_EXEC),
        );

        Self {
            input,
            output,
            unit_dir,
            exec,
        }
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  RECFS_INPUT: {}", self.input.display());
        println!("  RECFS_OUTPUT: {}", self.output.display());
        println!("  RECFS_UNIT_DIR: {}", self.unit_dir.display());
        println!("  RECFS_EXEC: {}", self.exec.display());
        if self.input.exists() {
            println!("  Input: FOUND");
        } else {
            println!("  Input: NOT FOUND");
        }
    }
}
