//! Hash-based change detection for generated artifacts.
//!
//! Every write records a manifest with the SHA256 of all artifact paths and
//! contents. A later pass with the same hash leaves the tree untouched, so
//! consumers that diff the output only see real changes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Manifest file name, relative to the output root.
pub const MANIFEST_FILE: &str = ".recfs-manifest.json";

/// What the previous write produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub hash: String,
    /// Regular files, relative to the output root.
    pub files: Vec<String>,
    /// Symlinks, relative to the output root.
    pub links: Vec<String>,
}

/// SHA256 over `(name, content)` pairs, in order.
pub fn hash_entries<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut hasher = Sha256::new();
    for (name, content) in entries {
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        hasher.update(content);
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}

/// Read the manifest, if there is a usable one.
///
/// An unreadable or corrupt manifest is treated as missing, which forces a
/// full rewrite.
pub fn read_manifest(path: &Path) -> Option<Manifest> {
    if !path.exists() {
        return None;
    }
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("failed to read {}: {} (will rewrite)", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(m) => Some(m),
        Err(e) => {
            warn!("ignoring corrupt manifest {}: {}", path.display(), e);
            None
        }
    }
}

pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
