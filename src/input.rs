//! Loading the configuration snapshot.
//!
//! The snapshot is either one JSON file or a directory of `*.json` fragments.
//! Fragments are read in path order, so the merge order never depends on the
//! directory listing order of the host.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::entry::{ConfigBuilder, EntryPatch, Fragment, SystemConfig};

/// Load and merge every fragment under `path`.
pub fn load(path: &Path) -> Result<SystemConfig> {
    let files = fragment_files(path)?;
    let mut builder = ConfigBuilder::new();

    for file in &files {
        debug!("reading fragment {}", file.display());
        let text = fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let fragment = parse_fragment(&text)
            .with_context(|| format!("Invalid configuration in {}", file.display()))?;
        apply_fragment(&mut builder, fragment)
            .with_context(|| format!("Invalid configuration in {}", file.display()))?;
    }

    Ok(builder.build()?)
}

/// Parse a single JSON document into a normalized snapshot.
pub fn parse(text: &str) -> Result<SystemConfig> {
    let mut builder = ConfigBuilder::new();
    apply_fragment(&mut builder, parse_fragment(text)?)?;
    Ok(builder.build()?)
}

pub fn parse_fragment(text: &str) -> Result<Fragment> {
    Ok(serde_json::from_str(text)?)
}

pub fn apply_fragment(builder: &mut ConfigBuilder, fragment: Fragment) -> Result<()> {
    for (key, value) in fragment.file_systems {
        let patch: EntryPatch = serde_json::from_value(value)
            .with_context(|| format!("fileSystems.\"{}\"", key))?;
        builder.patch(&key, patch)?;
    }
    for swap in fragment.swap_devices {
        builder.swap(swap);
    }
    Ok(())
}

/// JSON files making up the snapshot at `path`, in merge order.
pub fn fragment_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        bail!("Configuration not found at {}", path.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
        let is_json = entry.path().extension().is_some_and(|ext| ext == "json");
        if entry.file_type().is_file() && is_json {
            files.push(entry.into_path());
        }
    }

    if files.is_empty() {
        bail!("No *.json fragments in {}", path.display());
    }
    Ok(files)
}
