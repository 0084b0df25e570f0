//! Writing generated artifacts into a staging root.
//!
//! Layout under the root:
//!
//! ```text
//! etc/fstab
//! etc/recfs/supported-filesystems
//! etc/recfs/initrd-supported-filesystems
//! <unit_dir>/<unit>
//! <unit_dir>/<target>.wants/<unit> -> ../<unit>
//! .recfs-manifest.json
//! ```

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::cache::{self, Manifest, MANIFEST_FILE};
use crate::generate::Artifacts;
use crate::unit::{Dependencies, UnitRenderer};

pub const FSTAB_PATH: &str = "etc/fstab";
pub const RUNTIME_TYPES_PATH: &str = "etc/recfs/supported-filesystems";
pub const INITRD_TYPES_PATH: &str = "etc/recfs/initrd-supported-filesystems";
pub const DEFAULT_UNIT_DIR: &str = "etc/systemd/system";

/// Where units go, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub unit_dir: PathBuf,
}

impl Layout {
    /// Absolute unit directories are taken relative to the output root.
    pub fn new(unit_dir: impl AsRef<Path>) -> Self {
        let unit_dir = unit_dir.as_ref();
        let unit_dir = unit_dir.strip_prefix("/").unwrap_or(unit_dir);
        Self {
            unit_dir: unit_dir.to_path_buf(),
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(DEFAULT_UNIT_DIR)
    }
}

/// A regular file to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: String,
}

/// A `.wants/` symlink enabling a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WantsLink {
    pub path: PathBuf,
    pub target: String,
}

/// Result of [`OutputSet::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Manifest hash matched and every file was present.
    UpToDate,
    Written { files: usize, removed: usize },
}

/// Rendered files, in a fixed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSet {
    pub files: Vec<OutputFile>,
    pub links: Vec<WantsLink>,
}

impl OutputSet {
    /// Render `artifacts` for `layout`.
    pub fn render(artifacts: &Artifacts, layout: &Layout, renderer: &dyn UnitRenderer) -> Self {
        let mut set = Self {
            files: vec![
                OutputFile {
                    path: PathBuf::from(FSTAB_PATH),
                    contents: artifacts.fstab.clone(),
                },
                OutputFile {
                    path: PathBuf::from(RUNTIME_TYPES_PATH),
                    contents: lines(&artifacts.filesystems.runtime),
                },
                OutputFile {
                    path: PathBuf::from(INITRD_TYPES_PATH),
                    contents: lines(&artifacts.filesystems.initrd),
                },
            ],
            links: Vec::new(),
        };

        for unit in &artifacts.mount_units {
            set.add_unit(layout, &unit.name, renderer.render_mount(unit), &unit.deps);
        }
        for unit in &artifacts.format_units {
            set.add_unit(layout, &unit.name, renderer.render_format(unit), &unit.deps);
        }
        set
    }

    fn add_unit(&mut self, layout: &Layout, name: &str, contents: String, deps: &Dependencies) {
        self.files.push(OutputFile {
            path: layout.unit_dir.join(name),
            contents,
        });
        for target in &deps.wanted_by {
            self.links.push(WantsLink {
                path: layout
                    .unit_dir
                    .join(format!("{}.wants", target))
                    .join(name),
                target: format!("../{}", name),
            });
        }
    }

    /// Hash of every path and content in this set.
    pub fn hash(&self) -> String {
        let files = self
            .files
            .iter()
            .map(|f| (path_str(&f.path), f.contents.as_bytes()));
        let links = self
            .links
            .iter()
            .map(|l| (path_str(&l.path), l.target.as_bytes()));
        cache::hash_entries(files.chain(links))
    }

    fn manifest(&self) -> Manifest {
        Manifest {
            hash: self.hash(),
            files: self.files.iter().map(|f| path_str(&f.path).to_string()).collect(),
            links: self.links.iter().map(|l| path_str(&l.path).to_string()).collect(),
        }
    }

    fn all_present(&self, root: &Path) -> bool {
        self.files.iter().all(|f| root.join(&f.path).is_file())
            && self.links.iter().all(|l| root.join(&l.path).is_symlink())
    }

    /// Write the set under `root`.
    ///
    /// Skips writing when the previous manifest has the same hash, unless
    /// `force` is set. Files from the previous manifest that are not part of
    /// this set are removed.
    pub fn write(&self, root: &Path, force: bool) -> Result<WriteOutcome> {
        let manifest_path = root.join(MANIFEST_FILE);
        let manifest = self.manifest();
        let previous = cache::read_manifest(&manifest_path);

        if !force {
            if let Some(prev) = &previous {
                if prev.hash == manifest.hash && self.all_present(root) {
                    info!("{} is up to date", root.display());
                    return Ok(WriteOutcome::UpToDate);
                }
            }
        }

        let mut removed = 0;
        if let Some(prev) = &previous {
            let current: BTreeSet<&str> = manifest
                .files
                .iter()
                .chain(manifest.links.iter())
                .map(String::as_str)
                .collect();
            for stale in prev.files.iter().chain(prev.links.iter()) {
                if current.contains(stale.as_str()) {
                    continue;
                }
                if remove_if_present(&root.join(stale))? {
                    debug!("removed stale {}", stale);
                    removed += 1;
                }
            }
        }

        for file in &self.files {
            let path = root.join(&file.path);
            create_parent(&path)?;
            fs::write(&path, &file.contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }

        for link in &self.links {
            let path = root.join(&link.path);
            create_parent(&path)?;
            remove_if_present(&path)?;
            std::os::unix::fs::symlink(&link.target, &path)
                .with_context(|| format!("Failed to create symlink {}", path.display()))?;
        }

        cache::write_manifest(&manifest_path, &manifest)?;

        info!(
            "wrote {} files and {} links to {}",
            self.files.len(),
            self.links.len(),
            root.display()
        );
        Ok(WriteOutcome::Written {
            files: self.files.len(),
            removed,
        })
    }
}

fn lines(values: &[String]) -> String {
    values.iter().map(|v| format!("{}\n", v)).collect()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap_or_default()
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

fn remove_if_present(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}
