//! Partial declarations and the rules for merging them.
//!
//! The same `fileSystems.<key>` may be declared by several fragments. Each
//! declaration is an [`EntryPatch`]; patches are applied in order:
//!
//! - `options` lists are concatenated, duplicates kept.
//! - Every other field may be set more than once only to the same value.
//!   A patch with `force: true` replaces non-forced values; a non-forced
//!   value arriving after a forced one is ignored.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;

use super::{FilesystemEntry, RawEntry, SwapEntry, SystemConfig};
use crate::error::ConfigError;

/// One declaration of a file system, as read from a fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EntryPatch {
    pub mount_point: Option<String>,
    pub device: Option<String>,
    pub devices: Option<Vec<String>>,
    pub label: Option<String>,
    pub fs_type: Option<String>,
    /// Either `"a,b"` or `["a", "b"]`.
    #[serde(default, deserialize_with = "comma_list")]
    pub options: Option<Vec<String>>,
    pub auto_format: Option<bool>,
    /// Either `"-L data -q"` or `["-L", "data", "-q"]`.
    #[serde(default, deserialize_with = "word_list")]
    pub format_options: Option<Vec<String>>,
    pub no_check: Option<bool>,
    pub needed_for_boot: Option<bool>,
    #[serde(default)]
    pub force: bool,
}

/// One configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Fragment {
    #[serde(default)]
    pub file_systems: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub swap_devices: Vec<SwapEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    String(String),
    List(Vec<String>),
}

fn comma_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrList>::deserialize(deserializer)?.map(|v| match v {
        StringOrList::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect(),
        StringOrList::List(l) => l,
    }))
}

fn word_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrList>::deserialize(deserializer)?.map(|v| match v {
        StringOrList::String(s) => s.split_whitespace().map(String::from).collect(),
        StringOrList::List(l) => l,
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Field slots
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    forced: bool,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            value: None,
            forced: false,
        }
    }
}

impl<T: PartialEq + fmt::Debug> Slot<T> {
    fn apply(
        &mut self,
        key: &str,
        field: &'static str,
        new: Option<T>,
        force: bool,
    ) -> Result<(), ConfigError> {
        let Some(new) = new else {
            return Ok(());
        };
        match &self.value {
            None => {}
            Some(_) if force && !self.forced => {}
            Some(_) if !force && self.forced => return Ok(()),
            Some(current) if *current == new => return Ok(()),
            Some(current) => {
                return Err(ConfigError::ConflictingDefinition {
                    key: key.to_string(),
                    field,
                    existing: format!("{current:?}"),
                    new: format!("{new:?}"),
                })
            }
        }
        self.value = Some(new);
        self.forced = force;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ListSlot {
    value: Option<Vec<String>>,
    forced: bool,
}

impl ListSlot {
    fn apply(&mut self, new: Option<Vec<String>>, force: bool) {
        let Some(new) = new else {
            return;
        };
        if !force && self.forced {
            return;
        }
        if force && !self.forced {
            self.value = None;
            self.forced = true;
        }
        self.value.get_or_insert_with(Vec::new).extend(new);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Builders
// ─────────────────────────────────────────────────────────────────────────────

/// Accumulates the patches of a single key.
#[derive(Debug)]
pub struct EntryBuilder {
    key: String,
    mount_point: Slot<String>,
    device: Slot<String>,
    devices: Slot<Vec<String>>,
    label: Slot<String>,
    fs_type: Slot<String>,
    options: ListSlot,
    auto_format: Slot<bool>,
    format_options: Slot<Vec<String>>,
    no_check: Slot<bool>,
    needed_for_boot: Slot<bool>,
}

impl EntryBuilder {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            mount_point: Slot::default(),
            device: Slot::default(),
            devices: Slot::default(),
            label: Slot::default(),
            fs_type: Slot::default(),
            options: ListSlot::default(),
            auto_format: Slot::default(),
            format_options: Slot::default(),
            no_check: Slot::default(),
            needed_for_boot: Slot::default(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Merge one more declaration into this entry.
    pub fn apply(&mut self, patch: EntryPatch) -> Result<(), ConfigError> {
        let key = self.key.as_str();
        let force = patch.force;
        self.mount_point
            .apply(key, "mountPoint", patch.mount_point, force)?;
        self.device.apply(key, "device", patch.device, force)?;
        self.devices.apply(key, "devices", patch.devices, force)?;
        self.label.apply(key, "label", patch.label, force)?;
        self.fs_type.apply(key, "fsType", patch.fs_type, force)?;
        self.options.apply(patch.options, force);
        self.auto_format
            .apply(key, "autoFormat", patch.auto_format, force)?;
        self.format_options
            .apply(key, "formatOptions", patch.format_options, force)?;
        self.no_check.apply(key, "noCheck", patch.no_check, force)?;
        self.needed_for_boot
            .apply(key, "neededForBoot", patch.needed_for_boot, force)?;
        Ok(())
    }

    /// The merged declaration, before normalization.
    pub fn raw(self) -> RawEntry {
        RawEntry {
            mount_point: self.mount_point.value,
            device: self.device.value,
            devices: self.devices.value,
            label: self.label.value,
            fs_type: self.fs_type.value,
            options: self.options.value,
            auto_format: self.auto_format.value.unwrap_or(false),
            format_options: self.format_options.value,
            no_check: self.no_check.value.unwrap_or(false),
            needed_for_boot: self.needed_for_boot.value.unwrap_or(false),
        }
    }

    pub fn build(self) -> Result<FilesystemEntry, ConfigError> {
        let key = self.key.clone();
        FilesystemEntry::normalize(&key, self.raw())
    }
}

/// Collects patches for every key, in first-declared order, plus swap devices.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    entries: Vec<EntryBuilder>,
    index: HashMap<String, usize>,
    swap_devices: Vec<SwapEntry>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn patch(&mut self, key: &str, patch: EntryPatch) -> Result<&mut Self, ConfigError> {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                self.entries.push(EntryBuilder::new(key));
                self.index.insert(key.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        self.entries[idx].apply(patch)?;
        Ok(self)
    }

    pub fn swap(&mut self, entry: SwapEntry) -> &mut Self {
        self.swap_devices.push(entry);
        self
    }

    /// Number of distinct keys seen so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.swap_devices.is_empty()
    }

    /// Normalize every entry. Fails on the first invalid one.
    pub fn build(self) -> Result<SystemConfig, ConfigError> {
        let file_systems = self
            .entries
            .into_iter()
            .map(EntryBuilder::build)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SystemConfig {
            file_systems,
            swap_devices: self.swap_devices,
        })
    }
}
