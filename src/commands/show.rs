//! Show command - displays artifacts without writing them.

use anyhow::Result;
use serde_json::json;

use crate::config::Config;
use crate::generate::{generate, Artifacts};
use crate::input;
use crate::unit::{SystemdRenderer, UnitRenderer};

/// Show target for the show command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowTarget {
    /// Mount table text
    Fstab,
    /// Rendered mount and format units
    Units,
    /// Supported file system types
    Types,
    /// Effective configuration
    Config,
}

/// Execute the show command.
pub fn cmd_show(config: &Config, target: ShowTarget, as_json: bool) -> Result<()> {
    if target == ShowTarget::Config {
        config.print();
        return Ok(());
    }

    let snapshot = input::load(&config.input)?;
    let artifacts = generate(&snapshot)?;
    print!("{}", render(config, &artifacts, target, as_json)?);
    Ok(())
}

/// Text printed for `target`.
pub fn render(
    config: &Config,
    artifacts: &Artifacts,
    target: ShowTarget,
    as_json: bool,
) -> Result<String> {
    let out = match (target, as_json) {
        (ShowTarget::Fstab, false) => artifacts.fstab.clone(),
        (ShowTarget::Fstab, true) => pretty(&json!({ "fstab": artifacts.fstab }))?,
        (ShowTarget::Units, false) => {
            let renderer = SystemdRenderer::new(&config.exec);
            let mut out = String::new();
            for unit in &artifacts.mount_units {
                out.push_str(&format!("### {}\n", unit.name));
                out.push_str(&renderer.render_mount(unit));
                out.push('\n');
            }
            for unit in &artifacts.format_units {
                out.push_str(&format!("### {}\n", unit.name));
                out.push_str(&renderer.render_format(unit));
                out.push('\n');
            }
            out
        }
        (ShowTarget::Units, true) => pretty(&json!({
            "mountUnits": artifacts.mount_units,
            "formatUnits": artifacts.format_units,
        }))?,
        (ShowTarget::Types, false) => format!(
            "runtime: {}\ninitrd: {}\n",
            artifacts.filesystems.runtime.join(" "),
            artifacts.filesystems.initrd.join(" ")
        ),
        (ShowTarget::Types, true) => pretty(&artifacts.filesystems)?,
        (ShowTarget::Config, _) => String::new(),
    };
    Ok(out)
}

fn pretty<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)? + "\n")
}
