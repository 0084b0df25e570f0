//! Unit file rendering.

use std::fmt::Write;
use std::path::PathBuf;

use super::{Dependencies, FormatUnit, MountUnit};

/// Turns descriptors into unit file text.
pub trait UnitRenderer {
    fn render_mount(&self, unit: &MountUnit) -> String;
    fn render_format(&self, unit: &FormatUnit) -> String;
}

/// Renders native systemd unit files.
///
/// Format units run `<exec> format ...`, so the rendered action is the same
/// code path as the `format` command.
#[derive(Debug, Clone)]
pub struct SystemdRenderer {
    pub exec: PathBuf,
}

impl SystemdRenderer {
    pub fn new(exec: impl Into<PathBuf>) -> Self {
        Self { exec: exec.into() }
    }

    fn exec_start(&self, unit: &FormatUnit) -> String {
        let action = &unit.action;
        let mut args = vec![
            self.exec.to_string_lossy().into_owned(),
            "format".to_string(),
            "--fs-type".to_string(),
            action.fs_type.clone(),
        ];
        for opt in &action.format_options {
            args.push(format!("--format-option={}", opt));
        }
        args.push("--".to_string());
        args.push(action.device.clone());

        args.iter()
            .map(|a| exec_quote(a))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl UnitRenderer for SystemdRenderer {
    fn render_mount(&self, unit: &MountUnit) -> String {
        let mut out = String::new();
        unit_section(&mut out, &unit.description, &unit.deps);

        out.push_str("\n[Mount]\n");
        let _ = writeln!(out, "What={}", specifier_escape(&unit.what));
        let _ = writeln!(out, "Where={}", specifier_escape(&unit.where_));
        let _ = writeln!(out, "Type={}", unit.fs_type);
        let _ = writeln!(out, "Options={}", specifier_escape(&unit.options));

        install_section(&mut out, &unit.deps);
        out
    }

    fn render_format(&self, unit: &FormatUnit) -> String {
        let mut out = String::new();
        unit_section(&mut out, &unit.description, &unit.deps);

        out.push_str("\n[Service]\n");
        out.push_str("Type=oneshot\n");
        let _ = writeln!(out, "ExecStart={}", self.exec_start(unit));

        install_section(&mut out, &unit.deps);
        out
    }
}

fn unit_section(out: &mut String, description: &str, deps: &Dependencies) {
    out.push_str("# This is a generated file. Do not edit!\n");
    out.push_str("[Unit]\n");
    let _ = writeln!(out, "Description={}", specifier_escape(description));
    if !deps.default_dependencies {
        out.push_str("DefaultDependencies=no\n");
    }
    list(out, "Before", &deps.before);
    list(out, "After", &deps.after);
    list(out, "Wants", &deps.wants);
    list(out, "Requires", &deps.requires);
    for path in &deps.requires_mounts_for {
        let _ = writeln!(out, "RequiresMountsFor={}", specifier_escape(path));
    }
}

fn install_section(out: &mut String, deps: &Dependencies) {
    if deps.wanted_by.is_empty() {
        return;
    }
    out.push_str("\n[Install]\n");
    list(out, "WantedBy", &deps.wanted_by);
}

fn list(out: &mut String, key: &str, values: &[String]) {
    if !values.is_empty() {
        let _ = writeln!(out, "{}={}", key, values.join(" "));
    }
}

/// Escape `%` so systemd does not expand it as a specifier.
fn specifier_escape(value: &str) -> String {
    value.replace('%', "%%")
}

/// Quote one `ExecStart=` argument if it needs it.
fn exec_quote(arg: &str) -> String {
    let arg = specifier_escape(arg);
    let plain = !arg.is_empty()
        && !arg
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | ';' | '$'));
    if plain {
        return arg;
    }
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '$' => quoted.push_str("$$"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
