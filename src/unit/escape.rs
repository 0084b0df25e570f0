//! Path to unit name escaping, as `systemd-escape --path` does it.

use std::fmt::Write;

/// Escape a path into a unit name prefix.
///
/// Leading, trailing and repeated slashes and `.` components are dropped,
/// remaining slashes become `-`, and any byte outside `[A-Za-z0-9:_.]` (plus
/// a leading `.`) is written as `\xNN`. The root path escapes to `-`. `..`
/// is escaped like any other component; mount points containing it are
/// rejected before they get here.
pub fn escape_path(path: &str) -> String {
    let components: Vec<&str> = path
        .split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .collect();
    if components.is_empty() {
        return "-".to_string();
    }

    let simplified = components.join("/");
    let mut out = String::with_capacity(simplified.len());
    for (i, byte) in simplified.bytes().enumerate() {
        match byte {
            b'/' => out.push('-'),
            b'.' if i == 0 => push_hex(&mut out, byte),
            b if b.is_ascii_alphanumeric() || matches!(b, b':' | b'_' | b'.') => {
                out.push(b as char)
            }
            _ => push_hex(&mut out, byte),
        }
    }
    out
}

fn push_hex(out: &mut String, byte: u8) {
    let _ = write!(out, "\\x{:02x}", byte);
}

/// Name of the mount unit systemd uses for `mount_point`.
pub fn mount_unit_name(mount_point: &str) -> String {
    format!("{}.mount", escape_path(mount_point))
}

/// Name of the device unit udev announces for `device`.
pub fn device_unit_name(device: &str) -> String {
    format!("{}.device", escape_path(device))
}
