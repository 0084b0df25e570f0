//! Mount table rendering.

use crate::entry::SwapEntry;
use crate::resolve::SingleDevice;

const HEADER: &str = "# This is a generated file. Do not edit!\n";

/// File system types that are never checked at boot.
const UNCHECKED_TYPES: &[&str] = &["none", "btrfs", "tmpfs"];

/// fsck pass number for a resolved entry.
///
/// `0` skips the check, `1` is reserved for the root file system and `2`
/// covers everything else.
pub fn pass_number(single: &SingleDevice<'_>) -> u8 {
    let entry = single.entry;
    if entry.no_check
        || single.device == "none"
        || UNCHECKED_TYPES.contains(&entry.fs_type.as_str())
    {
        0
    } else if entry.mount_point == "/" {
        1
    } else {
        2
    }
}

/// Encode a field the way fstab(5) expects: space, tab, newline and
/// backslash become octal escapes.
pub fn escape_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            ' ' => out.push_str("\\040"),
            '\t' => out.push_str("\\011"),
            '\n' => out.push_str("\\012"),
            '\\' => out.push_str("\\134"),
            c => out.push(c),
        }
    }
    out
}

/// One mount table line, without the trailing newline.
pub fn render_line(single: &SingleDevice<'_>) -> String {
    let entry = single.entry;
    format!(
        "{} {} {} {} 0 {}",
        escape_field(&single.device),
        escape_field(&entry.mount_point),
        escape_field(&entry.fs_type),
        escape_field(&entry.options_string()),
        pass_number(single)
    )
}

/// Render the whole table: file systems in input order, then swap devices.
pub fn render(single_device: &[SingleDevice<'_>], swap_devices: &[SwapEntry]) -> String {
    let mut out = String::from(HEADER);

    out.push_str("\n# Filesystems.\n");
    for single in single_device {
        out.push_str(&render_line(single));
        out.push('\n');
    }

    out.push_str("\n# Swap devices.\n");
    for swap in swap_devices {
        out.push_str(&format!("{} none swap\n", escape_field(&swap.device)));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{FilesystemEntry, RawEntry};

    fn single(entry: &FilesystemEntry) -> SingleDevice<'_> {
        SingleDevice {
            entry,
            device: entry.device.clone().unwrap_or_default(),
        }
    }

    #[test]
    fn none_device_is_not_checked() {
        let entry = FilesystemEntry::normalize(
            "/proc",
            RawEntry {
                device: Some("none".into()),
                fs_type: Some("proc".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(pass_number(&single(&entry)), 0);
    }

    #[test]
    fn whitespace_and_backslash_are_octal() {
        assert_eq!(escape_field("my data"), "my\\040data");
        assert_eq!(escape_field("a\tb\nc"), "a\\011b\\012c");
        assert_eq!(escape_field("by-label/x\\x20y"), "by-label/x\\134x20y");
        assert_eq!(escape_field("/dev/sda1"), "/dev/sda1");
    }

    #[test]
    fn swap_device_is_escaped() {
        let swap = [SwapEntry {
            device: "/swap file".into(),
        }];
        assert!(render(&[], &swap).contains("/swap\\040file none swap\n"));
    }

    #[test]
    fn empty_table_still_has_header() {
        let text = render(&[], &[]);
        assert!(text.starts_with("# This is a generated file"));
        assert!(text.ends_with('\n'));
    }
}
