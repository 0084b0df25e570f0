//! Integration tests: fragments on disk through to a written staging root.

mod helpers;

use helpers::{assert_file_contains, assert_file_exists, assert_symlink, TestEnv};
use recfs::artifact::{
    Layout, OutputSet, WriteOutcome, FSTAB_PATH, INITRD_TYPES_PATH, RUNTIME_TYPES_PATH,
};
use recfs::cache::MANIFEST_FILE;
use recfs::commands::cmd_generate;
use recfs::commands::show::{self, ShowTarget};
use recfs::config::Config;
use recfs::generate::generate;
use recfs::input;
use recfs::preflight::{run_preflight, CheckStatus};
use recfs::unit::SystemdRenderer;
use serial_test::serial;
use std::fs;

const BASE: &str = r#"{
  "fileSystems": {
    "/": { "device": "/dev/sda1", "fsType": "ext4" },
    "/boot": { "label": "ESP", "fsType": "vfat", "neededForBoot": true }
  },
  "swapDevices": [ { "device": "/dev/sda2" } ]
}"#;

const DATA: &str = r#"{
  "fileSystems": {
    "/data": { "devices": ["/dev/sdb", "/dev/sdc"], "fsType": "btrfs" },
    "/srv": { "device": "/dev/sdd", "fsType": "ext4", "autoFormat": true }
  }
}"#;

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_fragments_merge_in_path_order() {
    let env = TestEnv::new();
    env.fragment("10-base.json", BASE);
    env.fragment(
        "20-tune.json",
        r#"{ "fileSystems": { "/": { "options": "noatime" } } }"#,
    );
    env.fragment("sub/30-data.json", DATA);
    env.fragment("README.txt", "ignored");

    let config = input::load(&env.input).unwrap();
    let mount_points: Vec<&str> = config
        .file_systems
        .iter()
        .map(|e| e.mount_point.as_str())
        .collect();

    assert_eq!(mount_points, ["/", "/boot", "/data", "/srv"]);
    assert_eq!(config.file_systems[0].options, ["noatime"]);
    assert_eq!(config.swap_devices.len(), 1);
}

#[test]
fn test_conflicting_fragments_rejected() {
    let env = TestEnv::new();
    env.fragment("10-base.json", BASE);
    env.fragment(
        "20-other.json",
        r#"{ "fileSystems": { "/": { "fsType": "xfs" } } }"#,
    );

    let err = input::load(&env.input).unwrap_err();
    assert!(format!("{:#}", err).contains("fsType"), "{:#}", err);
}

#[test]
fn test_forced_value_wins() {
    let env = TestEnv::new();
    env.fragment("10-base.json", BASE);
    env.fragment(
        "20-other.json",
        r#"{ "fileSystems": { "/": { "fsType": "xfs", "force": true } } }"#,
    );
    env.fragment(
        "30-late.json",
        r#"{ "fileSystems": { "/": { "fsType": "btrfs" } } }"#,
    );

    let config = input::load(&env.input).unwrap();
    assert_eq!(config.file_systems[0].fs_type, "xfs");
}

#[test]
fn test_unknown_field_rejected() {
    let err = input::parse(r#"{ "fileSystems": { "/": { "device": "/dev/sda1", "fstype": "ext4" } } }"#)
        .unwrap_err();
    assert!(format!("{:#}", err).contains("fstype"), "{:#}", err);
}

#[test]
fn test_missing_input_rejected() {
    let env = TestEnv::new();
    assert!(input::load(&env.input).is_err());
    assert!(input::load(&env.base_dir.join("nope.json")).is_err());
}

// =============================================================================
// Generate
// =============================================================================

#[test]
fn test_generate_writes_everything() {
    let env = TestEnv::new();
    env.fragment("10-base.json", BASE);
    env.fragment("20-data.json", DATA);

    let outcome = cmd_generate(&env.config(), false).unwrap();
    assert!(matches!(outcome, WriteOutcome::Written { removed: 0, .. }));

    let fstab = env.output.join(FSTAB_PATH);
    assert_file_contains(&fstab, "/dev/sda1 / ext4 defaults,relatime 0 1\n");
    assert_file_contains(&fstab, "/dev/disk/by-label/ESP /boot vfat defaults,relatime 0 2\n");
    assert_file_contains(&fstab, "/dev/sdd /srv ext4 defaults,relatime 0 2\n");
    assert_file_contains(&fstab, "/dev/sda2 none swap\n");
    assert!(!fs::read_to_string(&fstab).unwrap().contains("/data"));

    assert_eq!(
        fs::read_to_string(env.output.join(RUNTIME_TYPES_PATH)).unwrap(),
        "ext4\nvfat\nbtrfs\next4\n"
    );
    assert_eq!(
        fs::read_to_string(env.output.join(INITRD_TYPES_PATH)).unwrap(),
        "ext4\nvfat\n"
    );

    assert_file_contains(&env.unit_path("data.mount"), "Where=/data\n");
    assert_file_contains(
        &env.unit_path("mkfs-dev-sdd.service"),
        "ExecStart=/usr/bin/recfs format --fs-type ext4 --format-option=-q -- /dev/sdd\n",
    );
    assert_symlink(
        &env.unit_path("local-fs.target.wants/data.mount"),
        "../data.mount",
    );
    assert_symlink(
        &env.unit_path("srv.mount.wants/mkfs-dev-sdd.service"),
        "../mkfs-dev-sdd.service",
    );
    assert_file_exists(&env.output.join(MANIFEST_FILE));
}

#[test]
fn test_second_generate_is_up_to_date() {
    let env = TestEnv::new();
    env.fragment("10-base.json", BASE);
    env.fragment("20-data.json", DATA);

    cmd_generate(&env.config(), false).unwrap();
    let fstab = fs::read(env.output.join(FSTAB_PATH)).unwrap();
    let unit = fs::read(env.unit_path("data.mount")).unwrap();

    let outcome = cmd_generate(&env.config(), false).unwrap();
    assert_eq!(outcome, WriteOutcome::UpToDate);
    assert_eq!(fs::read(env.output.join(FSTAB_PATH)).unwrap(), fstab);
    assert_eq!(fs::read(env.unit_path("data.mount")).unwrap(), unit);

    let forced = cmd_generate(&env.config(), true).unwrap();
    assert!(matches!(forced, WriteOutcome::Written { .. }));
    assert_eq!(fs::read(env.output.join(FSTAB_PATH)).unwrap(), fstab);
}

#[test]
fn test_deleted_file_triggers_rewrite() {
    let env = TestEnv::new();
    env.fragment("10-base.json", BASE);

    cmd_generate(&env.config(), false).unwrap();
    fs::remove_file(env.output.join(FSTAB_PATH)).unwrap();

    let outcome = cmd_generate(&env.config(), false).unwrap();
    assert!(matches!(outcome, WriteOutcome::Written { .. }));
    assert_file_exists(&env.output.join(FSTAB_PATH));
}

#[test]
fn test_stale_units_removed() {
    let env = TestEnv::new();
    env.fragment("10-base.json", BASE);
    let data = env.fragment("20-data.json", DATA);

    cmd_generate(&env.config(), false).unwrap();
    assert_file_exists(&env.unit_path("data.mount"));

    fs::remove_file(data).unwrap();
    let outcome = cmd_generate(&env.config(), false).unwrap();

    // data.mount, mkfs-dev-sdd.service and both wants links
    assert_eq!(outcome, WriteOutcome::Written { files: 3, removed: 4 });
    assert!(!env.unit_path("data.mount").exists());
    assert!(!env.unit_path("local-fs.target.wants/data.mount").is_symlink());
    assert!(!env.unit_path("mkfs-dev-sdd.service").exists());
}

#[test]
fn test_invalid_config_writes_nothing() {
    let env = TestEnv::new();
    env.fragment(
        "10-bad.json",
        r#"{ "fileSystems": {
            "root": { "mountPoint": "/", "device": "/dev/sda1" },
            "/": { "device": "/dev/sdb1" }
        } }"#,
    );

    let err = cmd_generate(&env.config(), false).unwrap_err();
    assert!(format!("{:#}", err).contains("declared more than once"), "{:#}", err);
    assert!(!env.output.join(FSTAB_PATH).exists());
    assert!(!env.output.join(MANIFEST_FILE).exists());
}

#[test]
fn test_custom_unit_dir() {
    let env = TestEnv::new();
    env.fragment("20-data.json", DATA);

    let snapshot = input::load(&env.input).unwrap();
    let artifacts = generate(&snapshot).unwrap();
    let set = OutputSet::render(
        &artifacts,
        &Layout::new("/run/systemd/generator"),
        &SystemdRenderer::new("/usr/bin/recfs"),
    );
    set.write(&env.output, false).unwrap();

    assert_file_exists(&env.output.join("run/systemd/generator/data.mount"));
    assert_symlink(
        &env.output.join("run/systemd/generator/local-fs.target.wants/data.mount"),
        "../data.mount",
    );
}

// =============================================================================
// Show / check
// =============================================================================

#[test]
fn test_show_renders_without_writing() {
    let env = TestEnv::new();
    env.fragment("10-base.json", BASE);
    env.fragment("20-data.json", DATA);
    let config = env.config();

    let artifacts = generate(&input::load(&config.input).unwrap()).unwrap();

    let fstab = show::render(&config, &artifacts, ShowTarget::Fstab, false).unwrap();
    assert_eq!(fstab, artifacts.fstab);

    let units = show::render(&config, &artifacts, ShowTarget::Units, false).unwrap();
    assert!(units.contains("### data.mount\n"));
    assert!(units.contains("### mkfs-dev-sdd.service\n"));

    let json = show::render(&config, &artifacts, ShowTarget::Units, true).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["mountUnits"][0]["where"], "/data");
    assert_eq!(value["formatUnits"][0]["action"]["fsType"], "ext4");

    let types = show::render(&config, &artifacts, ShowTarget::Types, false).unwrap();
    assert_eq!(types, "runtime: ext4 vfat btrfs ext4\ninitrd: ext4 vfat\n");

    assert!(!env.output.exists());
}

#[test]
fn test_preflight_passes_on_valid_config() {
    let env = TestEnv::new();
    env.fragment("10-base.json", BASE);
    env.fragment("20-data.json", DATA);

    let report = run_preflight(&env.input);
    assert_eq!(report.fail_count(), 0);
    assert!(report.all_passed());
    assert!(report
        .checks
        .iter()
        .any(|c| c.name == "root file system" && c.status == CheckStatus::Pass));
}

#[test]
fn test_preflight_reports_bad_config() {
    let env = TestEnv::new();
    env.fragment(
        "10-bad.json",
        r#"{ "fileSystems": { "/data": { "device": "/dev/sda", "devices": ["/dev/sdb"] } } }"#,
    );

    let report = run_preflight(&env.input);
    assert_eq!(report.fail_count(), 1);
    assert!(!report.all_passed());
}

#[test]
fn test_preflight_warns_without_root() {
    let env = TestEnv::new();
    env.fragment("20-data.json", DATA);

    let report = run_preflight(&env.input);
    assert!(report.all_passed());
    assert!(report
        .checks
        .iter()
        .any(|c| c.name == "root file system" && c.status == CheckStatus::Warn));
}

// =============================================================================
// Config
// =============================================================================

fn clear_env() {
    for key in ["RECFS_INPUT", "RECFS_OUTPUT", "RECFS_UNIT_DIR", "RECFS_EXEC"] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_config_defaults() {
    clear_env();
    let env = TestEnv::new();

    let config = Config::load(&env.base_dir);
    assert_eq!(config.input, env.base_dir.join("recfs.json"));
    assert_eq!(config.output, env.base_dir.join("output/root"));
    assert_eq!(config.unit_dir.to_str(), Some("etc/systemd/system"));
    assert_eq!(config.exec.to_str(), Some("/usr/bin/recfs"));
}

#[test]
#[serial]
fn test_config_env_overrides_dotenv() {
    clear_env();
    let env = TestEnv::new();
    fs::write(
        env.base_dir.join(".env"),
        "RECFS_INPUT=custom.json\nRECFS_EXEC=/opt/recfs\n",
    )
    .unwrap();
    std::env::set_var("RECFS_EXEC", "/usr/local/bin/recfs");

    let config = Config::load(&env.base_dir);
    clear_env();

    assert_eq!(config.input, env.base_dir.join("custom.json"));
    assert_eq!(config.exec.to_str(), Some("/usr/local/bin/recfs"));
}
