//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `generate` - Write fstab, units and type lists to the staging root
//! - `show` - Print one artifact without writing anything
//! - `check` - Run preflight checks
//! - `format` - Run one format action (ExecStart of format units)

pub mod check;
pub mod format;
pub mod generate;
pub mod show;

pub use check::cmd_check;
pub use format::cmd_format;
pub use generate::cmd_generate;
pub use show::cmd_show;
