//! recfs library exports.
//!
//! The generation engine is pure: [`input`] builds an immutable
//! [`SystemConfig`], [`generate::generate`] derives every artifact from it,
//! and [`artifact`] writes them. [`device`] holds the one part that touches
//! real hardware, the format action run by generated units.

pub mod aggregate;
pub mod artifact;
pub mod cache;
pub mod commands;
pub mod config;
pub mod device;
pub mod entry;
pub mod error;
pub mod fstab;
pub mod generate;
pub mod input;
pub mod logging;
pub mod preflight;
pub mod process;
pub mod resolve;
pub mod timing;
pub mod unit;

pub use entry::{FilesystemEntry, SwapEntry, SystemConfig};
pub use error::{ActionError, ConfigError};
pub use generate::{generate, Artifacts};
