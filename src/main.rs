//! recfs - declarative filesystem configuration.
//!
//! Turns a JSON description of file systems and swap devices into:
//! - /etc/fstab
//! - mount units for multi-device volumes
//! - one-shot units that format blank devices
//! - supported file system type lists for the initrd and the running system

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use recfs::commands;
use recfs::commands::show::ShowTarget;
use recfs::config::Config;

#[derive(Parser)]
#[command(name = "recfs")]
#[command(about = "Declarative filesystem configuration generator")]
#[command(
    after_help = "QUICK START:\n  recfs check       Validate recfs.json\n  recfs show fstab  Print the mount table\n  recfs generate    Write artifacts to output/root"
)]
struct Cli {
    /// Configuration snapshot (file or fragment directory)
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Directory relative paths and .env are resolved against (default: current directory)
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate fstab, units and type lists into the staging root
    Generate {
        /// Staging root (default: output/root)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rewrite even if the manifest says nothing changed
        #[arg(long)]
        force: bool,
    },

    /// Print an artifact without writing anything
    Show {
        #[command(subcommand)]
        what: ShowCommand,

        /// Print descriptors as JSON
        #[arg(long, global = true)]
        json: bool,
    },

    /// Run preflight checks
    Check {
        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },

    /// Create a file system on DEVICE unless it already has one
    Format {
        /// File system type (runs mkfs.<TYPE>)
        #[arg(long)]
        fs_type: String,

        /// Extra mkfs argument, repeatable
        #[arg(long = "format-option", allow_hyphen_values = true)]
        format_options: Vec<String>,

        device: String,
    },
}

#[derive(Subcommand)]
enum ShowCommand {
    /// Show the mount table
    Fstab,
    /// Show generated units
    Units,
    /// Show supported file system types
    Types,
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    recfs::logging::init(cli.verbose);

    let base_dir = match cli.base_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let mut config = Config::load(&base_dir);
    if let Some(input) = cli.input {
        config.input = base_dir.join(input);
    }

    match cli.command {
        Commands::Generate { output, force } => {
            if let Some(output) = output {
                config.output = base_dir.join(output);
            }
            commands::cmd_generate(&config, force)?;
        }

        Commands::Show { what, json } => {
            let target = match what {
                ShowCommand::Fstab => ShowTarget::Fstab,
                ShowCommand::Units => ShowTarget::Units,
                ShowCommand::Types => ShowTarget::Types,
                ShowCommand::Config => ShowTarget::Config,
            };
            commands::cmd_show(&config, target, json)?;
        }

        Commands::Check { strict } => {
            commands::cmd_check(&config, strict)?;
        }

        Commands::Format {
            fs_type,
            format_options,
            device,
        } => {
            commands::cmd_format(device, fs_type, format_options)?;
        }
    }

    Ok(())
}
