//! # CLI Argument Definitions

use clap::{Parser, Subcommand};
use devcfg_flags::ResourceId;
use std::path::PathBuf;

/// The main CLI structure parsing command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "devcfg")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Evaluate device flags, feature gates and resources against a device profile")]
pub(crate) struct Cli {
    /// Device profile (TOML); `DEVCFG__` environment variables override it
    #[arg(short, long, global = true, env = "DEVCFG_PROFILE_FILE", value_name = "PATH")]
    pub(crate) profile: Option<PathBuf>,

    /// Module policy file; the built-in tethering policy is used without it
    #[arg(long, global = true, env = "DEVCFG_POLICY_FILE", value_name = "PATH")]
    pub(crate) policy: Option<PathBuf>,

    /// Log level for stderr output (overrides the profile's `[log]` table)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub(crate) log_level: Option<String>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Print the raw value of a flag
    Get {
        namespace: String,
        key: String,
        /// Printed when the flag is not set
        #[arg(short, long)]
        default: Option<String>,
    },
    /// Print an integer flag, optionally bounded
    Int {
        namespace: String,
        key: String,
        #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
        default: i32,
        /// Inclusive lower bound
        #[arg(long, requires = "max", allow_hyphen_values = true)]
        min: Option<i32>,
        /// Inclusive upper bound
        #[arg(long, requires = "min", allow_hyphen_values = true)]
        max: Option<i32>,
    },
    /// Print a boolean flag
    Bool {
        namespace: String,
        key: String,
        /// Value used when the flag is not set
        #[arg(long)]
        default: bool,
    },
    /// Evaluate a minimum-version feature gate
    Feature {
        namespace: String,
        key: String,
        /// Gate on a module package instead of the caller's own package
        #[arg(short, long)]
        module: Option<String>,
        /// Result when the flag is unset or zero
        #[arg(long)]
        default_enabled: bool,
    },
    /// Print a boolean resource
    ResBool {
        /// Resource id, decimal or `0x` hex
        #[arg(value_parser = parse_resource_id)]
        id: ResourceId,
        #[arg(long)]
        default: bool,
    },
    /// Print an integer resource
    ResInt {
        /// Resource id, decimal or `0x` hex
        #[arg(value_parser = parse_resource_id)]
        id: ResourceId,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        default: i32,
    },
}

fn parse_resource_id(raw: &str) -> Result<ResourceId, String> {
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map(ResourceId).map_err(|e| format!("invalid resource id '{raw}': {e}"))
}
