mod args;
mod commands;
mod settings;

use crate::args::Cli;
use crate::settings::{CliSettings, read_profile};
use anyhow::{Context, Result};
use clap::Parser;
use devcfg_flags::{FlagResolver, ModulePolicy};
use devcfg_logger::Logger;
use devcfg_profile::{Device, DeviceProfile};
use std::io;
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let profile = read_profile(cli.profile.as_deref()).context("Failed to read device profile")?;
    let mut settings = CliSettings::from_snapshot(&profile).context("Failed to read settings")?;
    if let Some(level) = cli.log_level {
        settings.log.level = level;
    }
    let _logger = Logger::builder().name(env!("CARGO_PKG_NAME")).settings(&settings.log)?.init()?;

    let device = DeviceProfile::from_snapshot(&profile)
        .and_then(Device::from_profile)
        .context("Failed to load device profile")?;
    let policy = ModulePolicy::load(cli.policy.as_deref()).context("Failed to load module policy")?;
    let flags = FlagResolver::builder().store(device.store()).policy(policy).build()?;
    debug!(command = ?cli.command, "Evaluating");

    commands::execute(&cli.command, &device, &flags, &mut io::stdout().lock())
}
