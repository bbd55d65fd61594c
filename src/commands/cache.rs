//! Cache command: clear cached forecasts from the on-disk store.

use anyhow::{Context, Result};

use crate::config::Config;

pub fn handle_cache_clear_command(config: &Config) -> Result<()> {
    let dir = config.cache_dir()?;
    if !dir.exists() {
        log_block_start!("Cache is empty ({} does not exist)", dir.display());
        log_end!();
        return Ok(());
    }

    let cache = super::open_forecast_cache(config)?;
    let removed = cache.clear().context("Failed to clear forecast cache")?;

    log_block_start!("Cleared {} cached forecast(s)", removed);
    log_indented!("{}", dir.display());
    log_end!();
    Ok(())
}

pub fn display_help() {
    log_version!();
    log_block_start!("cache - Manage the forecast cache");
    log_block_start!("Usage: stargaze cache clear");
    log_indented!("Removes every cached forecast. Other entries in the store are kept.");
    log_end!();
}
