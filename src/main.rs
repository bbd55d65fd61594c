//! Main application entry point.
//!
//! Parses arguments, applies the output switches (`--quiet`, `--debug`,
//! `--log`), pins the clock for `--at`, loads configuration and dispatches
//! to a command handler.
//! Errors from handlers are reported once here and mapped to the exit code.

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use std::sync::Arc;

use stargaze::args::{self, CliAction, ParsedArgs};
use stargaze::commands;
use stargaze::config::{self, Config};
use stargaze::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use stargaze::logger::Log;
use stargaze::time_source::{self, FixedTimeSource};
use stargaze::{log_debug, log_error_exit, log_pipe, log_version};

fn main() {
    let parsed = ParsedArgs::from_env();

    let code = match run(parsed) {
        Ok(code) => code,
        Err(e) => {
            // Errors are shown even under --quiet
            Log::set_enabled(true);
            log_pipe!();
            log_error_exit!("{:#}", e);
            EXIT_FAILURE
        }
    };

    std::process::exit(code);
}

fn run(parsed: ParsedArgs) -> Result<i32> {
    Log::set_debug(parsed.debug_enabled);

    match parsed.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            return Ok(EXIT_SUCCESS);
        }
        CliAction::ShowHelp { command } => {
            commands::help::run_help_command(command.as_deref());
            return Ok(EXIT_SUCCESS);
        }
        CliAction::ShowHelpDueToError => {
            commands::help::display_general_help();
            return Ok(EXIT_FAILURE);
        }
        _ => {}
    }

    if parsed.quiet {
        Log::set_enabled(false);
    }

    // Must run before anything reads the clock
    if let Some(at) = parsed.at {
        let start = Local
            .from_local_datetime(&at)
            .earliest()
            .with_context(|| format!("{at} does not exist in the local timezone"))?;
        time_source::init_time_source(Arc::new(FixedTimeSource::new(start)));
    }

    // Keep the guard alive until the command finishes so the file is flushed
    let _log_guard = parsed
        .log_file
        .map(Log::start_file_logging)
        .transpose()?;

    config::set_config_dir(parsed.config_dir)?;
    let config = Config::load()?;

    log_version!();
    if Log::is_debug() {
        config.log_config();
        log_debug!("Config file: {}", config::get_config_path()?.display());
    }

    match parsed.action {
        CliAction::Twilight {
            location,
            date,
            sunset,
            sunrise,
        } => commands::twilight::handle_twilight_command(
            location.as_deref(),
            date,
            sunset,
            sunrise,
            &config,
        )?,
        CliAction::Score {
            forecast_path,
            location,
            bortle_class,
            day,
        } => commands::score::handle_score_command(
            forecast_path.as_deref(),
            location.as_deref(),
            bortle_class,
            day,
            &config,
        )?,
        CliAction::Distance { from, to } => {
            commands::distance::handle_distance_command(from.as_deref(), &to, &config)?
        }
        CliAction::Parse { input } => commands::parse::handle_parse_command(&input, &config)?,
        CliAction::CacheClear => commands::cache::handle_cache_clear_command(&config)?,
        CliAction::ShowVersion | CliAction::ShowHelp { .. } | CliAction::ShowHelpDueToError => {}
    }

    Ok(EXIT_SUCCESS)
}
