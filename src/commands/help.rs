//! Help command implementation for stargaze.
//!
//! Shows general help or command-specific help.

/// Run the help command (dispatcher)
///
/// # Arguments
/// * `command` - Optional command name to get help for (None = general help)
pub fn run_help_command(command: Option<&str>) {
    match command {
        None => display_general_help(),
        Some("twilight") | Some("t") => super::twilight::display_help(),
        Some("score") | Some("s") => super::score::display_help(),
        Some("distance") | Some("d") => super::distance::display_help(),
        Some("parse") | Some("p") => super::parse::display_help(),
        Some("cache") => super::cache::display_help(),
        Some("help") | Some("h") => display_help_help(),
        Some(unknown) => {
            log_warning_standalone!("Unknown command: {}", unknown);
            display_general_help();
        }
    }
}

/// Displays the general help message.
pub fn display_general_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("stargaze [OPTIONS] <COMMAND>");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-l, --log <file>       Write output to a file instead of the terminal");
    log_indented!("-a, --at <time>        Run at a fixed local time (YYYY-MM-DD HH:MM)");
    log_indented!("-q, --quiet            Suppress all output except errors");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("twilight, t [lat,lon]  Twilight boundaries and darkness window");
    log_indented!("score, s [file]        Score a night from a forecast file or the cache");
    log_indented!("distance, d [a] <b>    Great-circle distance between two sites");
    log_indented!("parse, p <text>        Classify and validate location input");
    log_indented!("cache clear            Remove cached forecasts");
    log_indented!("help, h [COMMAND]      Show detailed help for a command");
    log_pipe!();
    log_info!("Left-out locations default to the site in stargaze.toml.");
    log_end!();
}

fn display_help_help() {
    log_version!();
    log_block_start!("help - Display help information");
    log_block_start!("Usage: stargaze help [COMMAND]");
    log_block_start!("Examples:");
    log_indented!("stargaze help");
    log_indented!("stargaze help score");
    log_end!();
}
