//! Structured logging system with visual formatting.
//!
//! Output uses Unicode box drawing so a CLI session reads as one connected
//! block from the version header (`┏`) down to the terminator (`╹`).
//! Library code reaches for the level macros; the CLI uses the block macros.
//!
//! ## Logging Conventions
//!
//! - **`log_block_start!`**: opens a new conceptual block. Prints an empty pipe
//!   `┃` for spacing, then `┣ message`.
//! - **`log_decorated!`**: continues a block with `┣ message`.
//! - **`log_indented!`**: nested details under the current item, `┃   message`.
//! - **`log_pipe!`**: a lone `┃`, used before a level macro that starts its own block.
//! - **`log_version!`** / **`log_end!`**: the session header and terminator.
//! - **`log_info!`, `log_warning!`, `log_error!`, `log_debug!`, `log_critical!`**:
//!   semantic levels with a coloured `[LEVEL]` tag. `log_debug!` is silent
//!   unless debug output was switched on with [`Log::set_debug`].
//!
//! Logging can be disabled at runtime for quiet operation and tests, and can
//! be redirected to a file through [`Log::start_file_logging`].

use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

// Channel for routing output to file when --log is active
static LOG_CHANNEL: OnceLock<Sender<LogMessage>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Semantic log levels rendered with a coloured tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
    Debug,
    Critical,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Info => "\x1b[32mINFO\x1b[0m",
            Level::Warning => "\x1b[33mWARNING\x1b[0m",
            Level::Error => "\x1b[31mERROR\x1b[0m",
            Level::Debug => "\x1b[32mDEBUG\x1b[0m",
            Level::Critical => "\x1b[31mCRITICAL\x1b[0m",
        }
    }
}

/// Shape of a single emitted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    /// `┃` spacer followed by `┣ message`
    Block,
    /// `┣ message`
    Decorated,
    /// `┃   message`
    Indented,
    /// `┣[LEVEL] message`
    Level(Level),
    /// `[LEVEL] message` without box drawing
    Standalone(Level),
    /// `┃` spacer followed by `┗[LEVEL] message`
    Exit(Level),
}

/// Main logging interface.
pub struct Log;

impl Log {
    /// Enable or disable all output.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Enable or disable `log_debug!` output.
    pub fn set_debug(enabled: bool) {
        DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_debug() -> bool {
        DEBUG_ENABLED.load(Ordering::SeqCst)
    }

    /// Start file logging to the specified path.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(tx.clone())
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::spawn(move || {
            let mut file = std::fs::File::create(&file_path)?;

            loop {
                match rx.recv() {
                    Ok(LogMessage::Formatted(text)) => file.write_all(text.as_bytes())?,
                    Ok(LogMessage::Shutdown) | Err(_) => {
                        file.flush()?;
                        break;
                    }
                }
            }

            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// Timestamp prefix shown only while a fixed clock drives the process,
    /// so replayed sessions show the clock the cache actually saw.
    pub fn get_timestamp_prefix() -> String {
        if crate::time_source::is_initialized() && crate::time_source::is_simulated() {
            format!("[{}] ", crate::time_source::now().format("%Y-%m-%d %H:%M:%S"))
        } else {
            String::new()
        }
    }
}

/// Guard for file logging that ensures clean shutdown.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Remove ANSI colour sequences (`ESC [ ... m`) for file output.
fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Render a line in its box-drawing shape, without the timestamp prefix.
pub fn render(line: Line, message: &str, prefix: &str) -> String {
    match line {
        Line::Block => format!("{prefix}┃\n{prefix}┣ {message}\n"),
        Line::Decorated => format!("{prefix}┣ {message}\n"),
        Line::Indented => format!("{prefix}┃   {message}\n"),
        Line::Level(level) => format!("{prefix}┣[{}] {message}\n", level.tag()),
        Line::Standalone(level) => format!("{prefix}[{}] {message}\n", level.tag()),
        Line::Exit(level) => format!("{prefix}┃\n{prefix}┗[{}] {message}\n", level.tag()),
    }
}

/// Entry point for every macro. Honours the enable and debug switches.
pub fn write_line(line: Line, message: &str) {
    if !Log::is_enabled() {
        return;
    }
    if matches!(line, Line::Level(Level::Debug)) && !Log::is_debug() {
        return;
    }
    let prefix = Log::get_timestamp_prefix();
    write_output(&render(line, message, &prefix));
}

/// Route raw text to the log file if one is active, otherwise stdout.
pub fn write_output(text: &str) {
    if let Some(tx) = LOG_CHANNEL.get() {
        let _ = tx.send(LogMessage::Formatted(strip_ansi_codes(text)));
    } else {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

// # Logging Macros

#[doc(hidden)]
#[macro_export]
macro_rules! __log_line {
    ($line:expr, $fmt:literal $($arg:tt)*) => {
        $crate::logger::write_line($line, &format!($fmt $($arg)*))
    };
    ($line:expr, $expr:expr) => {
        $crate::logger::write_line($line, &format!("{}", $expr))
    };
}

/// Log a decorated message as part of the current block.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)+) => { $crate::__log_line!($crate::logger::Line::Decorated, $($arg)+) };
}

/// Log an indented detail line.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)+) => { $crate::__log_line!($crate::logger::Line::Indented, $($arg)+) };
}

/// Log a visual pipe separator for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {
        if $crate::logger::Log::is_enabled() {
            let prefix = $crate::logger::Log::get_timestamp_prefix();
            $crate::logger::write_output(&format!("{prefix}┃\n"));
        }
    };
}

/// Log a block start message.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)+) => { $crate::__log_line!($crate::logger::Line::Block, $($arg)+) };
}

/// Log the application version header.
#[macro_export]
macro_rules! log_version {
    () => {
        if $crate::logger::Log::is_enabled() {
            let prefix = $crate::logger::Log::get_timestamp_prefix();
            let version = env!("CARGO_PKG_VERSION");
            $crate::logger::write_output(&format!("{prefix}┏ stargaze v{version} ━━╸\n"));
        }
    };
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {
        if $crate::logger::Log::is_enabled() {
            let prefix = $crate::logger::Log::get_timestamp_prefix();
            $crate::logger::write_output(&format!("{prefix}╹\n"));
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => {
        $crate::__log_line!($crate::logger::Line::Level($crate::logger::Level::Info), $($arg)+)
    };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)+) => {
        $crate::__log_line!($crate::logger::Line::Level($crate::logger::Level::Warning), $($arg)+)
    };
}

/// Warning without box drawing, for output before the header is printed.
#[macro_export]
macro_rules! log_warning_standalone {
    ($($arg:tt)+) => {
        $crate::__log_line!($crate::logger::Line::Standalone($crate::logger::Level::Warning), $($arg)+)
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => {
        $crate::__log_line!($crate::logger::Line::Level($crate::logger::Level::Error), $($arg)+)
    };
}

/// Error that terminates the block with `┗`.
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)+) => {
        $crate::__log_line!($crate::logger::Line::Exit($crate::logger::Level::Error), $($arg)+)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => {
        $crate::__log_line!($crate::logger::Line::Level($crate::logger::Level::Debug), $($arg)+)
    };
}

#[macro_export]
macro_rules! log_critical {
    ($($arg:tt)+) => {
        $crate::__log_line!($crate::logger::Line::Level($crate::logger::Level::Critical), $($arg)+)
    };
}
