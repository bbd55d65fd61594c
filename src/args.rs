//! Command-line argument parsing and processing.
//!
//! Global flags (`--config`, `--log`, `--at`, `--debug`, `--quiet`,
//! `--help`, `--version`) may appear anywhere. The first remaining word selects the command; each
//! command validates its own positionals and options here so the command
//! handlers receive typed values.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::weather::parse_clock_time;

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Compute twilight boundaries for a site from sunset/sunrise clock times
    Twilight {
        location: Option<String>,
        date: Option<NaiveDate>,
        sunset: NaiveTime,
        sunrise: NaiveTime,
    },
    /// Score a night from a forecast file or the forecast cache
    Score {
        forecast_path: Option<String>,
        location: Option<String>,
        bortle_class: Option<u8>,
        day: usize,
    },
    /// Great-circle distance between two coordinate pairs
    Distance { from: Option<String>, to: String },
    /// Classify and validate free-text location input
    Parse { input: String },
    /// Remove cached forecasts
    CacheClear,
    /// Show help, optionally for a single command
    ShowHelp { command: Option<String> },
    /// Display version information and exit
    ShowVersion,
    /// Show help due to invalid arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
#[derive(Debug, PartialEq)]
pub struct ParsedArgs {
    pub action: CliAction,
    pub debug_enabled: bool,
    pub quiet: bool,
    pub config_dir: Option<String>,
    pub log_file: Option<String>,
    /// Local time to run at instead of the wall clock
    pub at: Option<NaiveDateTime>,
}

/// Negative coordinates such as `-33.86,151.2` are values, not flags.
fn is_flag(arg: &str) -> bool {
    arg.starts_with("--")
        || (arg.starts_with('-') && arg.chars().nth(1).is_some_and(|c| c.is_ascii_alphabetic()))
}

/// Positionals and `--name value` options for a single command.
struct CommandArgs {
    positionals: Vec<String>,
    options: Vec<(String, String)>,
}

impl CommandArgs {
    fn split(args: &[String], value_flags: &[&str]) -> Result<Self, String> {
        let mut positionals = Vec::new();
        let mut options = Vec::new();
        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];
            if is_flag(arg) {
                if !value_flags.contains(&arg.as_str()) {
                    return Err(format!("Unknown option: {arg}"));
                }
                match args.get(i + 1) {
                    Some(value) if !is_flag(value) => {
                        options.push((arg.clone(), value.clone()));
                        i += 1;
                    }
                    _ => return Err(format!("Missing value for {arg}")),
                }
            } else {
                positionals.push(arg.clone());
            }
            i += 1;
        }
        Ok(Self {
            positionals,
            options,
        })
    }

    fn option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .rev()
            .find(|(flag, _)| flag == name)
            .map(|(_, value)| value.as_str())
    }
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// # Arguments
    /// * `args` - Iterator over command-line arguments (typically from std::env::args())
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut quiet = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut config_error = false;
        let mut config_dir: Option<String> = None;
        let mut log_file: Option<String> = None;
        let mut at: Option<NaiveDateTime> = None;
        let mut rest: Vec<String> = Vec::new();

        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut i = 0;
        while i < args_vec.len() {
            let arg = &args_vec[i];
            match arg.as_str() {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--debug" | "-d" => debug_enabled = true,
                "--quiet" | "-q" => quiet = true,
                "--config" | "-c" => {
                    if i + 1 < args_vec.len() && !is_flag(&args_vec[i + 1]) {
                        config_dir = Some(args_vec[i + 1].clone());
                        i += 1;
                    } else {
                        log_warning_standalone!(
                            "Missing directory for --config. Usage: --config <directory>"
                        );
                        config_error = true;
                    }
                }
                "--log" | "-l" => {
                    if i + 1 < args_vec.len() && !is_flag(&args_vec[i + 1]) {
                        log_file = Some(args_vec[i + 1].clone());
                        i += 1;
                    } else {
                        log_warning_standalone!("Missing file for --log. Usage: --log <file>");
                        config_error = true;
                    }
                }
                "--at" | "-a" => {
                    match args_vec.get(i + 1).filter(|v| !is_flag(v)).map(|v| parse_local_time(v)) {
                        Some(Some(time)) => {
                            at = Some(time);
                            i += 1;
                        }
                        _ => {
                            log_warning_standalone!(
                                "Missing or invalid time for --at. Usage: --at \"YYYY-MM-DD HH:MM\""
                            );
                            config_error = true;
                        }
                    }
                }
                _ => rest.push(arg.clone()),
            }
            i += 1;
        }

        let action = if display_version {
            CliAction::ShowVersion
        } else if display_help {
            CliAction::ShowHelp {
                command: rest.first().cloned(),
            }
        } else if config_error {
            CliAction::ShowHelpDueToError
        } else {
            match rest.split_first() {
                None => CliAction::ShowHelp { command: None },
                Some((command, command_args)) => {
                    parse_command(command, command_args).unwrap_or_else(|message| {
                        log_warning_standalone!("{}", message);
                        CliAction::ShowHelpDueToError
                    })
                }
            }
        };

        ParsedArgs {
            action,
            debug_enabled,
            quiet,
            config_dir,
            log_file,
            at,
        }
    }

    /// Parse arguments from the process environment.
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

fn parse_command(command: &str, args: &[String]) -> Result<CliAction, String> {
    match command {
        "twilight" | "t" => {
            let parsed = CommandArgs::split(args, &["--date", "--sunset", "--sunrise"])?;
            let location = match parsed.positionals.as_slice() {
                [] => None,
                [location] => Some(location.clone()),
                _ => {
                    return Err(
                        "Usage: stargaze twilight [lat,lon] --sunset HH:MM --sunrise HH:MM [--date YYYY-MM-DD]"
                            .to_string(),
                    );
                }
            };
            let date = parsed
                .option("--date")
                .map(|raw| {
                    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                        .map_err(|_| format!("Invalid date '{raw}', expected YYYY-MM-DD"))
                })
                .transpose()?;
            let clock = |flag: &str| -> Result<NaiveTime, String> {
                let raw = parsed
                    .option(flag)
                    .ok_or_else(|| format!("Missing {flag} HH:MM for twilight"))?;
                parse_clock_time(raw).ok_or_else(|| format!("Invalid time '{raw}' for {flag}"))
            };
            Ok(CliAction::Twilight {
                location,
                date,
                sunset: clock("--sunset")?,
                sunrise: clock("--sunrise")?,
            })
        }
        "score" | "s" => {
            let parsed = CommandArgs::split(args, &["--location", "--bortle", "--day"])?;
            let forecast_path = match parsed.positionals.as_slice() {
                [] => None,
                [path] => Some(path.clone()),
                _ => {
                    return Err(
                        "Usage: stargaze score [forecast.json] [--location L] [--bortle N] [--day N]"
                            .to_string(),
                    );
                }
            };
            let bortle_class = parsed
                .option("--bortle")
                .map(|raw| {
                    raw.parse::<u8>()
                        .map_err(|_| format!("Invalid Bortle class '{raw}'"))
                })
                .transpose()?;
            let day = parsed
                .option("--day")
                .map(|raw| raw.parse::<usize>().map_err(|_| format!("Invalid day '{raw}'")))
                .transpose()?
                .unwrap_or(0);
            Ok(CliAction::Score {
                forecast_path,
                location: parsed.option("--location").map(str::to_string),
                bortle_class,
                day,
            })
        }
        "distance" | "d" => {
            let parsed = CommandArgs::split(args, &[])?;
            match parsed.positionals.as_slice() {
                [to] => Ok(CliAction::Distance {
                    from: None,
                    to: to.clone(),
                }),
                [from, to] => Ok(CliAction::Distance {
                    from: Some(from.clone()),
                    to: to.clone(),
                }),
                _ => Err("Usage: stargaze distance [lat,lon] <lat,lon>".to_string()),
            }
        }
        "parse" | "p" => {
            if args.is_empty() {
                return Err("Usage: stargaze parse <text>".to_string());
            }
            // Free text may contain spaces and leading minus signs; take it whole
            Ok(CliAction::Parse {
                input: args.join(" "),
            })
        }
        "cache" => match args.first().map(String::as_str) {
            Some("clear") if args.len() == 1 => Ok(CliAction::CacheClear),
            _ => Err("Usage: stargaze cache clear".to_string()),
        },
        "help" | "h" => Ok(CliAction::ShowHelp {
            command: args.first().cloned(),
        }),
        unknown => Err(format!("Unknown command: {unknown}")),
    }
}

/// Parse `--at` values: `YYYY-MM-DD HH:MM`, optionally with seconds or a `T`.
fn parse_local_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(args: &[&str]) -> CliAction {
        let mut full = vec!["stargaze"];
        full.extend_from_slice(args);
        ParsedArgs::parse(full).action
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_no_args_shows_help() {
        assert_eq!(action(&[]), CliAction::ShowHelp { command: None });
    }

    #[test]
    fn test_parse_version_takes_precedence() {
        assert_eq!(action(&["--help", "-V"]), CliAction::ShowVersion);
        assert_eq!(action(&["-v"]), CliAction::ShowVersion);
    }

    #[test]
    fn test_parse_help_for_command() {
        assert_eq!(
            action(&["score", "--help"]),
            CliAction::ShowHelp {
                command: Some("score".to_string())
            }
        );
        assert_eq!(
            action(&["help", "twilight"]),
            CliAction::ShowHelp {
                command: Some("twilight".to_string())
            }
        );
    }

    #[test]
    fn test_parse_global_flags_anywhere() {
        let parsed = ParsedArgs::parse([
            "stargaze", "distance", "-d", "1,2", "--config", "/tmp/cfg", "3,4", "-q",
        ]);
        assert!(parsed.debug_enabled);
        assert!(parsed.quiet);
        assert_eq!(parsed.config_dir.as_deref(), Some("/tmp/cfg"));
        assert_eq!(parsed.log_file, None);
        assert_eq!(
            parsed.action,
            CliAction::Distance {
                from: Some("1,2".to_string()),
                to: "3,4".to_string()
            }
        );
    }

    #[test]
    fn test_parse_log_file() {
        let parsed = ParsedArgs::parse(["stargaze", "--log", "out.log", "parse", "Denver"]);
        assert_eq!(parsed.log_file.as_deref(), Some("out.log"));
        assert_eq!(action(&["parse", "Denver", "--log"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_config_without_directory() {
        assert_eq!(action(&["--config"]), CliAction::ShowHelpDueToError);
        assert_eq!(action(&["--config", "--debug"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_twilight() {
        assert_eq!(
            action(&[
                "twilight",
                "39.7392,-104.9903",
                "--sunset",
                "18:45",
                "--sunrise",
                "07:05 AM",
                "--date",
                "2024-10-01"
            ]),
            CliAction::Twilight {
                location: Some("39.7392,-104.9903".to_string()),
                date: NaiveDate::from_ymd_opt(2024, 10, 1),
                sunset: hm(18, 45),
                sunrise: hm(7, 5),
            }
        );
    }

    #[test]
    fn test_parse_twilight_negative_latitude_is_positional() {
        assert!(matches!(
            action(&["twilight", "-33.86,151.2", "--sunset", "19:30", "--sunrise", "06:10"]),
            CliAction::Twilight { location: Some(ref location), date: None, .. } if location == "-33.86,151.2"
        ));
    }

    #[test]
    fn test_parse_twilight_errors() {
        assert_eq!(
            action(&["twilight", "1,2", "--sunset", "18:45"]),
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            action(&["twilight", "1,2", "--sunset", "25:99", "--sunrise", "06:00"]),
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            action(&["twilight", "1,2", "--sunset", "18:00", "--sunrise", "06:00", "--date", "tomorrow"]),
            CliAction::ShowHelpDueToError
        );
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(
            action(&["score", "night.json"]),
            CliAction::Score {
                forecast_path: Some("night.json".to_string()),
                location: None,
                bortle_class: None,
                day: 0
            }
        );
        assert_eq!(
            action(&["s", "night.json", "--bortle", "4", "--day", "1", "--location", "Denver"]),
            CliAction::Score {
                forecast_path: Some("night.json".to_string()),
                location: Some("Denver".to_string()),
                bortle_class: Some(4),
                day: 1
            }
        );
        assert_eq!(
            action(&["score", "night.json", "--bortle", "x"]),
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            action(&["score", "night.json", "--unknown", "1"]),
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            action(&["score", "a.json", "b.json"]),
            CliAction::ShowHelpDueToError
        );
    }

    #[test]
    fn test_parse_score_from_cache() {
        assert_eq!(
            action(&["score", "--location", "-33.87,151.21"]),
            CliAction::Score {
                forecast_path: None,
                location: Some("-33.87,151.21".to_string()),
                bortle_class: None,
                day: 0
            }
        );
        assert!(matches!(
            action(&["score"]),
            CliAction::Score { forecast_path: None, location: None, .. }
        ));
    }

    #[test]
    fn test_parse_locations_default_to_configured_site() {
        assert!(matches!(
            action(&["twilight", "--sunset", "18:45", "--sunrise", "07:05"]),
            CliAction::Twilight { location: None, .. }
        ));
        assert_eq!(
            action(&["distance", "1,2"]),
            CliAction::Distance {
                from: None,
                to: "1,2".to_string()
            }
        );
    }

    #[test]
    fn test_parse_distance_point_count() {
        assert_eq!(action(&["distance"]), CliAction::ShowHelpDueToError);
        assert_eq!(action(&["distance", "1,2", "3,4", "5,6"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_at_time() {
        let parsed = ParsedArgs::parse(["stargaze", "--at", "2024-10-01 21:30", "score"]);
        assert_eq!(
            parsed.at,
            NaiveDate::from_ymd_opt(2024, 10, 1).unwrap().and_hms_opt(21, 30, 0)
        );
        assert!(matches!(parsed.action, CliAction::Score { .. }));

        let parsed = ParsedArgs::parse(["stargaze", "score", "-a", "2024-10-01T05:00:15"]);
        assert_eq!(
            parsed.at,
            NaiveDate::from_ymd_opt(2024, 10, 1).unwrap().and_hms_opt(5, 0, 15)
        );

        assert_eq!(action(&["--at", "tonight", "score"]), CliAction::ShowHelpDueToError);
        assert_eq!(action(&["score", "--at"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_free_text() {
        assert_eq!(
            action(&["parse", "New", "York"]),
            CliAction::Parse {
                input: "New York".to_string()
            }
        );
        assert_eq!(action(&["parse"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_cache_clear() {
        assert_eq!(action(&["cache", "clear"]), CliAction::CacheClear);
        assert_eq!(action(&["cache"]), CliAction::ShowHelpDueToError);
        assert_eq!(action(&["cache", "purge"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(action(&["observe"]), CliAction::ShowHelpDueToError);
    }
}
