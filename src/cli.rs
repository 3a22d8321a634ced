//! Command line parsing for the demo binary.
//!
//! ```text
//! producer-consumer [--config <path>] run-single
//! producer-consumer [--config <path>] run-multi <producers> <consumers>
//! ```

use std::path::PathBuf;

use crate::error::UsageError;
use crate::orchestrator::Mode;

pub const USAGE: &str = "\
Example of the producer-consumer pattern over a bounded async queue

Usage: producer-consumer [--config <path>] <command>

Commands:
  run-single                        Run a single producer-consumer pair
  run-multi <producers> <consumers> Run several producers and consumers on one queue
  help                              Print this message

Options:
  --config <path>  Load settings from a TOML file
  -h, --help       Print this message

Runs until interrupted with Ctrl-C.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RunSingle,
    RunMulti { producers: usize, consumers: usize },
    Help,
}

impl Command {
    /// The run mode for this command, `None` for `help`.
    pub fn mode(&self) -> Option<Mode> {
        match *self {
            Command::RunSingle => Some(Mode::Single),
            Command::RunMulti {
                producers,
                consumers,
            } => Some(Mode::Multi {
                producers,
                consumers,
            }),
            Command::Help => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub config: Option<PathBuf>,
    pub command: Command,
}

impl Cli {
    /// Parses arguments without the program name.
    pub fn parse_from<I, S>(args: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        let mut config = None;

        let command = loop {
            let Some(arg) = args.next() else {
                return Err(UsageError::MissingCommand);
            };
            match arg.as_str() {
                "-h" | "--help" | "help" => {
                    return Ok(Self {
                        config,
                        command: Command::Help,
                    })
                }
                "--config" => {
                    let path = args.next().ok_or(UsageError::MissingConfigPath)?;
                    config = Some(PathBuf::from(path));
                }
                _ => match arg.strip_prefix("--config=") {
                    Some("") => return Err(UsageError::MissingConfigPath),
                    Some(path) => config = Some(PathBuf::from(path)),
                    None => break arg,
                },
            }
        };

        let rest: Vec<String> = args.collect();
        if rest.iter().any(|arg| arg == "-h" || arg == "--help") {
            return match command.as_str() {
                "run-single" | "run-multi" => Ok(Self {
                    config,
                    command: Command::Help,
                }),
                _ => Err(UsageError::UnknownCommand(command)),
            };
        }
        let mut args = rest.into_iter();

        let command = match command.as_str() {
            "run-single" => Command::RunSingle,
            "run-multi" => {
                let producers = parse_count("producers", args.next())?;
                let consumers = parse_count("consumers", args.next())?;
                Command::RunMulti {
                    producers,
                    consumers,
                }
            }
            _ => return Err(UsageError::UnknownCommand(command)),
        };

        if let Some(extra) = args.next() {
            return Err(UsageError::UnexpectedArgument(extra));
        }

        Ok(Self { config, command })
    }
}

fn parse_count(name: &'static str, arg: Option<String>) -> Result<usize, UsageError> {
    let value = arg.ok_or(UsageError::MissingArgument(name))?;
    match value.parse::<usize>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(UsageError::InvalidCount { name, value }),
    }
}
