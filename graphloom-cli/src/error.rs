//! CLI error handling and exit codes.

use std::fmt;
use std::process;

use colored::Colorize;

pub const EXIT_ERROR: i32 = 1;

pub enum CliError {
    Mapping(graphloom_r2rml::R2rmlError),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Mapping(err) => write!(f, "{err}"),
            CliError::Io(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "invalid row-data file: {err}"),
        }
    }
}

// Debug delegates to Display so propagated errors print cleanly.
impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for CliError {}

impl From<graphloom_r2rml::R2rmlError> for CliError {
    fn from(err: graphloom_r2rml::R2rmlError) -> Self {
        CliError::Mapping(err)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Json(err)
    }
}

pub type CliResult<T> = Result<T, CliError>;

/// Print the error with the usual `error:` prefix and exit.
pub fn exit_with_error(err: CliError) -> ! {
    eprintln!("{} {err}", "error:".red().bold());
    process::exit(EXIT_ERROR)
}
