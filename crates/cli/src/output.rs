// Rendering command results and failures.
//
// Results go to stdout, failures to stderr. JSON is used when asked for
// with `--json` or when stdout is not a terminal; otherwise plain text.

use serde::Serialize;
use std::io::{self, IsTerminal, Write};

use crate::exit_code::ExitCode;

const ANSI_RED: &str = "\x1b[31m";
const ANSI_RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    /// JSON when `json_flag` is set or stdout is redirected.
    pub fn detect(json_flag: bool) -> Self {
        Self::select(json_flag, io::stdout().is_terminal())
    }

    fn select(json_flag: bool, stdout_is_tty: bool) -> Self {
        if json_flag || !stdout_is_tty {
            Self::Json
        } else {
            Self::Human
        }
    }
}

/// Failure as reported in JSON mode: `{"error":{"code":..,"exit_code":..,"message":..}}`.
#[derive(Debug, Serialize)]
struct ErrorReport<'a> {
    error: ErrorBody<'a>,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'static str,
    exit_code: i32,
    message: &'a str,
}

/// Print a command result on stdout. `human` is only called in text mode.
pub fn print_output<T, F>(format: OutputFormat, value: &T, human: F) -> io::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    write_output(&mut io::stdout().lock(), format, value, human)
}

fn write_output<W, T, F>(out: &mut W, format: OutputFormat, value: &T, human: F) -> io::Result<()>
where
    W: Write,
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    if format == OutputFormat::Human {
        return writeln!(out, "{}", human(value));
    }
    serde_json::to_writer(&mut *out, value).map_err(io::Error::other)?;
    writeln!(out)
}

/// Report a failed command on stderr, tagged with the exit code it maps to.
pub fn print_error(format: OutputFormat, error: &anyhow::Error) {
    let stderr = io::stderr();
    let colored = stderr.is_terminal();
    let code = ExitCode::from_error(error);
    // Nothing useful can be done if stderr itself is gone.
    let _ = write_error(&mut stderr.lock(), format, code, &format!("{error:#}"), colored);
}

fn write_error<W: Write>(
    out: &mut W,
    format: OutputFormat,
    code: ExitCode,
    message: &str,
    colored: bool,
) -> io::Result<()> {
    match format {
        OutputFormat::Human if colored => {
            writeln!(out, "{ANSI_RED}hgnotify error:{ANSI_RESET} {message}")
        }
        OutputFormat::Human => writeln!(out, "hgnotify error: {message}"),
        OutputFormat::Json => {
            let report = ErrorReport {
                error: ErrorBody { code: code.label(), exit_code: code.code(), message },
            };
            serde_json::to_writer(&mut *out, &report).map_err(io::Error::other)?;
            writeln!(out)
        }
    }
}
