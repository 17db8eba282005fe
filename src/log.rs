//! Log destination and timestamped log lines for scripts.

use chrono::{Local, NaiveDateTime};
use clap::ValueEnum;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum LogError {
    #[error("cannot open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write log line: {0}")]
    Write(#[from] io::Error),
}

/// Where log lines go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogDestination {
    #[default]
    Stderr,
    File(PathBuf),
}

/// Truncate `path` and make it the log destination.
pub fn set_log(path: &Path) -> Result<LogDestination, LogError> {
    File::create(path).map_err(|source| LogError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LogDestination::File(path.to_path_buf()))
}

/// Make `path` the log destination, keeping what it already holds.
pub fn append_log(path: &Path) -> Result<LogDestination, LogError> {
    open_append(path)?;
    Ok(LogDestination::File(path.to_path_buf()))
}

fn open_append(path: &Path) -> Result<File, LogError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Logging verbosity selected with repeated `-V`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    #[default]
    Quiet,
    Verbose,
    VeryVerbose,
}

impl Verbosity {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => Verbosity::Quiet,
            1 => Verbosity::Verbose,
            _ => Verbosity::VeryVerbose,
        }
    }

    pub fn level(self) -> usize {
        self as usize
    }
}

/// Execution tracing selected with repeated `-D`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum TraceMode {
    #[default]
    Off,
    /// Trace commands as they execute (`set -x`)
    Trace,
    /// Also echo every line before executing it (`set -v`)
    Echo,
}

impl TraceMode {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => TraceMode::Off,
            1 => TraceMode::Trace,
            _ => TraceMode::Echo,
        }
    }

    pub fn level(self) -> usize {
        self as usize
    }
}

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Level {
    /// Always written
    Info,
    /// Written with `-V`
    Verbose,
    /// Written with `-VV`
    VeryVerbose,
    /// Written with `-D`
    Trace,
}

/// Render one log line.
pub fn format_line(timestamp: NaiveDateTime, program: &str, message: &str) -> String {
    format!(
        "{} {}: {}",
        timestamp.format(TIMESTAMP_FORMAT),
        program,
        message
    )
}

/// Writes timestamped lines for one program to the current destination.
#[derive(Debug, Clone)]
pub struct Logger {
    program: String,
    destination: LogDestination,
    verbosity: Verbosity,
    trace: TraceMode,
}

impl Logger {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            destination: LogDestination::Stderr,
            verbosity: Verbosity::Quiet,
            trace: TraceMode::Off,
        }
    }

    pub fn with_destination(mut self, destination: LogDestination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_trace(mut self, trace: TraceMode) -> Self {
        self.trace = trace;
        self
    }

    pub fn destination(&self) -> &LogDestination {
        &self.destination
    }

    pub fn enabled(&self, level: Level) -> bool {
        match level {
            Level::Info => true,
            Level::Verbose => self.verbosity >= Verbosity::Verbose,
            Level::VeryVerbose => self.verbosity >= Verbosity::VeryVerbose,
            Level::Trace => self.trace != TraceMode::Off,
        }
    }

    /// Write `message` if `level` is enabled. Returns whether a line was written.
    pub fn log(&self, level: Level, message: &str) -> Result<bool, LogError> {
        if !self.enabled(level) {
            return Ok(false);
        }
        let line = format_line(Local::now().naive_local(), &self.program, message);
        self.write_line(&line)?;
        Ok(true)
    }

    fn write_line(&self, line: &str) -> Result<(), LogError> {
        match &self.destination {
            LogDestination::Stderr => {
                let mut stderr = io::stderr().lock();
                writeln!(stderr, "{}", line)?;
                stderr.flush()?;
            }
            LogDestination::File(path) => {
                let mut file = open_append(path)?;
                writeln!(file, "{}", line)?;
                file.flush()?;
            }
        }
        Ok(())
    }
}
