//! The reserved standard options every script gets unless it opts out.
//!
//! | option      | effect                                         |
//! |-------------|------------------------------------------------|
//! | `-A <file>` | log to `file`, appending                       |
//! | `-D`        | trace execution; twice also echoes every line  |
//! | `-F <file>` | log to `file`, truncating it first             |
//! | `-v`        | print the version banner and exit successfully |
//! | `-V`        | verbose logging; twice for very verbose        |

use crate::error::ScriptError;
use crate::log::{append_log, set_log, LogDestination, LogError, TraceMode, Verbosity};
use crate::parser::ParseResult;
use crate::spec::OptionSpec;
use std::path::PathBuf;

/// Flat spec of the standard options.
pub const STANDARD_SPEC: &str = "A:DF:vV";

pub fn standard_spec() -> OptionSpec {
    STANDARD_SPEC
        .parse()
        .expect("STANDARD_SPEC is a well-formed flat spec")
}

/// Requested change of log destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogRequest {
    #[default]
    Unchanged,
    Truncate(PathBuf),
    Append(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StandardOutcome {
    /// `-v` was given
    Version,
    Continue(StandardOptions),
}

/// The interpreted standard options of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardOptions {
    pub trace: TraceMode,
    pub verbosity: Verbosity,
    pub log: LogRequest,
}

impl StandardOptions {
    /// Interpret the standard letters of a scan.
    ///
    /// `-v` wins over everything else; `-A` together with `-F` is a usage
    /// error.
    pub fn from_result(result: &ParseResult) -> Result<StandardOutcome, ScriptError> {
        if result.is_present('v') {
            return Ok(StandardOutcome::Version);
        }

        let log = match (result.value('A'), result.value('F')) {
            (Some(_), Some(_)) => {
                return Err(ScriptError::UsageViolation(
                    "options -A and -F are mutually exclusive".to_string(),
                ));
            }
            (Some(append), None) => LogRequest::Append(PathBuf::from(append)),
            (None, Some(truncate)) => LogRequest::Truncate(PathBuf::from(truncate)),
            (None, None) => LogRequest::Unchanged,
        };

        Ok(StandardOutcome::Continue(StandardOptions {
            trace: TraceMode::from_count(result.count('D')),
            verbosity: Verbosity::from_count(result.count('V')),
            log,
        }))
    }

    /// Apply the log request, returning the new destination if it changed.
    pub fn open_log(&self) -> Result<Option<LogDestination>, LogError> {
        match &self.log {
            LogRequest::Unchanged => Ok(None),
            LogRequest::Truncate(path) => set_log(path).map(Some),
            LogRequest::Append(path) => append_log(path).map(Some),
        }
    }
}
