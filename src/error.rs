//! Script-level errors and exit codes.

use crate::help::generate_usage;
use crate::parser::ParseError;
use thiserror::Error;

/// Exit code for success, including the early exit after printing a version.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for general failures.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for usage errors.
pub const EXIT_USAGE: i32 = 2;

/// A fatal error for the calling script.
///
/// The first three variants are usage errors: they are reported together
/// with the syntax banner and exit with `EXIT_USAGE`. `Failure` exits with
/// `EXIT_FAILURE` and no banner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("illegal option -- {0}")]
    UnknownOption(char),

    #[error("option requires an argument -- {0}")]
    MissingArgument(char),

    #[error("{0}")]
    UsageViolation(String),

    #[error("{0}")]
    Failure(String),
}

impl From<ParseError> for ScriptError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnknownOption(c) => ScriptError::UnknownOption(c),
            ParseError::MissingArgument(c) => ScriptError::MissingArgument(c),
        }
    }
}

impl ScriptError {
    pub fn is_usage(&self) -> bool {
        !matches!(self, ScriptError::Failure(_))
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_usage() {
            EXIT_USAGE
        } else {
            EXIT_FAILURE
        }
    }

    /// The lines to print on the error stream, prefixed with the program name.
    pub fn report_lines(&self, program: &str, banner: Option<&str>) -> Vec<String> {
        let mut lines = vec![format!("{}: {}", program, self)];
        if self.is_usage() {
            if let Some(banner) = banner {
                lines.push(generate_usage(banner));
            }
        }
        lines
    }
}
