//! shgetopt - usage-string driven option parsing for shell scripts.
//!
//! This library derives an option spec from a script's usage line, scans
//! the script's arguments against it, interprets the standard options
//! (`-A -D -F -v -V`) and renders the result as a sourceable shell file.
//! It also provides the logging and exit-code conventions scripts share.

pub mod checks;
pub mod config;
pub mod error;
pub mod help;
pub mod log;
pub mod output;
pub mod parser;
pub mod spec;
pub mod standard;
pub mod usage;

pub use checks::{require_arg_count, require_integer, ArgCount};
pub use config::{Config, ConfigError};
pub use error::{ScriptError, EXIT_FAILURE, EXIT_SUCCESS, EXIT_USAGE};
pub use help::{generate_usage, generate_version, program_name, syntax_banner};
pub use log::{append_log, set_log, Level, LogDestination, Logger, TraceMode, Verbosity};
pub use output::{generate_error_output, generate_output, generate_version_output};
pub use parser::{
    parse_args, reset_state, scan, OptionState, ParseError, ParseOutcome, ParseResult, Parsed,
};
pub use spec::{OptionDef, OptionSpec, SpecError};
pub use standard::{LogRequest, StandardOptions, StandardOutcome, STANDARD_SPEC};
pub use usage::derive_spec;
