//! Sourceable shell output: option variables, error exits and version banners.
//!
//! For every letter `l` of the spec the parse output assigns
//!
//! ```text
//! opt_l=1 | opt_l=''       presence
//! opt_l_count=N            occurrences
//! opt_l_arg='...'          last value
//! opt_l_all='...'          all values, space-joined
//! opt_l_argv=('...' ...)   all values, one element each
//! ```
//!
//! and restores the positional arguments with `set -- ...`.

use crate::error::EXIT_SUCCESS;
use crate::log::{LogDestination, TraceMode};
use crate::parser::{OptionState, Parsed};
use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Heredoc delimiter for version output.
const VERSION_DELIMITER: &str = "SHGETOPT_VERSION";

/// Environment variables read back by later `shgetopt` calls.
pub const NAME_VAR: &str = "SHGETOPT_NAME";
pub const USAGE_VAR: &str = "SHGETOPT_USAGE";
pub const LOGFILE_VAR: &str = "SHGETOPT_LOGFILE";
pub const VERBOSITY_VAR: &str = "SHGETOPT_VERBOSITY";
pub const TRACE_VAR: &str = "SHGETOPT_TRACE";

/// Quote a string as a single shell word.
///
/// Single quotes keep everything literal; an embedded `'` is written as `'\''`.
fn quote_shell_value(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}

fn quote_words<'a>(words: impl IntoIterator<Item = &'a String>) -> String {
    words
        .into_iter()
        .map(|w| quote_shell_value(w))
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_option_vars(output: &mut String, letter: char, state: &OptionState) {
    let present = if state.present { "1" } else { "''" };
    let last = state.last_value.as_deref().unwrap_or("");

    output.push_str(&format!("opt_{}={}\n", letter, present));
    output.push_str(&format!("opt_{}_count={}\n", letter, state.count));
    output.push_str(&format!("opt_{}_arg={}\n", letter, quote_shell_value(last)));
    output.push_str(&format!(
        "opt_{}_all={}\n",
        letter,
        quote_shell_value(&state.all_values)
    ));
    output.push_str(&format!(
        "opt_{}_argv=({})\n",
        letter,
        quote_words(&state.value_history)
    ));
}

/// Generate the parse output as a string.
///
/// `program`, the syntax banner and the standard options are exported so
/// later `shgetopt log` and `shgetopt check-int` calls in the same script
/// pick them up. Each variable is either exported or unset, so a script
/// never sees values left over from the script that started it. Tracing is switched on last so the assignments
/// themselves are not traced.
pub fn generate_output_string(
    parsed: &Parsed,
    program: &str,
    banner: Option<&str>,
    log: Option<&LogDestination>,
) -> String {
    let mut output = String::new();

    for (letter, state) in parsed.result.iter() {
        push_option_vars(&mut output, letter, state);
    }

    output.push_str(&format!(
        "export {}={}\n",
        NAME_VAR,
        quote_shell_value(program)
    ));
    match banner {
        Some(banner) => output.push_str(&format!(
            "export {}={}\n",
            USAGE_VAR,
            quote_shell_value(banner)
        )),
        None => output.push_str(&format!("unset {}\n", USAGE_VAR)),
    }

    // Without standard options the levels are reset, never inherited.
    let (verbosity, trace) = parsed
        .standard
        .as_ref()
        .map_or((0, 0), |s| (s.verbosity.level(), s.trace.level()));
    output.push_str(&format!("export {}={}\n", VERBOSITY_VAR, verbosity));
    output.push_str(&format!("export {}={}\n", TRACE_VAR, trace));

    match log {
        Some(LogDestination::File(path)) => output.push_str(&format!(
            "export {}={}\n",
            LOGFILE_VAR,
            quote_shell_value(&path.to_string_lossy())
        )),
        _ => output.push_str(&format!("unset {}\n", LOGFILE_VAR)),
    }

    output.push_str("set --");
    if !parsed.result.remaining.is_empty() {
        output.push(' ');
        output.push_str(&quote_words(&parsed.result.remaining));
    }
    output.push('\n');

    if let Some(standard) = &parsed.standard {
        if standard.trace >= TraceMode::Trace {
            output.push_str("set -x\n");
        }
        if standard.trace >= TraceMode::Echo {
            output.push_str("set -v\n");
        }
    }

    output
}

/// Generate a temporary file with the parse output.
///
/// Returns the path to the temporary file. The file will persist
/// until the process exits or it's manually deleted.
pub fn generate_output(
    parsed: &Parsed,
    program: &str,
    banner: Option<&str>,
    log: Option<&LogDestination>,
) -> Result<PathBuf> {
    write_temp_file(&generate_output_string(parsed, program, banner, log))
}

/// Generate an error output as a string.
///
/// When sourced, the output prints each line to stderr and exits with `code`.
pub fn generate_error_string(lines: &[String], code: i32) -> String {
    let mut output = String::new();
    for line in lines {
        output.push_str(&format!("printf '%s\\n' {} >&2\n", quote_shell_value(line)));
    }
    output.push_str(&format!("exit {}\n", code));
    output
}

/// Generate an error output file.
pub fn generate_error_output(lines: &[String], code: i32) -> Result<PathBuf> {
    write_temp_file(&generate_error_string(lines, code))
}

/// Generate a version output as a string.
///
/// When sourced, the output prints the version and exits 0.
pub fn generate_version_output_string(version_text: &str) -> String {
    format!(
        "cat <<'{delimiter}'\n{text}{delimiter}\nexit {code}\n",
        delimiter = VERSION_DELIMITER,
        text = version_text,
        code = EXIT_SUCCESS
    )
}

/// Generate a version output file.
pub fn generate_version_output(version_text: &str) -> Result<PathBuf> {
    write_temp_file(&generate_version_output_string(version_text))
}

/// Write content to a temporary file and return its path.
fn write_temp_file(content: &str) -> Result<PathBuf> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    let path = file.into_temp_path().keep()?;
    Ok(path)
}
