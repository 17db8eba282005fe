//! Option scanning for target scripts.

use crate::checks::require_arg_count;
use crate::config::Config;
use crate::error::ScriptError;
use crate::spec::OptionSpec;
use crate::standard::{StandardOptions, StandardOutcome};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while scanning arguments.
///
/// Messages follow getopts wording and name the offending letter verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("illegal option -- {0}")]
    UnknownOption(char),

    #[error("option requires an argument -- {0}")]
    MissingArgument(char),
}

/// Everything the scanner records about one option letter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionState {
    /// The option appeared at least once
    pub present: bool,
    /// Number of occurrences
    pub count: usize,
    /// Value of the most recent occurrence (value-taking options only)
    pub last_value: Option<String>,
    /// Space-joined history of every value
    pub all_values: String,
    /// One entry per value, in order of occurrence
    pub value_history: Vec<String>,
}

impl OptionState {
    fn record(&mut self, value: Option<String>) {
        self.present = true;
        self.count += 1;
        if let Some(value) = value {
            if !self.all_values.is_empty() {
                self.all_values.push(' ');
            }
            self.all_values.push_str(&value);
            self.value_history.push(value.clone());
            self.last_value = Some(value);
        }
    }
}

/// Fresh state for every letter in `spec`.
pub fn reset_state(spec: &OptionSpec) -> HashMap<char, OptionState> {
    spec.letters()
        .map(|letter| (letter, OptionState::default()))
        .collect()
}

/// The outcome of a successful scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    spec: OptionSpec,
    states: HashMap<char, OptionState>,
    /// Positional arguments left after the options
    pub remaining: Vec<String>,
}

impl ParseResult {
    pub fn spec(&self) -> &OptionSpec {
        &self.spec
    }

    pub fn state(&self, letter: char) -> Option<&OptionState> {
        self.states.get(&letter)
    }

    pub fn is_present(&self, letter: char) -> bool {
        self.state(letter).map_or(false, |s| s.present)
    }

    pub fn count(&self, letter: char) -> usize {
        self.state(letter).map_or(0, |s| s.count)
    }

    pub fn value(&self, letter: char) -> Option<&str> {
        self.state(letter).and_then(|s| s.last_value.as_deref())
    }

    /// Per-letter state in spec order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &OptionState)> {
        self.spec
            .letters()
            .filter_map(|letter| self.states.get(&letter).map(|s| (letter, s)))
    }
}

/// Scan `args` against `spec`.
///
/// Options are read from the front of `args` until the first token that
/// does not start with `-`, a lone `-`, or `--` (which is consumed).
pub fn scan(spec: &OptionSpec, args: &[String]) -> Result<ParseResult, ParseError> {
    let mut scanner = Scanner::new(spec, args);
    scanner.run()?;

    let result = ParseResult {
        spec: spec.clone(),
        states: scanner.states,
        remaining: args[scanner.index..].to_vec(),
    };
    debug!(
        spec = %spec,
        consumed = scanner.index,
        remaining = result.remaining.len(),
        "scanned arguments"
    );
    Ok(result)
}

/// Internal scanner state.
struct Scanner<'a> {
    spec: &'a OptionSpec,
    args: &'a [String],
    states: HashMap<char, OptionState>,
    index: usize,
}

impl<'a> Scanner<'a> {
    fn new(spec: &'a OptionSpec, args: &'a [String]) -> Self {
        Self {
            spec,
            args,
            states: reset_state(spec),
            index: 0,
        }
    }

    fn run(&mut self) -> Result<(), ParseError> {
        let args = self.args;
        while let Some(arg) = args.get(self.index) {
            if arg == "--" {
                self.index += 1;
                break;
            }
            let Some(cluster) = arg.strip_prefix('-') else {
                break;
            };
            if cluster.is_empty() {
                // A lone "-" is a positional argument (often stdin).
                break;
            }
            self.index += 1;
            self.scan_cluster(cluster)?;
        }
        Ok(())
    }

    fn scan_cluster(&mut self, cluster: &str) -> Result<(), ParseError> {
        for (pos, letter) in cluster.char_indices() {
            let takes_value = self
                .spec
                .takes_value(letter)
                .ok_or(ParseError::UnknownOption(letter))?;

            if !takes_value {
                self.record(letter, None);
                continue;
            }

            // The value is the rest of this token, or the next token.
            let attached = &cluster[pos + letter.len_utf8()..];
            let value = if !attached.is_empty() {
                attached.to_string()
            } else {
                let args = self.args;
                let next = args
                    .get(self.index)
                    .ok_or(ParseError::MissingArgument(letter))?;
                self.index += 1;
                next.clone()
            };
            self.record(letter, Some(value));
            return Ok(());
        }
        Ok(())
    }

    fn record(&mut self, letter: char, value: Option<String>) {
        self.states.entry(letter).or_default().record(value);
    }
}

/// Outcome of parsing a script's arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Options scanned and checked.
    Success(Parsed),
    /// `-v` was given: print the version banner and exit successfully.
    Version,
}

/// A successful parse, with the interpreted standard options when enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub result: ParseResult,
    pub standard: Option<StandardOptions>,
}

/// Parse a script's arguments according to the config.
///
/// Scans against the config's spec, applies the standard options (which may
/// short-circuit with `ParseOutcome::Version`) and then checks the
/// positional argument count if the config declares one.
pub fn parse_args(config: &Config, args: &[String]) -> Result<ParseOutcome, ScriptError> {
    let spec = config
        .option_spec()
        .map_err(|e| ScriptError::Failure(e.to_string()))?;
    let result = scan(&spec, args)?;

    let standard = if config.standard_options {
        match StandardOptions::from_result(&result)? {
            StandardOutcome::Version => return Ok(ParseOutcome::Version),
            StandardOutcome::Continue(standard) => Some(standard),
        }
    } else {
        None
    };

    if let Some(count) = config.arg_count() {
        require_arg_count(&result.remaining, count)?;
    }

    Ok(ParseOutcome::Success(Parsed { result, standard }))
}
