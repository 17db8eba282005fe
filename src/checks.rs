//! Semantic checks a script performs after parsing.

use crate::error::ScriptError;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid argument count '{0}': expected MIN, MIN:MAX or MIN:")]
pub struct ArgCountError(String);

/// Accepted number of positional arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgCount {
    pub min: usize,
    /// `None` means unbounded
    pub max: Option<usize>,
}

impl ArgCount {
    pub fn exactly(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    pub fn accepts(&self, n: usize) -> bool {
        n >= self.min && self.max.map_or(true, |max| n <= max)
    }
}

impl FromStr for ArgCount {
    type Err = ArgCountError;

    /// Parse `"2"` (exactly two), `"1:3"` or `"1:"` (at least one).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ArgCountError(s.to_string());
        let s = s.trim();

        let Some((min, max)) = s.split_once(':') else {
            let n = s.parse().map_err(|_| invalid())?;
            return Ok(ArgCount::exactly(n));
        };

        let min: usize = min.parse().map_err(|_| invalid())?;
        let max = if max.is_empty() {
            None
        } else {
            let max: usize = max.parse().map_err(|_| invalid())?;
            if max < min {
                return Err(invalid());
            }
            Some(max)
        };
        Ok(ArgCount { min, max })
    }
}

impl fmt::Display for ArgCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "exactly {}", max),
            Some(max) => write!(f, "between {} and {}", self.min, max),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// Fail with a usage error unless `remaining` has an accepted length.
pub fn require_arg_count(remaining: &[String], count: ArgCount) -> Result<(), ScriptError> {
    if count.accepts(remaining.len()) {
        return Ok(());
    }
    Err(ScriptError::UsageViolation(format!(
        "wrong number of arguments: expected {}, got {}",
        count,
        remaining.len()
    )))
}

/// Parse `value` as a signed integer or fail with a usage error naming `label`.
pub fn require_integer(label: &str, value: &str) -> Result<i64, ScriptError> {
    value.parse::<i64>().map_err(|_| {
        ScriptError::UsageViolation(format!("{}: '{}' is not an integer", label, value))
    })
}
