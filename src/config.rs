//! JSON configuration parsing and types for shgetopt.

use crate::checks::ArgCount;
use crate::help::{program_name, syntax_banner};
use crate::spec::{OptionSpec, SpecError};
use crate::standard::standard_spec;
use crate::usage::derive_spec;
use serde::Deserialize;
use thiserror::Error;

/// Program name used when neither the config nor the CLI provides one.
pub const DEFAULT_PROGRAM_NAME: &str = "script";

/// Errors that can occur during config parsing and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse JSON config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("invalid option spec: {0}")]
    InvalidSpec(#[from] SpecError),

    #[error("option -{0} is reserved by the standard options with a different arity (disable them with standard_options: false)")]
    ReservedLetter(char),

    #[error("max_args ({max}) is smaller than min_args ({min})")]
    InvalidArgCount { min: usize, max: usize },
}

fn default_standard_options() -> bool {
    true
}

/// Top-level configuration for a script.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Name or path of the script; its base name prefixes every message
    pub name: Option<String>,
    /// Version of the script, shown by `-v`
    pub version: Option<String>,
    /// Usage line, e.g. `"prog [-a] [-E level] file"`
    pub usage: Option<String>,
    /// Flat option spec, used verbatim instead of deriving one from `usage`
    pub spec: Option<String>,
    /// Whether the standard options `-A -D -F -v -V` are handled (default: true)
    #[serde(default = "default_standard_options")]
    pub standard_options: bool,
    /// Minimum number of positional arguments
    pub min_args: Option<usize>,
    /// Maximum number of positional arguments
    pub max_args: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: None,
            version: None,
            usage: None,
            spec: None,
            standard_options: true,
            min_args: None,
            max_args: None,
        }
    }
}

impl Config {
    /// Parse a JSON string into a Config.
    pub fn from_json(json: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.option_spec()?;

        if let (Some(min), Some(max)) = (self.min_args, self.max_args) {
            if max < min {
                return Err(ConfigError::InvalidArgCount { min, max });
            }
        }

        Ok(())
    }

    /// The spec the scanner runs with.
    ///
    /// An explicit `spec` is used verbatim, otherwise it is derived from
    /// `usage`. The standard options are appended when enabled.
    pub fn option_spec(&self) -> Result<OptionSpec, ConfigError> {
        let mut spec = match (&self.spec, &self.usage) {
            (Some(flat), _) => flat.parse::<OptionSpec>()?,
            (None, Some(usage)) => derive_spec(usage),
            (None, None) => OptionSpec::new(),
        };

        if self.standard_options {
            spec.merge(&standard_spec()).map_err(|e| match e {
                SpecError::ConflictingArity(letter) => ConfigError::ReservedLetter(letter),
                other => ConfigError::InvalidSpec(other),
            })?;
        }

        Ok(spec)
    }

    /// The base name of the script, or `DEFAULT_PROGRAM_NAME`.
    pub fn program_name(&self) -> String {
        self.name
            .as_deref()
            .map(program_name)
            .unwrap_or_else(|| DEFAULT_PROGRAM_NAME.to_string())
    }

    /// The usage line recorded for error messages.
    pub fn syntax_banner(&self) -> Option<&str> {
        self.usage.as_deref().and_then(syntax_banner)
    }

    pub fn arg_count(&self) -> Option<ArgCount> {
        match (self.min_args, self.max_args) {
            (None, None) => None,
            (min, max) => Some(ArgCount {
                min: min.unwrap_or(0),
                max,
            }),
        }
    }

    pub fn set_arg_count(&mut self, count: ArgCount) {
        self.min_args = Some(count.min);
        self.max_args = count.max;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "name": "/opt/tools/backup.sh",
            "version": "1.4.0",
            "usage": "backup.sh [-n] [-t target] dir",
            "standard_options": true,
            "min_args": 1,
            "max_args": 1
        }"#;

        let config = Config::from_json(json).unwrap();
        assert_eq!(config.version, Some("1.4.0".to_string()));
        assert!(config.standard_options);
        config.validate().unwrap();

        assert_eq!(config.program_name(), "backup.sh");
        assert_eq!(
            config.syntax_banner(),
            Some("backup.sh [-n] [-t target] dir")
        );
        assert_eq!(config.option_spec().unwrap().to_string(), "nt:A:DF:vV");
        assert_eq!(config.arg_count(), Some(ArgCount::exactly(1)));
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::from_json("{}").unwrap();
        assert!(config.name.is_none());
        assert!(config.usage.is_none());
        assert!(config.standard_options);
        assert_eq!(config.program_name(), DEFAULT_PROGRAM_NAME);
        assert_eq!(config.syntax_banner(), None);
        assert_eq!(config.arg_count(), None);
        config.validate().unwrap();
    }

    #[test]
    fn test_default_matches_empty_json() {
        let config = Config::default();
        assert!(config.standard_options);
        assert_eq!(
            config.option_spec().unwrap(),
            Config::from_json("{}").unwrap().option_spec().unwrap()
        );
    }

    #[test]
    fn test_explicit_spec_keeps_usage_banner() {
        let json = r#"{"usage": "prog [-a] file", "spec": "ab:", "standard_options": false}"#;
        let config = Config::from_json(json).unwrap();
        assert_eq!(config.option_spec().unwrap().to_string(), "ab:");
        assert_eq!(config.syntax_banner(), Some("prog [-a] file"));
    }

    #[test]
    fn test_flat_usage_is_not_a_banner() {
        let json = r#"{"usage": "ab:", "standard_options": false}"#;
        let config = Config::from_json(json).unwrap();
        assert_eq!(config.option_spec().unwrap().to_string(), "ab:");
        assert_eq!(config.syntax_banner(), None);
    }

    #[test]
    fn test_standard_letters_in_usage_are_merged() {
        let json = r#"{"usage": "prog [-aDgvVX] [-A logfile] [-E errorlevel] [-F logfile] file"}"#;
        let config = Config::from_json(json).unwrap();
        assert_eq!(config.option_spec().unwrap().to_string(), "aDgvVXA:E:F:");
    }

    #[test]
    fn test_error_on_reserved_letter_with_other_arity() {
        let json = r#"{"usage": "prog [-v level]"}"#;
        let config = Config::from_json(json).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ReservedLetter('v'))
        ));

        let json = r#"{"usage": "prog [-v level]", "standard_options": false}"#;
        Config::from_json(json).unwrap().validate().unwrap();
    }

    #[test]
    fn test_error_on_invalid_spec() {
        let json = r#"{"spec": "a::"}"#;
        let config = Config::from_json(json).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSpec(SpecError::MisplacedColon(2)))
        ));
    }

    #[test]
    fn test_error_on_inverted_arg_count() {
        let json = r#"{"min_args": 3, "max_args": 1}"#;
        let config = Config::from_json(json).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidArgCount { min: 3, max: 1 })
        ));
    }

    #[test]
    fn test_min_args_only_is_unbounded() {
        let json = r#"{"min_args": 2}"#;
        let config = Config::from_json(json).unwrap();
        assert_eq!(config.arg_count(), Some(ArgCount { min: 2, max: None }));
    }

    #[test]
    fn test_set_arg_count() {
        let mut config = Config::default();
        config.set_arg_count("1:3".parse().unwrap());
        assert_eq!(config.min_args, Some(1));
        assert_eq!(config.max_args, Some(3));
    }

    #[test]
    fn test_error_on_malformed_json() {
        let result = Config::from_json("{not json");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
