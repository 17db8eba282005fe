//! Option specifications: which letters a script recognizes and which take a value.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while building an option specification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("invalid character '{0}' in option spec: option letters must be ASCII letters")]
    InvalidCharacter(char),

    #[error("misplaced ':' at position {0} in option spec: it must follow an option letter")]
    MisplacedColon(usize),

    #[error("duplicate option letter: {0}")]
    DuplicateLetter(char),

    #[error("option -{0} is defined both with and without a value")]
    ConflictingArity(char),
}

/// A single recognized option letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDef {
    /// The option letter (e.g. 'v' for -v)
    pub letter: char,
    /// Whether the option consumes a value
    pub takes_value: bool,
}

/// Ordered set of recognized option letters.
///
/// The flat string form (`"aVE:"`) is both the `FromStr` input and the
/// `Display` output: bare letters are flags, a letter followed by `:`
/// takes a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSpec {
    options: Vec<OptionDef>,
}

impl OptionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a letter, rejecting duplicates.
    pub fn insert(&mut self, letter: char, takes_value: bool) -> Result<(), SpecError> {
        if !letter.is_ascii_alphabetic() {
            return Err(SpecError::InvalidCharacter(letter));
        }
        if self.contains(letter) {
            return Err(SpecError::DuplicateLetter(letter));
        }
        self.options.push(OptionDef {
            letter,
            takes_value,
        });
        Ok(())
    }

    /// Add a letter, or upgrade an existing one to value-taking.
    ///
    /// A letter keeps the position of its first occurrence and is never
    /// downgraded back to a flag.
    pub(crate) fn upsert(&mut self, letter: char, takes_value: bool) {
        match self.options.iter_mut().find(|def| def.letter == letter) {
            Some(def) => def.takes_value |= takes_value,
            None => self.options.push(OptionDef {
                letter,
                takes_value,
            }),
        }
    }

    /// Append every letter of `other` that is not already defined.
    ///
    /// A letter present in both with a different arity is a conflict.
    pub fn merge(&mut self, other: &OptionSpec) -> Result<(), SpecError> {
        for def in other.iter() {
            match self.get(def.letter) {
                Some(existing) if existing.takes_value != def.takes_value => {
                    return Err(SpecError::ConflictingArity(def.letter));
                }
                Some(_) => {}
                None => self.options.push(*def),
            }
        }
        Ok(())
    }

    pub fn get(&self, letter: char) -> Option<&OptionDef> {
        self.options.iter().find(|def| def.letter == letter)
    }

    pub fn contains(&self, letter: char) -> bool {
        self.get(letter).is_some()
    }

    /// Whether `letter` takes a value, or `None` if it is not recognized.
    pub fn takes_value(&self, letter: char) -> Option<bool> {
        self.get(letter).map(|def| def.takes_value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionDef> {
        self.options.iter()
    }

    pub fn letters(&self) -> impl Iterator<Item = char> + '_ {
        self.options.iter().map(|def| def.letter)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl FromStr for OptionSpec {
    type Err = SpecError;

    /// Parse a flat letter/colon string verbatim.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut spec = OptionSpec::new();
        let mut last_letter: Option<char> = None;

        for (pos, c) in s.chars().enumerate() {
            if c == ':' {
                // A colon applies to the letter pushed just before it.
                last_letter.take().ok_or(SpecError::MisplacedColon(pos))?;
                if let Some(def) = spec.options.last_mut() {
                    def.takes_value = true;
                }
                continue;
            }
            spec.insert(c, false)?;
            last_letter = Some(c);
        }

        Ok(spec)
    }
}

impl fmt::Display for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for def in &self.options {
            write!(f, "{}", def.letter)?;
            if def.takes_value {
                f.write_str(":")?;
            }
        }
        Ok(())
    }
}
