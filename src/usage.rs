//! Derivation of an option spec from a human-readable usage string.
//!
//! A usage string such as `prog [-aDgvVX] [-A logfile] [-E errorlevel] file`
//! is reduced to the spec `aDgvVXA:E:`. Only bracketed groups that start with
//! a dash contribute letters:
//!
//! - `[-xyz]` declares the flags `x`, `y` and `z`;
//! - `[-x value]` declares `x` as taking a value;
//! - any other bracket (`[file]`, `[-1]`) is ignored;
//! - a nested group (`[-o file [-m mode]]`) closes its enclosing group, so
//!   both `o:` and `m:` are declared.
//!
//! Everything from a `--` token onward is ignored, as is text outside the
//! brackets. Input without any bracket is treated as an already flat spec.

use crate::spec::OptionSpec;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outside,
    Inside,
}

/// Derive the option spec described by `usage`.
pub fn derive_spec(usage: &str) -> OptionSpec {
    let usage = strip_end_of_options(usage);

    let mut spec = OptionSpec::new();
    if !usage.contains('[') {
        // A bare word is a flat spec; several words are a usage line
        // that declares no options.
        if !usage.trim().contains(char::is_whitespace) {
            reduce_flat(usage.trim(), &mut spec);
        }
        debug!(usage, spec = %spec, "derived spec from bracket-free usage");
        return spec;
    }

    let mut state = State::Outside;
    let mut group = String::new();

    for c in usage.chars() {
        match (state, c) {
            (State::Outside, '[') => {
                group.clear();
                state = State::Inside;
            }
            (State::Outside, _) => {}
            // A nested group closes the enclosing one.
            (State::Inside, '[') => {
                reduce_group(&group, &mut spec);
                group.clear();
            }
            (State::Inside, ']') => {
                reduce_group(&group, &mut spec);
                state = State::Outside;
            }
            (State::Inside, c) => group.push(c),
        }
    }
    // An unterminated group is trailing filler and contributes nothing.

    debug!(usage, spec = %spec, "derived spec from usage");
    spec
}

/// Cut `usage` at the first `--` token.
fn strip_end_of_options(usage: &str) -> &str {
    let mut prev: Option<char> = None;
    for (pos, c) in usage.char_indices() {
        let at_token_start = prev.map_or(true, |p| p.is_whitespace() || p == '[');
        if c == '-' && at_token_start && usage[pos..].starts_with("--") {
            return &usage[..pos];
        }
        prev = Some(c);
    }
    usage
}

/// Reduce the content of one bracketed group into `spec`.
fn reduce_group(content: &str, spec: &mut OptionSpec) {
    let content = content.trim();

    let Some(rest) = content.strip_prefix('-') else {
        return;
    };
    match rest.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return,
    }

    let letters_end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let (letters, tail) = rest.split_at(letters_end);

    if tail.starts_with(char::is_whitespace) && !tail.trim().is_empty() {
        // `[-x value]`: the last letter takes the value, the placeholder is dropped.
        let mut chars = letters.chars();
        let last = chars.next_back();
        for c in chars {
            spec.upsert(c, false);
        }
        if let Some(c) = last {
            spec.upsert(c, true);
        }
        return;
    }

    reduce_flat(rest, spec);
}

/// Keep letters and the colons that directly follow them; drop everything else.
fn reduce_flat(text: &str, spec: &mut OptionSpec) {
    let mut last_letter: Option<char> = None;
    for c in text.chars() {
        if c.is_ascii_alphabetic() {
            spec.upsert(c, false);
            last_letter = Some(c);
        } else if c == ':' {
            if let Some(letter) = last_letter.take() {
                spec.upsert(letter, true);
            }
        } else {
            last_letter = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derived(usage: &str) -> String {
        derive_spec(usage).to_string()
    }

    #[test]
    fn test_derive_full_usage() {
        assert_eq!(
            derived("prog [-aDgvVX] [-A logfile] [-E errorlevel] [-F logfile] file"),
            "aDgvVXA:E:F:"
        );
    }

    #[test]
    fn test_derive_flags_and_value() {
        assert_eq!(derived("prog [-aV] [-E level] file"), "aVE:");
    }

    #[test]
    fn test_non_option_groups_are_dropped() {
        assert_eq!(derived("prog [-a] [file] [ more files ]"), "a");
    }

    #[test]
    fn test_punctuation_groups_are_dropped() {
        assert_eq!(derived("prog [-?] [-1 n] [-b]"), "b");
    }

    #[test]
    fn test_whitespace_inside_brackets_is_trimmed() {
        assert_eq!(derived("prog [ -x ] [  -o   outfile  ]"), "xo:");
    }

    #[test]
    fn test_leading_text_is_ignored() {
        assert_eq!(derived("usage: prog -z [-a]"), "a");
    }

    #[test]
    fn test_text_after_end_of_options_is_ignored() {
        assert_eq!(derived("prog [-a] -- [-b] [-c value]"), "a");
        assert_eq!(derived("prog [-a] [--] [-b]"), "a");
    }

    #[test]
    fn test_double_dash_inside_word_is_kept() {
        assert_eq!(derived("prog [-a] file--name [-b]"), "ab");
    }

    #[test]
    fn test_unterminated_group_is_ignored() {
        assert_eq!(derived("prog [-a] [-b"), "a");
    }

    #[test]
    fn test_empty_and_option_free_usage() {
        assert_eq!(derived(""), "");
        assert_eq!(derived("prog file ..."), "");
        assert_eq!(derived("prog [file]"), "");
    }

    #[test]
    fn test_multi_letter_cluster_with_placeholder() {
        // Only the last letter takes the value.
        assert_eq!(derived("prog [-xy value]"), "xy:");
    }

    #[test]
    fn test_duplicate_letters_keep_first_position() {
        assert_eq!(derived("prog [-ab] [-a value]"), "a:b");
    }

    #[test]
    fn test_nested_group_closes_outer() {
        assert_eq!(derived("prog [-o file [-m mode]]"), "o:m:");
        assert_eq!(derived("prog [-a [-b]] [-c]"), "abc");
    }

    #[test]
    fn test_flat_spec_is_used_as_is() {
        assert_eq!(derived("aDgvVXA:E:F:"), "aDgvVXA:E:F:");
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let usages = [
            "prog [-aDgvVX] [-A logfile] [-E errorlevel] [-F logfile] file",
            "prog [-aV] [-E level] file",
            "prog [-x value] [-y] [-z other] -- rest",
            "prog [-abc]",
            "prog",
            "",
        ];
        for usage in usages {
            let once = derive_spec(usage);
            let twice = derive_spec(&once.to_string());
            assert_eq!(once, twice, "usage: {usage}");
        }
    }
}
