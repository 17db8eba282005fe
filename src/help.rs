//! Syntax banner, version banner and program identity.

use std::path::Path;

/// The usage text to record as the syntax banner, if it looks like one.
///
/// A usage line names its options in brackets; text without any bracket
/// (for instance a flat spec such as `"ab:"`) is not a banner.
pub fn syntax_banner(usage: &str) -> Option<&str> {
    let usage = usage.trim();
    usage.contains('[').then_some(usage)
}

/// The usage line printed after a usage error.
pub fn generate_usage(banner: &str) -> String {
    format!("Usage: {}", banner)
}

/// Generate the version banner.
pub fn generate_version(program: &str, version: Option<&str>) -> String {
    let mut banner = program.to_string();
    if let Some(v) = version {
        banner.push(' ');
        banner.push_str(v);
    }
    banner.push('\n');
    banner
}

/// The base name of a script path, as used in messages.
pub fn program_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
