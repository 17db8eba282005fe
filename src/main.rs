//! shgetopt - usage-string driven option parsing for shell scripts.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shgetopt::config::DEFAULT_PROGRAM_NAME;
use shgetopt::output::{LOGFILE_VAR, NAME_VAR, TRACE_VAR, USAGE_VAR, VERBOSITY_VAR};
use shgetopt::{
    append_log, derive_spec, generate_error_output, generate_output, generate_version,
    generate_version_output, parse_args, program_name, require_integer, set_log, ArgCount,
    Config, Level, LogDestination, Logger, ParseOutcome, ScriptError, TraceMode, Verbosity,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter for internal diagnostics.
const DEBUG_VAR: &str = "SHGETOPT_DEBUG";

/// Usage-string driven option parsing for shell scripts.
#[derive(Parser, Debug)]
#[command(name = "shgetopt", version, about, disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse script arguments and print the path of a file to source
    Parse {
        /// JSON configuration for the target script
        #[arg(long)]
        config: Option<String>,

        /// Usage line of the target script (overrides config)
        #[arg(long)]
        usage: Option<String>,

        /// Flat option spec such as "ab:c", used instead of deriving one from the usage
        #[arg(long)]
        spec: Option<String>,

        /// Name or path of the target script (overrides config)
        #[arg(long)]
        name: Option<String>,

        /// Version of the target script, printed for -v (overrides config)
        #[arg(long = "script-version")]
        script_version: Option<String>,

        /// Do not handle the standard options -A -D -F -v -V
        #[arg(long)]
        no_standard: bool,

        /// Accepted number of positional arguments: MIN, MIN:MAX or MIN:
        #[arg(long = "args", value_name = "MIN[:MAX]")]
        arg_count: Option<ArgCount>,

        /// Arguments to parse for the target script
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Print the option spec derived from a usage line
    Spec {
        /// Usage line to reduce
        #[arg(long)]
        usage: String,
    },

    /// Append a timestamped line to the script's log
    Log {
        /// Program name prefixed to the line
        #[arg(long, env = NAME_VAR)]
        name: Option<String>,

        /// Severity of the message
        #[arg(long, value_enum, default_value_t = Level::Info)]
        level: Level,

        /// Verbosity in effect (number of -V given to the script)
        #[arg(long, env = VERBOSITY_VAR, default_value_t = 0)]
        verbosity: usize,

        /// Trace mode in effect (number of -D given to the script)
        #[arg(long, env = TRACE_VAR, default_value_t = 0)]
        trace: usize,

        /// Log file; standard error when unset
        #[arg(long, env = LOGFILE_VAR)]
        file: Option<PathBuf>,

        /// Truncate the log file before writing
        #[arg(long, requires = "file")]
        truncate: bool,

        /// Message words
        #[arg(required = true)]
        message: Vec<String>,
    },

    /// Check that a value is an integer, exiting 2 with a usage error if not
    CheckInt {
        /// Program name prefixed to the error
        #[arg(long, env = NAME_VAR)]
        name: Option<String>,

        /// Syntax banner printed with the error
        #[arg(long, env = USAGE_VAR)]
        usage: Option<String>,

        /// What the value is, for the error message
        #[arg(long)]
        label: String,

        /// Value to check
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

/// Parse-command overrides applied on top of the JSON config.
#[derive(Debug, Default)]
struct Overrides {
    usage: Option<String>,
    spec: Option<String>,
    name: Option<String>,
    script_version: Option<String>,
    no_standard: bool,
    arg_count: Option<ArgCount>,
}

/// Build the effective config: CLI flags take priority over the JSON config.
fn build_config(json: Option<&str>, overrides: Overrides) -> Result<Config> {
    let mut cfg = match json {
        Some(json) => Config::from_json(json).context("failed to parse config JSON")?,
        None => Config::default(),
    };

    if overrides.usage.is_some() {
        cfg.usage = overrides.usage;
    }
    if overrides.spec.is_some() {
        cfg.spec = overrides.spec;
    }
    if overrides.name.is_some() {
        cfg.name = overrides.name;
    }
    if overrides.script_version.is_some() {
        cfg.version = overrides.script_version;
    }
    if overrides.no_standard {
        cfg.standard_options = false;
    }
    if let Some(count) = overrides.arg_count {
        cfg.set_arg_count(count);
    }

    cfg.validate().context("invalid config")?;
    Ok(cfg)
}

/// Parse the script's arguments and write the matching sourceable file.
fn run_parse(cfg: &Config, args: &[String]) -> Result<PathBuf> {
    let program = cfg.program_name();
    let banner = cfg.syntax_banner();

    let fail = |err: ScriptError| {
        generate_error_output(&err.report_lines(&program, banner), err.exit_code())
    };

    match parse_args(cfg, args) {
        Ok(ParseOutcome::Version) => {
            generate_version_output(&generate_version(&program, cfg.version.as_deref()))
        }
        Ok(ParseOutcome::Success(parsed)) => {
            let log = match &parsed.standard {
                Some(standard) => match standard.open_log() {
                    Ok(log) => log,
                    Err(err) => return fail(ScriptError::Failure(err.to_string())),
                },
                None => None,
            };
            generate_output(&parsed, &program, banner, log.as_ref())
        }
        Err(err) => fail(err),
    }
}

fn open_destination(file: Option<&Path>, truncate: bool) -> Result<LogDestination> {
    let destination = match file {
        Some(path) if truncate => set_log(path)?,
        Some(path) => append_log(path)?,
        None => LogDestination::Stderr,
    };
    Ok(destination)
}

fn effective_name(name: Option<&str>) -> String {
    name.map(program_name)
        .unwrap_or_else(|| DEFAULT_PROGRAM_NAME.to_string())
}

/// Print a script error the way scripts report it and exit with its code.
fn exit_with(err: &ScriptError, program: &str, banner: Option<&str>) -> ! {
    for line in err.report_lines(program, banner) {
        eprintln!("{}", line);
    }
    std::process::exit(err.exit_code());
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env(DEBUG_VAR))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            config,
            usage,
            spec,
            name,
            script_version,
            no_standard,
            arg_count,
            args,
        } => {
            let overrides = Overrides {
                usage,
                spec,
                name,
                script_version,
                no_standard,
                arg_count,
            };
            let cfg = build_config(config.as_deref(), overrides)?;
            let path = run_parse(&cfg, &args).context("failed to generate output file")?;
            println!("{}", path.display());
        }
        Commands::Spec { usage } => {
            println!("{}", derive_spec(&usage));
        }
        Commands::Log {
            name,
            level,
            verbosity,
            trace,
            file,
            truncate,
            message,
        } => {
            let destination = open_destination(file.as_deref(), truncate)?;
            let logger = Logger::new(effective_name(name.as_deref()))
                .with_destination(destination)
                .with_verbosity(Verbosity::from_count(verbosity))
                .with_trace(TraceMode::from_count(trace));
            logger
                .log(level, &message.join(" "))
                .context("failed to write log line")?;
        }
        Commands::CheckInt {
            name,
            usage,
            label,
            value,
        } => {
            if let Err(err) = require_integer(&label, &value) {
                exit_with(&err, &effective_name(name.as_deref()), usage.as_deref());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;

    fn args(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    fn read_and_remove(path: PathBuf) -> String {
        let contents = fs::read_to_string(&path).unwrap();
        fs::remove_file(path).unwrap();
        contents
    }

    #[test]
    fn test_cli_help() {
        // Verify the command can generate help without panicking
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_requires_subcommand() {
        let result = Cli::try_parse_from(["shgetopt"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_subcommand_parses_args() {
        let cli = Cli::try_parse_from([
            "shgetopt",
            "parse",
            "--usage",
            "prog [-a] [-E level] file",
            "--name",
            "/usr/bin/prog",
            "--args",
            "1",
            "--",
            "-a",
            "-E",
            "3",
            "file.txt",
        ])
        .unwrap();

        match cli.command {
            Commands::Parse {
                usage,
                name,
                arg_count,
                args: script_args,
                no_standard,
                ..
            } => {
                assert_eq!(usage.as_deref(), Some("prog [-a] [-E level] file"));
                assert_eq!(name.as_deref(), Some("/usr/bin/prog"));
                assert_eq!(arg_count, Some(ArgCount::exactly(1)));
                assert!(!no_standard);
                assert_eq!(script_args, args(&["-a", "-E", "3", "file.txt"]));
            }
            _ => panic!("Expected Parse command"),
        }
    }

    #[test]
    fn test_parse_subcommand_rejects_bad_arg_count() {
        let result = Cli::try_parse_from(["shgetopt", "parse", "--args", "x", "--"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_spec_subcommand() {
        let cli =
            Cli::try_parse_from(["shgetopt", "spec", "--usage", "prog [-ab] [-c n]"]).unwrap();
        match cli.command {
            Commands::Spec { usage } => assert_eq!(derive_spec(&usage).to_string(), "abc:"),
            _ => panic!("Expected Spec command"),
        }
    }

    #[test]
    fn test_log_subcommand_requires_message() {
        let result = Cli::try_parse_from(["shgetopt", "log", "--level", "verbose"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_truncate_requires_file() {
        let result = Cli::try_parse_from(["shgetopt", "log", "--truncate", "hello"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_check_int_accepts_negative_value() {
        let cli =
            Cli::try_parse_from(["shgetopt", "check-int", "--label", "offset", "-5"]).unwrap();
        match cli.command {
            Commands::CheckInt { label, value, .. } => {
                assert_eq!(label, "offset");
                assert_eq!(value, "-5");
            }
            _ => panic!("Expected CheckInt command"),
        }
    }

    #[test]
    fn test_cli_overrides_config() {
        let overrides = Overrides {
            name: Some("cli-name".to_string()),
            script_version: Some("2.0".to_string()),
            no_standard: true,
            ..Default::default()
        };
        let cfg = build_config(
            Some(r#"{"name":"config-name","version":"1.0","usage":"prog [-a]"}"#),
            overrides,
        )
        .unwrap();
        assert_eq!(cfg.program_name(), "cli-name");
        assert_eq!(cfg.version.as_deref(), Some("2.0"));
        assert!(!cfg.standard_options);
        assert_eq!(cfg.usage.as_deref(), Some("prog [-a]"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let overrides = Overrides {
            spec: Some(":a".to_string()),
            ..Default::default()
        };
        assert!(build_config(None, overrides).is_err());
        assert!(build_config(Some("{"), Overrides::default()).is_err());
    }

    #[test]
    fn test_run_parse_success() {
        let overrides = Overrides {
            usage: Some("prog [-a] [-E level] file".to_string()),
            ..Default::default()
        };
        let cfg = build_config(None, overrides).unwrap();
        let path = run_parse(&cfg, &args(&["-a", "-E", "3", "myfile.txt"])).unwrap();
        let contents = read_and_remove(path);

        assert!(contents.contains("opt_a=1\n"));
        assert!(contents.contains("opt_E_arg='3'\n"));
        assert!(contents.contains("opt_V=''\n"));
        assert!(contents.contains("export SHGETOPT_USAGE='prog [-a] [-E level] file'\n"));
        assert!(contents.contains("set -- 'myfile.txt'\n"));
    }

    #[test]
    fn test_run_parse_usage_error() {
        let overrides = Overrides {
            usage: Some("prog [-a] file".to_string()),
            name: Some("prog".to_string()),
            ..Default::default()
        };
        let cfg = build_config(None, overrides).unwrap();
        let contents = read_and_remove(run_parse(&cfg, &args(&["-z"])).unwrap());

        assert!(contents.contains("'prog: illegal option -- z'"));
        assert!(contents.contains("'Usage: prog [-a] file'"));
        assert!(contents.ends_with("exit 2\n"));
    }

    #[test]
    fn test_run_parse_version() {
        let overrides = Overrides {
            usage: Some("prog [-a] file".to_string()),
            name: Some("prog".to_string()),
            script_version: Some("1.2.3".to_string()),
            ..Default::default()
        };
        let cfg = build_config(None, overrides).unwrap();
        let contents = read_and_remove(run_parse(&cfg, &args(&["-a", "-v", "file"])).unwrap());

        assert!(contents.contains("prog 1.2.3\n"));
        assert!(contents.ends_with("exit 0\n"));
    }

    #[test]
    fn test_run_parse_log_failure_exits_1() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing").join("run.log");
        let overrides = Overrides {
            usage: Some("prog [-a]".to_string()),
            ..Default::default()
        };
        let cfg = build_config(None, overrides).unwrap();
        let argv = vec!["-F".to_string(), missing.to_string_lossy().into_owned()];
        let contents = read_and_remove(run_parse(&cfg, &argv).unwrap());

        assert!(contents.contains("cannot open log file"));
        assert!(!contents.contains("Usage:"));
        assert!(contents.ends_with("exit 1\n"));
    }

    #[test]
    fn test_run_parse_truncates_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("run.log");
        fs::write(&log, "stale\n").unwrap();

        let cfg = build_config(None, Overrides::default()).unwrap();
        let argv = vec!["-F".to_string(), log.to_string_lossy().into_owned()];
        let contents = read_and_remove(run_parse(&cfg, &argv).unwrap());

        assert_eq!(fs::read_to_string(&log).unwrap(), "");
        assert!(contents.contains("export SHGETOPT_LOGFILE="));
    }

    #[test]
    fn test_open_destination() {
        assert_eq!(open_destination(None, false).unwrap(), LogDestination::Stderr);

        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("run.log");
        fs::write(&log, "kept\n").unwrap();
        open_destination(Some(&log), false).unwrap();
        assert_eq!(fs::read_to_string(&log).unwrap(), "kept\n");
        open_destination(Some(&log), true).unwrap();
        assert_eq!(fs::read_to_string(&log).unwrap(), "");
    }

    #[test]
    fn test_effective_name() {
        assert_eq!(effective_name(Some("/path/to/job.sh")), "job.sh");
        assert_eq!(effective_name(None), DEFAULT_PROGRAM_NAME);
    }
}
