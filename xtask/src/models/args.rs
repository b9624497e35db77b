//! # CLI Argument Definitions

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "cargo xtask")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Developer toolkit for the sim workspace")]
pub struct Cli {
    /// Repeat for more detail (-v debug, -vv trace); goes before the subcommand
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: AppCommands,
}

impl Cli {
    /// Parses the process arguments; see [`Cli::parse_verbatim_from`].
    #[must_use]
    pub fn parse_verbatim() -> Self {
        Self::parse_verbatim_from(std::env::args_os())
    }

    /// Parses `argv` like [`Parser::parse_from`], except that the `itest` tail is taken
    /// from `argv` as written. Clap drops a leading `--` as an escape; the test entry
    /// point gets it back.
    #[must_use]
    pub fn parse_verbatim_from<I, T>(argv: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
        let mut cli = Self::parse_from(&argv);
        if let AppCommands::Itest { args, .. } = &mut cli.command
            && let Some(tail) = itest_tail(&argv)
        {
            *args = tail;
        }
        cli
    }
}

/// Everything after `itest` and its optional leading `--config FILE`.
fn itest_tail(argv: &[OsString]) -> Option<Vec<String>> {
    let start = argv.iter().skip(1).position(|arg| arg == "itest")? + 2;
    let mut rest = argv.get(start..).unwrap_or_default();
    match rest.first().and_then(|arg| arg.to_str()) {
        Some("--config") => rest = rest.get(2..).unwrap_or_default(),
        Some(arg) if arg.starts_with("--config=") => rest = &rest[1..],
        _ => {},
    }
    Some(rest.iter().map(|arg| arg.to_string_lossy().into_owned()).collect())
}

#[derive(Debug, Subcommand)]
pub enum AppCommands {
    /// Rebuild the container stack, migrate the database and run the integration suite
    Itest {
        /// Settings file (defaults to ops/itest.toml when it exists)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Arguments forwarded verbatim to the in-container test entry point
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Manage the local container stack
    Dev {
        /// Settings file (defaults to ops/itest.toml when it exists)
        #[arg(long, global = true)]
        config: Option<PathBuf>,

        #[command(subcommand)]
        action: DevAction,
    },
    /// Run tests (workspace by default)
    Test {
        /// Run tests for a specific crate (auto-prefixes with 'sim-' if missing)
        project: Option<String>,
    },
    /// Run doc tests (workspace by default)
    Doctest {
        /// Run doc tests for a specific crate (auto-prefixes with 'sim-' if missing)
        project: Option<String>,
    },
    /// Run a binary crate
    Run {
        /// Crate to run (auto-prefixes with 'sim-' if missing)
        #[arg(default_value = "explorer")]
        project: String,

        /// Arguments passed through to the binary
        #[arg(last = true)]
        args: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum DevAction {
    /// Start every service in the background
    Up {},
    /// Stop all services
    Down {
        /// Also remove volumes (wipes the database)
        #[arg(short, long)]
        volumes: bool,
    },
    /// Follow logs from services
    Logs {
        /// Specific service name (e.g., 'db')
        service: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn itest_keeps_hyphenated_args_in_order() {
        let cli = Cli::parse_from(["xtask", "itest", "-k", "smoke", "--maxfail=1", "tests/api"]);
        let AppCommands::Itest { config, args } = cli.command else {
            panic!("expected itest");
        };
        assert!(config.is_none());
        assert_eq!(args, ["-k", "smoke", "--maxfail=1", "tests/api"]);
    }

    #[test]
    fn itest_keeps_a_leading_separator() {
        let cli = Cli::parse_verbatim_from(["xtask", "itest", "--", "-k", "smoke"]);
        let AppCommands::Itest { args, .. } = cli.command else {
            panic!("expected itest");
        };
        assert_eq!(args, ["--", "-k", "smoke"]);
    }

    #[test]
    fn itest_separator_survives_anywhere() {
        for (argv, expected) in [
            (vec!["xtask", "itest", "-k", "--", "x"], vec!["-k", "--", "x"]),
            (vec!["xtask", "-v", "itest", "--config", "ci.toml", "--", "a"], vec!["--", "a"]),
            (vec!["xtask", "itest", "--config=ci.toml", "--", "--config", "b"], vec!["--", "--config", "b"]),
            (vec!["xtask", "itest"], vec![]),
        ] {
            let cli = Cli::parse_verbatim_from(argv.clone());
            let AppCommands::Itest { args, .. } = cli.command else {
                panic!("expected itest for {argv:?}");
            };
            assert_eq!(args, expected, "argv {argv:?}");
        }
    }

    #[test]
    fn verbatim_parse_leaves_other_commands_alone() {
        let cli = Cli::parse_verbatim_from(["xtask", "run", "--", "itest"]);
        let AppCommands::Run { project, args } = cli.command else {
            panic!("expected run");
        };
        assert_eq!(project, "explorer");
        assert_eq!(args, ["itest"]);
    }

    #[test]
    fn itest_accepts_config_before_args() {
        let cli = Cli::parse_from(["xtask", "itest", "--config", "ci.toml", "-x"]);
        let AppCommands::Itest { config, args } = cli.command else {
            panic!("expected itest");
        };
        assert_eq!(config, Some(PathBuf::from("ci.toml")));
        assert_eq!(args, ["-x"]);
    }

    #[test]
    fn verbose_flags_after_itest_are_forwarded() {
        let cli = Cli::parse_from(["xtask", "-v", "itest", "-v", "--tb=short"]);
        assert_eq!(cli.verbose, 1);
        let AppCommands::Itest { args, .. } = cli.command else {
            panic!("expected itest");
        };
        assert_eq!(args, ["-v", "--tb=short"]);
    }

    #[test]
    fn run_defaults_to_explorer() {
        let cli = Cli::parse_from(["xtask", "run", "--", "inspect"]);
        let AppCommands::Run { project, args } = cli.command else {
            panic!("expected run");
        };
        assert_eq!(project, "explorer");
        assert_eq!(args, ["inspect"]);
    }
}
