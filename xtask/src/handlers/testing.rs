use crate::services::runner::{CommandRunner, CommandSpec, run_checked};
use crate::services::utils::normalize_project_name;
use anyhow::{Context, Result};

/// Builds the `cargo` invocation for a workspace or single-crate test run.
#[must_use]
pub fn test_command(project: Option<&str>, nextest: bool) -> CommandSpec {
    let mut spec = if nextest {
        CommandSpec::new("cargo").args(["nextest", "run"])
    } else {
        CommandSpec::new("cargo").arg("test")
    };

    spec = match project.filter(|p| *p != "all") {
        None => spec.arg("--workspace"),
        Some(project) => spec.arg("-p").arg(normalize_project_name(project)),
    };
    spec = spec.arg("--all-features");

    if nextest {
        spec.args([
            "--failure-output",
            "immediate-final",
            "--success-output",
            "never",
            "--status-level",
            "skip",
        ])
    } else {
        spec.args(["--", "-q"])
    }
}

/// Runs tests in the workspace or a specific crate, preferring `cargo-nextest` when installed.
///
/// # Errors
/// Returns an error if the test run fails or cargo cannot be started.
pub fn run_tests(project: Option<&str>, runner: &mut impl CommandRunner) -> Result<()> {
    let nextest = runner
        .output(&CommandSpec::new("cargo-nextest").arg("--version"))
        .is_ok_and(|out| out.success);

    let spec = test_command(project, nextest);
    println!("🧪 Running tests via '{spec}'...");
    run_checked(runner, &spec).context("Tests failed!")
}

/// Runs doc tests in the workspace or a specific crate.
///
/// # Errors
/// Returns an error if the doctest run fails.
pub fn run_doctests(project: Option<&str>, runner: &mut impl CommandRunner) -> Result<()> {
    let mut spec = CommandSpec::new("cargo").args(["test", "--doc"]);
    spec = match project.filter(|p| *p != "all") {
        None => spec.arg("--workspace"),
        Some(project) => spec.arg("-p").arg(normalize_project_name(project)),
    };

    println!("📚 Running doctests via '{spec}'...");
    run_checked(runner, &spec).context("Doc tests failed!")
}
