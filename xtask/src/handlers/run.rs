use crate::services::runner::{CommandRunner, CommandSpec, run_checked};
use crate::services::utils::normalize_project_name;
use anyhow::Context;

/// Runs a workspace binary with `cargo run`, passing `args` through.
///
/// # Errors
/// Returns an error if the project fails to build or exits with a non-zero status.
pub fn run_project(project: &str, args: &[String], runner: &mut impl CommandRunner) -> anyhow::Result<()> {
    println!("🚀 Starting project...");

    let project = normalize_project_name(project);
    let spec = CommandSpec::new("cargo").args(["run", "-p", project.as_str(), "--"]).args(args);
    run_checked(runner, &spec).with_context(|| format!("{project} exited unsuccessfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::runner::fake::FakeRunner;

    #[test]
    fn explorer_args_follow_separator() {
        let mut runner = FakeRunner::default();
        let args = ["path".to_owned(), "0".to_owned(), "-1".to_owned()];
        run_project("explorer", &args, &mut runner).unwrap();
        assert_eq!(runner.commands(), ["cargo run -p sim-explorer -- path 0 -1"]);
    }
}
