use crate::models::itest::ComposeConfig;
use crate::services::runner::{CommandRunner, CommandSpec, require_file, run_checked};
use anyhow::Result;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Builds `docker compose` invocations against one compose file.
#[derive(Debug, Clone)]
pub struct DockerCompose {
    file_path: PathBuf,
    project: Option<String>,
}

impl DockerCompose {
    /// Resolves the configured compose file against the workspace root.
    #[must_use]
    pub fn from_config(root: &Path, config: &ComposeConfig) -> Self {
        Self { file_path: root.join(&config.file), project: config.project.clone() }
    }

    pub fn with_file_path(path: impl Into<PathBuf>) -> Self {
        Self { file_path: path.into(), project: None }
    }

    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// # Errors
    /// Fails when the compose file does not exist.
    pub fn ensure_file(&self) -> Result<()> {
        require_file(&self.file_path, "Docker compose file")
    }

    /// `docker compose -f <file> [-p <project>] <args...>`
    pub fn command<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut spec = CommandSpec::new("docker").arg("compose").arg("-f").arg(&self.file_path);
        if let Some(project) = &self.project {
            spec = spec.arg("-p").arg(project);
        }
        spec.args(args)
    }

    #[must_use]
    pub fn down(&self, volumes: bool) -> CommandSpec {
        let mut args = vec!["down", "--remove-orphans"];
        if volumes {
            args.push("-v");
        }
        self.command(args)
    }

    #[must_use]
    pub fn build(&self) -> CommandSpec {
        self.command(["build"])
    }

    /// Starts `services` detached, or every service when empty.
    #[must_use]
    pub fn up(&self, services: &[&str]) -> CommandSpec {
        self.command(["up", "-d"]).args(services.iter().copied())
    }

    /// `exec -T <service> <cmd...>`; no TTY so stdin can be piped.
    pub fn exec<I, S>(&self, service: &str, cmd: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.command(["exec", "-T", service]).args(cmd)
    }

    #[must_use]
    pub fn logs(&self, service: Option<&str>) -> CommandSpec {
        self.command(["logs", "-f"]).args(service)
    }

    /// Checks the compose file, then runs `spec` and fails on a non-zero exit.
    ///
    /// # Errors
    /// Fails when the compose file is missing or the command does not succeed.
    pub fn run(&self, runner: &mut impl CommandRunner, spec: &CommandSpec) -> Result<()> {
        self.ensure_file()?;
        run_checked(runner, spec)
    }
}
