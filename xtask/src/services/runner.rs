//! External process execution behind a trait, so pipelines can be replayed in tests.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::debug;

/// A process to launch: program, arguments, working directory and optional stdin file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    pub stdin: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(), args: Vec::new(), cwd: None, stdin: None }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Feeds the file to the process's standard input.
    #[must_use]
    pub fn stdin_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin = Some(path.into());
        self
    }

    /// Arguments as UTF-8 (lossy), mostly for logs and assertions.
    #[must_use]
    pub fn argv(&self) -> Vec<String> {
        self.args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    fn to_command(&self) -> Result<Command> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        if let Some(path) = &self.stdin {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {} for stdin", path.display()))?;
            cmd.stdin(Stdio::from(file));
        }
        Ok(cmd)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in self.argv() {
            write!(f, " {arg}")?;
        }
        if let Some(path) = &self.stdin {
            write!(f, " < {}", path.display())?;
        }
        Ok(())
    }
}

/// Captured result of a command whose output is inspected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Stdout followed by stderr.
    #[must_use]
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Exit outcome of a command run with inherited stdio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit {
    pub success: bool,
    pub code: Option<i32>,
}

impl fmt::Display for Exit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {code}"),
            None => f.write_str("terminated by signal"),
        }
    }
}

pub trait CommandRunner {
    /// Runs to completion with inherited stdout/stderr.
    ///
    /// # Errors
    /// Fails only when the process cannot be spawned; a non-zero exit is reported in [`Exit`].
    fn status(&mut self, spec: &CommandSpec) -> Result<Exit>;

    /// Runs to completion and captures stdout/stderr.
    ///
    /// # Errors
    /// Fails only when the process cannot be spawned.
    fn output(&mut self, spec: &CommandSpec) -> Result<CommandOutput>;

    fn sleep(&mut self, duration: Duration);
}

/// Runs commands on the host.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn status(&mut self, spec: &CommandSpec) -> Result<Exit> {
        debug!(command = %spec, "Running");
        let status = spec
            .to_command()?
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to execute '{}'. Is it installed and in your PATH?", spec.program))?;
        Ok(Exit { success: status.success(), code: status.code() })
    }

    fn output(&mut self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!(command = %spec, "Capturing");
        let output = spec
            .to_command()?
            .output()
            .with_context(|| format!("Failed to execute '{}'. Is it installed and in your PATH?", spec.program))?;
        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Runs `spec` and turns a non-zero exit into an error naming the command.
///
/// # Errors
/// Fails when the command cannot be spawned or does not succeed.
pub fn run_checked(runner: &mut impl CommandRunner, spec: &CommandSpec) -> Result<()> {
    let exit = runner.status(spec)?;
    if !exit.success {
        anyhow::bail!("'{spec}' failed with {exit}");
    }
    Ok(())
}

/// Fails early with a readable message when a required file is missing.
///
/// # Errors
/// Fails when `path` is not an existing file.
pub fn require_file(path: &Path, what: &str) -> Result<()> {
    if !path.is_file() {
        anyhow::bail!("{what} not found at: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
pub mod fake {
    //! A scripted [`CommandRunner`] that records every call.

    use super::{CommandOutput, CommandRunner, CommandSpec, Exit};
    use std::collections::VecDeque;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Status(CommandSpec),
        Output(CommandSpec),
        Sleep(Duration),
    }

    type Rule = (Box<dyn Fn(&CommandSpec) -> bool>, VecDeque<CommandOutput>);

    /// Succeeds by default; [`respond`](Self::respond) queues outcomes for matching commands.
    #[derive(Default)]
    pub struct FakeRunner {
        pub calls: Vec<Call>,
        rules: Vec<Rule>,
    }

    impl std::fmt::Debug for FakeRunner {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("FakeRunner").field("calls", &self.calls).finish_non_exhaustive()
        }
    }

    impl FakeRunner {
        /// Queues outcomes for commands whose argv contains `needle`; the last one repeats.
        pub fn respond(mut self, needle: &str, outcomes: Vec<CommandOutput>) -> Self {
            let needle = needle.to_owned();
            self.rules.push((
                Box::new(move |spec: &CommandSpec| spec.argv().iter().any(|a| a == &needle)),
                outcomes.into(),
            ));
            self
        }

        pub fn fail(self, needle: &str) -> Self {
            self.respond(needle, vec![failure("")])
        }

        fn next(&mut self, spec: &CommandSpec) -> CommandOutput {
            for (pred, outcomes) in &mut self.rules {
                if pred(spec) {
                    return if outcomes.len() > 1 {
                        outcomes.pop_front().unwrap_or_default()
                    } else {
                        outcomes.front().cloned().unwrap_or_default()
                    };
                }
            }
            success("")
        }

        /// Every recorded command, rendered as `program args...`.
        pub fn commands(&self) -> Vec<String> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    Call::Status(spec) | Call::Output(spec) => Some(spec.to_string()),
                    Call::Sleep(_) => None,
                })
                .collect()
        }

        pub fn sleeps(&self) -> usize {
            self.calls.iter().filter(|c| matches!(c, Call::Sleep(_))).count()
        }
    }

    impl CommandRunner for FakeRunner {
        fn status(&mut self, spec: &CommandSpec) -> anyhow::Result<Exit> {
            self.calls.push(Call::Status(spec.clone()));
            let out = self.next(spec);
            Ok(Exit { success: out.success, code: out.code })
        }

        fn output(&mut self, spec: &CommandSpec) -> anyhow::Result<CommandOutput> {
            self.calls.push(Call::Output(spec.clone()));
            Ok(self.next(spec))
        }

        fn sleep(&mut self, duration: Duration) {
            self.calls.push(Call::Sleep(duration));
        }
    }

    pub fn success(stdout: &str) -> CommandOutput {
        CommandOutput { success: true, code: Some(0), stdout: stdout.to_owned(), stderr: String::new() }
    }

    pub fn failure(stderr: &str) -> CommandOutput {
        CommandOutput { success: false, code: Some(1), stdout: String::new(), stderr: stderr.to_owned() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_stdin_redirect() {
        let spec = CommandSpec::new("docker")
            .args(["compose", "exec", "-T", "db"])
            .stdin_file("ops/db/schema.sql");
        assert_eq!(spec.to_string(), "docker compose exec -T db < ops/db/schema.sql");
    }

    #[test]
    fn run_checked_reports_failing_command() {
        let mut runner = fake::FakeRunner::default().fail("build");
        let err = run_checked(&mut runner, &CommandSpec::new("docker").arg("build")).unwrap_err();
        assert_eq!(err.to_string(), "'docker build' failed with exit status 1");
    }

    #[test]
    fn missing_stdin_file_fails_before_spawn() {
        let spec = CommandSpec::new("cat").stdin_file("/definitely/not/here.sql");
        let err = SystemRunner.output(&spec).unwrap_err();
        assert!(err.to_string().contains("for stdin"), "got {err}");
    }

    #[test]
    fn require_file_names_the_missing_file() {
        let err = require_file(Path::new("nope.yml"), "Docker compose file").unwrap_err();
        assert_eq!(err.to_string(), "Docker compose file not found at: nope.yml");
    }
}
