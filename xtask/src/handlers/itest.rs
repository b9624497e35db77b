//! # Integration test orchestration
//!
//! Tears the container stack down, rebuilds it, waits for Postgres, applies the schema and
//! runs the suite inside the backend container. Every step must succeed before the next one
//! starts; the readiness poll is the only retry.

use crate::models::itest::{ITEST_CONFIG_PATH, ItestConfig};
use crate::services::docker::DockerCompose;
use crate::services::runner::{CommandRunner, CommandSpec, require_file, run_checked};
use crate::services::utils::{Platform, purge_dirs};
use anyhow::{Context, Result, bail};
use sim_kernel::config::load_config;
use sim_kernel::text::compress_multiline;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
pub enum Step {
    #[strum(to_string = "Stopping previous containers")]
    StopContainers,
    #[strum(to_string = "Purging bytecode caches")]
    PurgeCaches,
    #[strum(to_string = "Building containers")]
    Build,
    #[strum(to_string = "Starting database")]
    StartDatabase,
    #[strum(to_string = "Waiting for database")]
    AwaitDatabase,
    #[strum(to_string = "Applying migration")]
    Migrate,
    #[strum(to_string = "Starting remaining services")]
    StartServices,
    #[strum(to_string = "Running tests")]
    RunTests,
}

/// Loads `explicit`, or `ops/itest.toml` when it exists, or the built-in defaults.
///
/// # Errors
/// Fails when the chosen file cannot be parsed.
pub fn load_itest_config(root: &Path, explicit: Option<&Path>) -> Result<ItestConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Some(root.join(ITEST_CONFIG_PATH)).filter(|p| p.is_file()),
    };
    debug!(path = ?path, "Loading itest settings");
    load_config(path.as_deref()).context("Failed to load itest settings")
}

/// The itest sequence bound to a runner.
#[derive(Debug)]
pub struct Pipeline<'a, R: CommandRunner> {
    root: PathBuf,
    config: &'a ItestConfig,
    platform: Platform,
    docker: DockerCompose,
    runner: &'a mut R,
}

impl<'a, R: CommandRunner> Pipeline<'a, R> {
    pub fn new(root: &Path, config: &'a ItestConfig, platform: Platform, runner: &'a mut R) -> Self {
        Self {
            root: root.to_path_buf(),
            docker: DockerCompose::from_config(root, &config.compose),
            config,
            platform,
            runner,
        }
    }

    fn migration_script(&self) -> PathBuf {
        self.root.join(&self.config.migration.script)
    }

    /// Checks the files the run depends on before anything is executed.
    ///
    /// # Errors
    /// Fails when the compose file or the migration script is missing.
    pub fn preflight(&self) -> Result<()> {
        self.docker.ensure_file()?;
        require_file(&self.migration_script(), "Migration script")
    }

    /// Runs every [`Step`] in order, forwarding `args` to the test entry point.
    ///
    /// # Errors
    /// Fails on the first step that fails; later steps are not attempted.
    pub fn run(&mut self, args: &[String]) -> Result<()> {
        self.preflight()?;
        for step in Step::iter() {
            println!("▶ {step}...");
            self.execute(step, args).with_context(|| format!("{step} failed"))?;
        }
        println!("✅ Integration tests passed.");
        Ok(())
    }

    fn execute(&mut self, step: Step, args: &[String]) -> Result<()> {
        let config = self.config;
        let db = &config.database;
        match step {
            Step::StopContainers => self.checked(&self.docker.down(false)),
            Step::PurgeCaches => self.purge_caches(),
            Step::Build => self.checked(&self.docker.build()),
            Step::StartDatabase => self.checked(&self.docker.up(&[db.service.as_str()])),
            Step::AwaitDatabase => self.await_database(),
            Step::Migrate => {
                let spec = self
                    .docker
                    .exec(&db.service, ["psql", "-v", "ON_ERROR_STOP=1", "-U", db.user.as_str(), "-d", db.name.as_str()])
                    .stdin_file(self.migration_script());
                self.checked(&spec)
            },
            Step::StartServices => self.checked(&self.docker.up(&[])),
            Step::RunTests => {
                let tests = &config.tests;
                let spec = self
                    .docker
                    .exec(&tests.service, [tests.entrypoint.as_str()])
                    .args(args.iter().map(String::as_str));
                self.checked(&spec)
            },
        }
    }

    fn checked(&mut self, spec: &CommandSpec) -> Result<()> {
        run_checked(&mut *self.runner, spec)
    }

    fn purge_caches(&self) -> Result<()> {
        if self.platform != Platform::Linux {
            info!("Not on Linux, skipping cache purge");
            return Ok(());
        }
        let cache = &self.config.cache;
        let removed = purge_dirs(&self.root.join(&cache.root), &cache.dir_names)?;
        info!(removed, names = ?cache.dir_names, "Purged cache directories");
        Ok(())
    }

    /// Polls `psql -lqt` until it succeeds without printing the startup marker.
    fn await_database(&mut self) -> Result<()> {
        let config = self.config;
        let db = &config.database;
        let spec = self.docker.exec(&db.service, ["psql", "-U", db.user.as_str(), "-lqt"]);

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let output = self.runner.output(&spec)?;
            let text = output.combined();
            if output.success && !db.is_starting(&text) {
                info!(attempt, "Database is ready");
                return Ok(());
            }

            let text = compress_multiline(&text);
            debug!(attempt, output = %text, "Database not ready");
            if db.max_attempts != 0 && attempt >= db.max_attempts {
                bail!("Database '{}' not ready after {attempt} attempts: {text}", db.service);
            }
            self.runner.sleep(db.poll_interval());
        }
    }
}
