//! Settings for the container-backed integration run.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default location of the settings file, relative to the workspace root.
pub const ITEST_CONFIG_PATH: &str = "ops/itest.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ItestConfig {
    pub compose: ComposeConfig,
    pub database: DatabaseConfig,
    pub migration: MigrationConfig,
    pub tests: TestsConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Compose file, relative to the workspace root.
    pub file: PathBuf,
    /// Compose project name (`-p`); the directory name is used when unset.
    pub project: Option<String>,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self { file: PathBuf::from("ops/docker/sim-itest/docker-compose.yml"), project: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub service: String,
    pub user: String,
    pub name: String,
    /// Readiness poll keeps going while the listing output contains this text.
    /// Empty means only the exit status counts.
    pub marker: String,
    pub poll_interval_ms: u64,
    /// `0` polls until the database answers.
    pub max_attempts: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            service: "db".to_owned(),
            user: "postgres".to_owned(),
            name: "sim".to_owned(),
            marker: "the database system is starting up".to_owned(),
            poll_interval_ms: 500,
            max_attempts: 240,
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Whether `output` still carries the startup marker.
    #[must_use]
    pub fn is_starting(&self, output: &str) -> bool {
        !self.marker.is_empty() && output.contains(&self.marker)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// SQL file piped to `psql`, relative to the workspace root.
    pub script: PathBuf,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self { script: PathBuf::from("ops/db/schema.sql") }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TestsConfig {
    pub service: String,
    pub entrypoint: String,
}

impl Default for TestsConfig {
    fn default() -> Self {
        Self { service: "backend".to_owned(), entrypoint: "/app/ops/itest/run_tests.sh".to_owned() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory searched for caches, relative to the workspace root.
    pub root: PathBuf,
    pub dir_names: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { root: PathBuf::from("."), dir_names: vec!["__pycache__".to_owned()] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_local_postgres() {
        let cfg = ItestConfig::default();
        assert_eq!(cfg.database.service, "db");
        assert_eq!(cfg.database.user, "postgres");
        assert_eq!(cfg.database.max_attempts, 240);
        assert_eq!(cfg.database.poll_interval(), Duration::from_millis(500));
        assert_eq!(cfg.cache.dir_names, ["__pycache__"]);
        assert!(cfg.compose.project.is_none());
    }

    #[test]
    fn empty_marker_never_matches() {
        let mut db = DatabaseConfig::default();
        assert!(db.is_starting("psql: FATAL: the database system is starting up"));
        assert!(!db.is_starting("sim | postgres | UTF8"));

        db.marker = String::new();
        assert!(!db.is_starting("anything at all"));
        assert!(!db.is_starting(""));
    }

    #[test]
    fn partial_settings_keep_defaults() {
        let cfg: ItestConfig = toml::from_str(
            r#"
            [database]
            user = "sim"
            max_attempts = 0

            [tests]
            entrypoint = "/srv/tests.sh"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.database.user, "sim");
        assert_eq!(cfg.database.max_attempts, 0);
        assert_eq!(cfg.database.service, "db");
        assert_eq!(cfg.tests.entrypoint, "/srv/tests.sh");
        assert_eq!(cfg.tests.service, "backend");
        assert_eq!(cfg.migration, MigrationConfig::default());
    }
}
