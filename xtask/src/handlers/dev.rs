use crate::models::args::DevAction;
use crate::models::itest::ItestConfig;
use crate::services::docker::DockerCompose;
use crate::services::runner::CommandRunner;
use anyhow::Result;
use std::path::Path;

/// Starts, stops or tails the container stack described by the itest settings.
///
/// # Errors
/// Returns an error if the compose file is missing or the command fails.
pub fn handle_dev_command(
    root: &Path,
    config: &ItestConfig,
    action: DevAction,
    runner: &mut impl CommandRunner,
) -> Result<()> {
    let docker = DockerCompose::from_config(root, &config.compose);

    match action {
        DevAction::Up {} => {
            println!("🚀 Bringing up infrastructure...");
            docker.run(runner, &docker.up(&[]))?;
            println!("\n✨ Infrastructure is ready.");
            println!("🔗 Postgres: service '{}', user '{}'", config.database.service, config.database.user);
        },
        DevAction::Down { volumes } => {
            println!("🛑 Shutting down infrastructure...");
            docker.run(runner, &docker.down(volumes))?;
        },
        DevAction::Logs { service } => {
            docker.run(runner, &docker.logs(service.as_deref()))?;
        },
    }

    Ok(())
}
