#![warn(rust_2018_idioms, unused_lifetimes)]
#![allow(
    clippy::print_stderr,
    clippy::print_stdout,
    clippy::disallowed_methods,
    clippy::disallowed_types
)]

pub mod handlers;
pub mod models;
pub mod services;

use crate::handlers::itest::{Pipeline, load_itest_config};
use crate::handlers::{dev, run, testing};
use crate::models::args::{AppCommands, Cli};
use crate::services::runner::SystemRunner;
use crate::services::utils::{Platform, get_project_root};

use anyhow::Result;
use sim_logger::{Logger, verbosity};

fn main() -> Result<()> {
    let cli = Cli::parse_verbatim();
    let _log = Logger::builder().name("xtask").level(verbosity(cli.verbose)).init()?;

    let root = get_project_root()?;
    let mut runner = SystemRunner;

    match cli.command {
        AppCommands::Itest { config, args } => {
            let config = load_itest_config(&root, config.as_deref())?;
            Pipeline::new(&root, &config, Platform::current(), &mut runner).run(&args)?;
        },
        AppCommands::Dev { config, action } => {
            let config = load_itest_config(&root, config.as_deref())?;
            dev::handle_dev_command(&root, &config, action, &mut runner)?;
        },
        AppCommands::Test { project } => testing::run_tests(project.as_deref(), &mut runner)?,
        AppCommands::Doctest { project } => {
            testing::run_doctests(project.as_deref(), &mut runner)?;
        },
        AppCommands::Run { project, args } => run::run_project(&project, &args, &mut runner)?,
    }

    Ok(())
}
