use anyhow::Context;
use clap::Parser;
use sim_domain::config::SimConfig;
use sim_explorer::{Cli, Explorer};
use sim_kernel::config::load_config;
use sim_logger::{Logger, verbosity};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log = Logger::builder().name("sim").level(verbosity(cli.verbose)).init()?;

    let cfg: SimConfig = load_config(cli.config.as_deref()).context("Critical: Configuration is malformed")?;

    let mut builder = Explorer::builder().config(cfg);
    if let Some(map) = cli.map {
        builder = builder.map(map);
    }

    builder.build()?.execute(&cli.command, &mut std::io::stdout().lock())
}
