//! # Sim Explorer
//!
//! A headless window onto a Tiled hex map: tile census, point lookup, path finding,
//! reachability and a short seeded simulation run. Output goes to any [`Write`] so the
//! commands can be exercised without a terminal.
//!
//! ```no_run
//! use sim_explorer::{Command, Explorer};
//! use sim_domain::config::SimConfig;
//!
//! let explorer = Explorer::builder().config(SimConfig::default()).build()?;
//! explorer.execute(&Command::Inspect, &mut std::io::stdout().lock())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use sim_domain::config::SimConfig;
use sim_domain::hex::{Hex, Point};
use sim_world::WorldMap;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "sim", version, about = "Explore a Tiled hex map from the command line")]
pub struct Cli {
    /// Settings file (TOML, JSON or YAML); `SIM__*` variables override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Map to load instead of the configured one
    #[arg(short, long)]
    pub map: Option<PathBuf>,

    /// Repeat for more detail (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Count tiles per class
    Inspect,
    /// Find the tile under a world-space point
    #[command(allow_negative_numbers = true)]
    Locate { x: f64, y: f64 },
    /// Cheapest path between two axial coordinates
    #[command(allow_negative_numbers = true)]
    Path { q1: i32, r1: i32, q2: i32, r2: i32 },
    /// Tiles reachable from an axial coordinate
    #[command(allow_negative_numbers = true)]
    Reach { q: i32, r: i32 },
    /// Populate every home and advance the clock
    Simulate {
        /// Steps to run (4 steps make an hour)
        #[arg(long, default_value_t = 96)]
        steps: u32,
        /// Agents spawned per home
        #[arg(long, default_value_t = 3)]
        agents: u32,
        #[arg(long, default_value_t = 7)]
        seed: u64,
    },
}

/// Fluent setup for an [`Explorer`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ExplorerBuilder {
    cfg: SimConfig,
}

impl ExplorerBuilder {
    pub fn config(mut self, cfg: SimConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn map(mut self, path: impl Into<PathBuf>) -> Self {
        self.cfg.map.path = path.into();
        self
    }

    /// Loads the configured map.
    ///
    /// # Errors
    /// Fails when the map cannot be read or decoded.
    pub fn build(self) -> Result<Explorer> {
        let path = &self.cfg.map.path;
        let world = WorldMap::load(path, self.cfg.layout.layout())
            .with_context(|| format!("Failed to load map {}", path.display()))?;
        info!(map = %path.display(), tiles = world.len(), "Map loaded");
        Ok(Explorer { world })
    }
}

#[derive(Debug)]
pub struct Explorer {
    world: WorldMap,
}

impl Explorer {
    pub fn builder() -> ExplorerBuilder {
        ExplorerBuilder::default()
    }

    #[must_use]
    pub const fn world(&self) -> &WorldMap {
        &self.world
    }

    /// Runs one command, writing its report to `out`. `simulate` works on a copy of the world.
    ///
    /// # Errors
    /// Fails on unknown cells, failed simulation steps or write errors.
    pub fn execute(&self, command: &Command, out: &mut impl Write) -> Result<()> {
        match *command {
            Command::Inspect => self.inspect(out),
            Command::Locate { x, y } => self.locate(Point::new(x, y), out),
            Command::Path { q1, r1, q2, r2 } => self.path(Hex::axial(q1, r1), Hex::axial(q2, r2), out),
            Command::Reach { q, r } => self.reach(Hex::axial(q, r), out),
            Command::Simulate { steps, agents, seed } => self.simulate(steps, agents, seed, out),
        }
    }

    fn inspect(&self, out: &mut impl Write) -> Result<()> {
        writeln!(out, "{} tiles", self.world.len())?;
        for (class, count) in self.world.class_counts() {
            writeln!(out, "{:<10} {count}", class.to_string())?;
        }
        Ok(())
    }

    fn locate(&self, point: Point, out: &mut impl Write) -> Result<()> {
        let hex = self.world.hex_at(point);
        match self.world.tile(hex) {
            Some(tile) => {
                let cost = tile.movement_cost().map_or_else(|| "blocked".to_owned(), |c| format!("cost {c}"));
                writeln!(out, "{hex} {} ({cost})", tile.class)?;
            },
            None => writeln!(out, "{hex} off map")?,
        }
        Ok(())
    }

    fn require(&self, hex: Hex) -> Result<()> {
        if self.world.tile(hex).is_none() {
            bail!("No tile at {hex}");
        }
        Ok(())
    }

    fn path(&self, start: Hex, goal: Hex, out: &mut impl Write) -> Result<()> {
        self.require(start)?;
        self.require(goal)?;
        match self.world.graph().path(start, goal) {
            Some((path, cost)) => {
                let steps: Vec<String> = path.iter().map(ToString::to_string).collect();
                writeln!(out, "cost {cost}, {} steps", path.len() - 1)?;
                writeln!(out, "{}", steps.join(" -> "))?;
            },
            None => writeln!(out, "{goal} is unreachable from {start}")?,
        }
        Ok(())
    }

    fn reach(&self, start: Hex, out: &mut impl Write) -> Result<()> {
        self.require(start)?;
        let mut reached: Vec<Hex> = self.world.graph().breadth_first(start, None).into_keys().collect();
        reached.sort_by_key(|hex| (start.distance_to(*hex), *hex));
        writeln!(out, "{} tiles reachable from {start}", reached.len())?;
        for hex in reached {
            let class = self.world.tile(hex).map(|t| t.class.to_string()).unwrap_or_default();
            writeln!(out, "{hex} {class} (distance {})", start.distance_to(hex))?;
        }
        Ok(())
    }

    fn simulate(&self, steps: u32, agents: u32, seed: u64, out: &mut impl Write) -> Result<()> {
        let mut world = self.world.clone();
        let mut rng = StdRng::seed_from_u64(seed);

        let homes: Vec<Hex> = world.tiles().filter(|t| t.home().is_some()).map(|t| t.hex).collect();
        for &home in &homes {
            for _ in 0..agents {
                world.spawn_agent(home, &mut rng)?;
            }
        }
        writeln!(out, "{} homes, {} agents", homes.len(), homes.len() * agents as usize)?;

        let (mut deaths, mut destroyed, mut regrown) = (0, 0, 0);
        for _ in 0..steps {
            let report = world.advance()?;
            deaths += report.deaths;
            destroyed += report.homes_destroyed;
            regrown += report.regrown;
        }

        let living: usize = world.tiles().filter_map(|t| t.home()).map(|h| h.building.occupants.len()).sum();
        writeln!(out, "time {} ({} steps)", world.time(), world.time().steps())?;
        writeln!(out, "living {living}, deaths {deaths}, homes destroyed {destroyed}, regrowth {regrown}")?;
        Ok(())
    }
}
