use crate::graph::HexGraph;
use crate::tiled::{TiledMap, TilesetTable};
use crate::{WorldError, WorldErrorExt};
use rand::Rng;
use sim_domain::agent::{Agent, AgentId};
use sim_domain::hex::{Hex, Layout, OffsetCoord, OffsetSystem, Point};
use sim_domain::tile::{Tile, TileClass, TileEvent};
use sim_domain::time::SimTime;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, instrument, trace, warn};

/// Tiled stores hex rows with every other row shoved half a cell.
const STORAGE_SYSTEM: OffsetSystem = OffsetSystem::EvenR;

/// Tiles decoded from a Tiled map, keyed by cube coordinate.
#[derive(Debug, Clone, Default)]
pub struct TileMap {
    pub width: u32,
    pub height: u32,
    pub tiles: BTreeMap<Hex, Tile>,
}

impl TileMap {
    /// Reads a `.tmj` map; external tilesets resolve relative to the map's directory.
    ///
    /// # Errors
    /// Any I/O, parse or format error, or a cell whose tile has an unknown class.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).context(format!("reading map {}", path.display()))?;
        let map: TiledMap =
            serde_json::from_str(&raw).context(format!("parsing map {}", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let tile_map = Self::from_tiled(&map, base_dir)?;
        info!(tiles = tile_map.tiles.len(), width = map.width, height = map.height, "Loaded tile map");
        Ok(tile_map)
    }

    /// Builds tiles from an already parsed map. Later layers override earlier ones.
    ///
    /// # Errors
    /// See [`TileMap::load`].
    pub fn from_tiled(map: &TiledMap, base_dir: &Path) -> Result<Self, WorldError> {
        if map.infinite {
            return Err(WorldError::Unsupported { message: "infinite maps".into(), context: None });
        }
        if !map.orientation.is_empty() && map.orientation != "hexagonal" {
            warn!(orientation = %map.orientation, "Map is not hexagonal, cells are read as even-r hexes");
        }

        let tilesets = TilesetTable::resolve(&map.tilesets, base_dir)?;
        let mut tiles = BTreeMap::new();

        for layer in map.tile_layers() {
            let gids = layer.gids().context(format!("layer '{}'", layer.name))?;
            let width = layer.width.max(1);
            for (col, row, gid) in cells(&gids, width) {
                if gid == 0 {
                    continue;
                }
                let properties = tilesets.lookup(gid).ok_or_else(|| WorldError::InvalidMap {
                    message: format!("no tileset tile for gid {gid}").into(),
                    context: Some(format!("layer '{}' at ({col}, {row})", layer.name).into()),
                })?;
                let hex = OffsetCoord::new(col, row).to_cube(STORAGE_SYSTEM);
                let tile = Tile::from_properties(hex, properties)
                    .context(format!("layer '{}' at ({col}, {row})", layer.name))?;
                tiles.insert(hex, tile);
            }
            debug!(layer = %layer.name, "Decoded tile layer");
        }

        Ok(Self { width: map.width, height: map.height, tiles })
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn cells(gids: &[u32], width: u32) -> impl Iterator<Item = (i32, i32, u32)> + '_ {
    gids.iter().enumerate().map(move |(index, &gid)| {
        let index = index as u32;
        ((index % width) as i32, (index / width) as i32, gid)
    })
}

/// Counts from one [`WorldMap::advance`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub time: SimTime,
    pub deaths: usize,
    pub homes_destroyed: usize,
    pub regrown: usize,
}

/// The live simulation state: tiles, their layout in world space and the clock.
#[derive(Debug, Clone)]
pub struct WorldMap {
    tiles: BTreeMap<Hex, Tile>,
    layout: Layout,
    graph: HexGraph,
    time: SimTime,
    next_agent: u64,
}

impl WorldMap {
    /// Wraps decoded tiles and tells every home which deposits it can reach.
    #[must_use]
    pub fn new(tile_map: TileMap, layout: Layout) -> Self {
        let graph = HexGraph::new(tile_map.tiles.values());
        let mut world = Self { tiles: tile_map.tiles, layout, graph, time: SimTime::ZERO, next_agent: 1 };
        world.survey_resource_sites();
        world
    }

    /// # Errors
    /// See [`TileMap::load`].
    pub fn load(path: impl AsRef<Path>, layout: Layout) -> Result<Self, WorldError> {
        Ok(Self::new(TileMap::load(path)?, layout))
    }

    fn survey_resource_sites(&mut self) {
        let homes: Vec<Hex> = self.tiles.values().filter(|t| t.home().is_some()).map(|t| t.hex).collect();
        for home_hex in homes {
            let mut reachable: Vec<Hex> = self.graph.breadth_first(home_hex, None).into_keys().collect();
            reachable.sort_by_key(|hex| (home_hex.distance_to(*hex), *hex));
            let sites: Vec<_> = reachable
                .into_iter()
                .filter_map(|hex| self.tiles.get(&hex)?.deposit().map(|d| (d.resource, hex)))
                .collect();
            if let Some(home) = self.tiles.get_mut(&home_hex).and_then(Tile::home_mut) {
                for (resource, hex) in sites {
                    home.add_resource_site(resource, hex);
                }
            }
        }
    }

    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    #[must_use]
    pub const fn time(&self) -> SimTime {
        self.time
    }

    #[must_use]
    pub const fn graph(&self) -> &HexGraph {
        &self.graph
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[must_use]
    pub fn tile(&self, hex: Hex) -> Option<&Tile> {
        self.tiles.get(&hex)
    }

    pub fn tile_mut(&mut self, hex: Hex) -> Option<&mut Tile> {
        self.tiles.get_mut(&hex)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// The cell under a world-space point.
    #[must_use]
    pub fn hex_at(&self, point: Point) -> Hex {
        self.layout.pixel_to_hex(point).round()
    }

    #[must_use]
    pub fn tile_at(&self, point: Point) -> Option<&Tile> {
        self.tile(self.hex_at(point))
    }

    #[must_use]
    pub fn class_counts(&self) -> BTreeMap<TileClass, usize> {
        let mut counts = BTreeMap::new();
        for tile in self.tiles.values() {
            *counts.entry(tile.class).or_insert(0) += 1;
        }
        counts
    }

    /// Moves a freshly built agent into the home at `home` and gives it a job.
    ///
    /// # Errors
    /// [`WorldError::InvalidMap`] if there is no standing home at `home`.
    pub fn spawn_agent(&mut self, home: Hex, rng: &mut impl Rng) -> Result<AgentId, WorldError> {
        let id = AgentId(self.next_agent);
        let Some(home_tile) = self.tiles.get_mut(&home).and_then(Tile::home_mut).filter(|h| !h.destroyed) else {
            return Err(WorldError::InvalidMap {
                message: format!("no standing home at {home}").into(),
                context: None,
            });
        };
        let agent = Agent::builder(id, home).build(rng)?;
        let job = home_tile.assign_resource(id);
        debug!(agent = %agent, ?job, "Spawned agent");
        home_tile.add_occupant(agent);
        self.next_agent += 1;
        Ok(id)
    }

    /// Advances the clock one step and updates every tile.
    ///
    /// # Errors
    /// Propagates domain errors from tile updates.
    pub fn advance(&mut self) -> Result<TickReport, WorldError> {
        self.time += 1;
        let mut report = TickReport { time: self.time, ..TickReport::default() };

        for tile in self.tiles.values_mut() {
            match tile.update(self.time).context(format!("tile {} at {}", tile.class, tile.hex))? {
                TileEvent::Idle => {},
                TileEvent::Regrew { resource, stock } => {
                    report.regrown += 1;
                    trace!(hex = %tile.hex, %resource, %stock, "Deposit regrew");
                },
                TileEvent::Home(home) => {
                    for death in &home.deaths {
                        info!(time = %self.time, agent = %death.agent, name = %death.name, cause = %death.cause, "Agent died");
                    }
                    report.deaths += home.deaths.len();
                    if home.destroyed {
                        warn!(time = %self.time, hex = %tile.hex, "Home has been destroyed");
                        report.homes_destroyed += 1;
                    }
                },
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use sim_domain::hex::Orientation;
    use sim_domain::resource::Resource;
    use sim_domain::tile::HOME_DESTRUCTION_THRESHOLD;

    fn world(cells: &[(i32, i32, TileClass)]) -> WorldMap {
        let tiles = cells
            .iter()
            .map(|&(q, r, class)| (Hex::axial(q, r), Tile::new(Hex::axial(q, r), class, true, None)))
            .collect();
        let layout = Layout::new(Orientation::POINTY, Point::new(70.0, 70.0), Point::ORIGIN);
        WorldMap::new(TileMap { width: 0, height: 0, tiles }, layout)
    }

    #[test]
    fn cells_are_row_major() {
        let cells: Vec<_> = cells(&[7, 8, 9, 10, 11, 12], 3).collect();
        assert_eq!(cells[0], (0, 0, 7));
        assert_eq!(cells[2], (2, 0, 9));
        assert_eq!(cells[4], (1, 1, 11));
    }

    #[test]
    fn pixel_lookup_rounds_to_nearest_cell() {
        let w = world(&[(0, 0, TileClass::Grass), (1, 0, TileClass::Forest)]);
        let center = w.layout().hex_to_pixel(Hex::axial(1, 0));
        let nudged = Point::new(center.x + 10.0, center.y - 10.0);
        assert_eq!(w.tile_at(nudged).map(|t| t.class), Some(TileClass::Forest));
        assert!(w.tile_at(Point::new(-1_000.0, 0.0)).is_none());
    }

    #[test]
    fn homes_learn_reachable_deposits_nearest_first() {
        let w = world(&[
            (0, 0, TileClass::House),
            (1, 0, TileClass::Grass),
            (2, 0, TileClass::Forest),
            (-1, 0, TileClass::Forest),
            (9, 9, TileClass::Food),
        ]);
        let home = w.tile(Hex::ORIGIN).and_then(Tile::home).unwrap();
        assert_eq!(home.sites(Resource::Wood), &[Hex::axial(-1, 0), Hex::axial(2, 0)]);
        assert!(home.sites(Resource::Food).is_empty());
    }

    #[test]
    fn spawned_agents_get_jobs() {
        let mut w = world(&[(0, 0, TileClass::House), (1, 0, TileClass::Food), (0, 1, TileClass::Stone)]);
        let mut rng = StdRng::seed_from_u64(1);
        let id = w.spawn_agent(Hex::ORIGIN, &mut rng).unwrap();
        let home = w.tile(Hex::ORIGIN).and_then(Tile::home).unwrap();
        assert_eq!(home.assignment(id), Some(Resource::Food));
        assert_eq!(home.building.occupants.len(), 1);

        assert!(w.spawn_agent(Hex::axial(1, 0), &mut rng).is_err());
    }

    #[test]
    fn advance_ticks_and_reports_collapse() {
        let mut w = world(&[(0, 0, TileClass::House), (1, 0, TileClass::Food)]);
        let mut rng = StdRng::seed_from_u64(1);
        w.spawn_agent(Hex::ORIGIN, &mut rng).unwrap();
        if let Some(home) = w.tile_mut(Hex::ORIGIN).and_then(Tile::home_mut) {
            home.building.wear = HOME_DESTRUCTION_THRESHOLD - 1;
        }

        let first = w.advance().unwrap();
        assert_eq!(first.time, SimTime::from_steps(1));
        assert_eq!(first.deaths, 0);

        let mut collapsed = TickReport::default();
        while w.time() < SimTime::days(1) {
            collapsed = w.advance().unwrap();
        }
        assert_eq!(collapsed.homes_destroyed, 1);
        assert_eq!(collapsed.deaths, 1);
        assert!(w.spawn_agent(Hex::ORIGIN, &mut rng).is_err());
    }

    #[test]
    fn class_counts_cover_every_tile() {
        let w = world(&[(0, 0, TileClass::Grass), (1, 0, TileClass::Grass), (2, 0, TileClass::Gem)]);
        let counts = w.class_counts();
        assert_eq!(counts[&TileClass::Grass], 2);
        assert_eq!(counts[&TileClass::Gem], 1);
        assert_eq!(w.len(), 3);
    }
}
