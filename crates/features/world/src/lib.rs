//! # World
//!
//! Turns a Tiled hex map into live simulation state.
//!
//! 1.  **Loading ([`tiled`], [`TileMap`]):** reads `.tmj` maps with embedded or external
//!     `.tsj` tilesets and maps every cell to a cube coordinate.
//! 2.  **State ([`WorldMap`]):** tile lookup by hex or world-space pixel, agent spawning and
//!     the step-by-step [`WorldMap::advance`].
//! 3.  **Search ([`graph`]):** breadth-first reachability and A* paths over traversable cells.
//!
//! ```rust,no_run
//! use sim_domain::hex::{Hex, Layout, Orientation, Point};
//! use sim_world::WorldMap;
//!
//! let layout = Layout::new(Orientation::POINTY, Point::new(70.0, 70.0), Point::ORIGIN);
//! let world = WorldMap::load("assets/maps/4corners.tmj", layout)?;
//! if let Some((path, cost)) = world.graph().path(Hex::ORIGIN, Hex::axial(4, 2)) {
//!     println!("{} steps, cost {cost}", path.len());
//! }
//! # Ok::<(), sim_world::WorldError>(())
//! ```

mod error;
pub mod graph;
mod map;
pub mod tiled;

pub use crate::error::{WorldError, WorldErrorExt};
pub use crate::graph::HexGraph;
pub use crate::map::{TickReport, TileMap, WorldMap};
