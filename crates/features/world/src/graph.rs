//! Search over the traversable cells of a map.

use sim_domain::hex::Hex;
use sim_domain::tile::Tile;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};

/// Predecessor of every reached cell; the start maps to `None`.
pub type CameFrom = HashMap<Hex, Option<Hex>>;

/// Outcome of an [`HexGraph::a_star`] search.
#[derive(Debug, Clone, Default)]
pub struct Search {
    pub came_from: CameFrom,
    pub cost_so_far: HashMap<Hex, u32>,
}

/// Adjacency of a hex map: every cell links to its traversable neighbours.
#[derive(Debug, Clone, Default)]
pub struct HexGraph {
    edges: HashMap<Hex, Vec<(Hex, u32)>>,
}

impl HexGraph {
    /// Builds edges from every tile to each traversable neighbour, weighted by the
    /// neighbour's movement cost.
    pub fn new<'a>(tiles: impl IntoIterator<Item = &'a Tile>) -> Self {
        let tiles: HashMap<Hex, &Tile> = tiles.into_iter().map(|t| (t.hex, t)).collect();
        let edges = tiles
            .keys()
            .map(|&hex| {
                let neighbors = hex
                    .neighbors()
                    .into_iter()
                    .filter_map(|n| tiles.get(&n).and_then(|t| t.movement_cost()).map(|cost| (n, cost)))
                    .collect();
                (hex, neighbors)
            })
            .collect();
        Self { edges }
    }

    #[must_use]
    pub fn contains(&self, hex: Hex) -> bool {
        self.edges.contains_key(&hex)
    }

    #[must_use]
    pub fn neighbors(&self, hex: Hex) -> &[(Hex, u32)] {
        self.edges.get(&hex).map_or(&[][..], Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Flood fill from `start`, stopping early once `goal` is dequeued.
    #[must_use]
    pub fn breadth_first(&self, start: Hex, goal: Option<Hex>) -> CameFrom {
        let mut frontier = VecDeque::from([start]);
        let mut came_from = CameFrom::from([(start, None)]);

        while let Some(current) = frontier.pop_front() {
            if Some(current) == goal {
                break;
            }
            for &(next, _) in self.neighbors(current) {
                if !came_from.contains_key(&next) {
                    came_from.insert(next, Some(current));
                    frontier.push_back(next);
                }
            }
        }
        came_from
    }

    /// A* with the hex distance as heuristic.
    #[must_use]
    pub fn a_star(&self, start: Hex, goal: Hex) -> Search {
        let mut frontier = BinaryHeap::from([Reverse((0, start))]);
        let mut search = Search {
            came_from: CameFrom::from([(start, None)]),
            cost_so_far: HashMap::from([(start, 0)]),
        };

        while let Some(Reverse((_, current))) = frontier.pop() {
            if current == goal {
                break;
            }
            let current_cost = search.cost_so_far[&current];
            for &(next, step) in self.neighbors(current) {
                let new_cost = current_cost + step;
                if search.cost_so_far.get(&next).is_none_or(|&known| new_cost < known) {
                    search.cost_so_far.insert(next, new_cost);
                    search.came_from.insert(next, Some(current));
                    frontier.push(Reverse((new_cost + next.distance_to(goal), next)));
                }
            }
        }
        search
    }

    /// Cheapest path from `start` to `goal` and its cost.
    #[must_use]
    pub fn path(&self, start: Hex, goal: Hex) -> Option<(Vec<Hex>, u32)> {
        let search = self.a_star(start, goal);
        let cost = *search.cost_so_far.get(&goal)?;
        Some((reconstruct_path(&search.came_from, start, goal), cost))
    }
}

/// Walks `came_from` back from `goal`; empty when `goal` was never reached.
#[must_use]
pub fn reconstruct_path(came_from: &CameFrom, start: Hex, goal: Hex) -> Vec<Hex> {
    if !came_from.contains_key(&goal) {
        return Vec::new();
    }
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match came_from.get(&current).copied().flatten() {
            Some(previous) => {
                path.push(previous);
                current = previous;
            },
            None => break,
        }
    }
    path.reverse();
    path
}
