// pathfinder/mod.rs - Weighted shortest-path search over a generated grid

pub mod astar;
pub mod dijkstra;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::types::{Coord, Grid};

pub use astar::AStar;
pub use dijkstra::Dijkstra;

/// Receives the start-to-cell path each time a cell is settled, and an empty
/// slice once when the search gives up.
pub type SearchObserver<'a> = &'a mut dyn FnMut(&[Coord]);

pub trait PathFinder: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cheapest path from `start` to `end`, both included; `None` when they
    /// are not connected through traversable cells.
    fn search(
        &self,
        grid: &Grid,
        start: Coord,
        end: Coord,
        observer: Option<SearchObserver<'_>>,
    ) -> Option<Vec<Coord>>;

    fn shortest_path(&self, grid: &Grid, start: Coord, end: Coord) -> Option<Vec<Coord>> {
        self.search(grid, start, end, None)
    }
}

/// Search strategy identifiers accepted on the command line and in settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathAlgorithm {
    /// Uniform-cost search
    #[default]
    Dijkstra,
    /// Manhattan-guided search
    AStar,
}

impl PathAlgorithm {
    pub fn finder(self) -> Box<dyn PathFinder> {
        match self {
            PathAlgorithm::Dijkstra => Box::new(Dijkstra),
            PathAlgorithm::AStar => Box::new(AStar),
        }
    }
}

/// Priority queue entry. Popped entries for an already settled coordinate
/// are skipped instead of decreasing keys in place.
#[derive(Debug, Clone, Copy)]
pub struct PathFinderItem {
    pub coord: Coord,
    pub predecessor: Option<Coord>,
    /// Accumulated cost from the start.
    pub cost: u32,
    /// Lower bound on the remaining cost; always zero for Dijkstra.
    pub estimate: u32,
    seq: u64,
}

impl PathFinderItem {
    fn priority(&self) -> u32 {
        self.cost + self.estimate
    }
}

impl Ord for PathFinderItem {
    // reversed: BinaryHeap is a max-heap, earlier pushes win ties
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority()
            .cmp(&self.priority())
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for PathFinderItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PathFinderItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PathFinderItem {}

/// Best-first search shared by both strategies; `heuristic` is the
/// remaining-cost estimate for a coordinate.
pub(crate) fn best_first(
    name: &str,
    grid: &Grid,
    start: Coord,
    end: Coord,
    heuristic: impl Fn(Coord) -> u32,
    mut observer: Option<SearchObserver<'_>>,
) -> Option<Vec<Coord>> {
    if !grid.contains(start) || !grid.contains(end) {
        log::warn!("{name}: endpoints {start} -> {end} outside the grid");
        return None;
    }

    let mut settled: HashMap<Coord, Option<Coord>> = HashMap::new();
    let mut queue = BinaryHeap::new();
    let mut seq = 0;
    queue.push(PathFinderItem {
        coord: start,
        predecessor: None,
        cost: 0,
        estimate: heuristic(start),
        seq,
    });

    while let Some(item) = queue.pop() {
        if settled.contains_key(&item.coord) {
            continue;
        }
        settled.insert(item.coord, item.predecessor);

        if let Some(observe) = observer.as_mut() {
            observe(&reconstruct(&settled, item.coord));
        }
        if item.coord == end {
            log::info!(
                "{name}: path of cost {} found after settling {} cells",
                item.cost,
                settled.len()
            );
            return Some(reconstruct(&settled, end));
        }

        for next in grid.neighbors(item.coord) {
            if settled.contains_key(&next) {
                continue;
            }
            let Some(step) = grid[next].cost() else {
                continue;
            };
            seq += 1;
            queue.push(PathFinderItem {
                coord: next,
                predecessor: Some(item.coord),
                cost: item.cost + step,
                estimate: heuristic(next),
                seq,
            });
        }
    }

    log::info!(
        "{name}: no path from {start} to {end} after settling {} cells",
        settled.len()
    );
    if let Some(observe) = observer.as_mut() {
        observe(&[]);
    }
    None
}

fn reconstruct(settled: &HashMap<Coord, Option<Coord>>, to: Coord) -> Vec<Coord> {
    let mut path = vec![to];
    let mut cursor = to;
    while let Some(&Some(prev)) = settled.get(&cursor) {
        path.push(prev);
        cursor = prev;
    }
    path.reverse();
    path
}

/// Sum of step costs along `path`, the first cell excluded. `None` if a step
/// lands on something untraversable.
pub fn path_cost(grid: &Grid, path: &[Coord]) -> Option<u32> {
    path.iter()
        .skip(1)
        .map(|&coord| grid.get(coord).and_then(|cell| cell.cost()))
        .sum()
}

/// Starts at `start`, ends at `end`, moves one 4-neighbor at a time and
/// never steps onto a wall.
pub fn is_valid_path(grid: &Grid, path: &[Coord], start: Coord, end: Coord) -> bool {
    path.first() == Some(&start)
        && path.last() == Some(&end)
        && path.windows(2).all(|pair| pair[0].is_adjacent(pair[1]))
        && path_cost(grid, path).is_some()
}
