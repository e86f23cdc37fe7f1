// pathfinder/astar.rs - Manhattan-guided best-first search

use super::{best_first, PathFinder, SearchObserver};
use crate::types::{CellType, Coord, Grid};

/// Orders cells by accumulated cost plus Manhattan distance to the end,
/// scaled by the cheapest step in the grid so the estimate never overshoots.
/// A grid with zero-cost cells degrades to uniform-cost search.
#[derive(Debug, Clone, Copy, Default)]
pub struct AStar;

impl PathFinder for AStar {
    fn name(&self) -> &'static str {
        "a-star"
    }

    fn search(
        &self,
        grid: &Grid,
        start: Coord,
        end: Coord,
        observer: Option<SearchObserver<'_>>,
    ) -> Option<Vec<Coord>> {
        let step = grid.min_step_cost().unwrap_or(CellType::MIN_TRAVERSAL_COST);
        let heuristic = |coord: Coord| coord.manhattan(end) as u32 * step;
        best_first(self.name(), grid, start, end, heuristic, observer)
    }
}
