// pathfinder/dijkstra.rs - Uniform-cost search

use super::{best_first, PathFinder, SearchObserver};
use crate::types::{Coord, Grid};

/// Expands cells strictly in order of accumulated cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dijkstra;

impl PathFinder for Dijkstra {
    fn name(&self) -> &'static str {
        "dijkstra"
    }

    fn search(
        &self,
        grid: &Grid,
        start: Coord,
        end: Coord,
        observer: Option<SearchObserver<'_>>,
    ) -> Option<Vec<Coord>> {
        best_first(self.name(), grid, start, end, |_| 0, observer)
    }
}
