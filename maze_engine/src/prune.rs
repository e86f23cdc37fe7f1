// prune.rs - Dead-end trimming of a carved sub-maze

use std::time::Duration;

use crate::sink::PaintSink;
use crate::types::{CellPaint, CellType, Coord, Grid};

/// Upper bound on trimming rounds.
pub const MAX_PRUNE_ROUNDS: usize = 10;

/// Rounds to run on a height x width grid. Small grids get fewer so the
/// origin's branch is never trimmed away entirely.
pub fn prune_rounds(height: usize, width: usize) -> usize {
    MAX_PRUNE_ROUNDS.min(height.min(width).saturating_sub(1))
}

/// Traversable cells with exactly one traversable neighbor, origin excluded.
pub fn dead_ends(grid: &Grid, origin: Coord) -> Vec<Coord> {
    grid.coords()
        .filter(|&coord| {
            coord != origin && grid[coord].is_traversable() && grid.open_neighbors(coord) == 1
        })
        .collect()
}

/// One round: every dead end present at the start of the round becomes wall.
pub async fn prune_round(
    mut grid: Grid,
    origin: Coord,
    sink: &PaintSink<CellPaint>,
    delay: Duration,
) -> Grid {
    for coord in dead_ends(&grid, origin) {
        grid[coord] = CellType::Wall;
        sink.send(CellPaint::new(coord, CellType::Wall, delay)).await;
    }
    grid
}

/// Run all rounds for the grid's size.
pub async fn prune(
    mut grid: Grid,
    origin: Coord,
    sink: &PaintSink<CellPaint>,
    delay: Duration,
) -> Grid {
    let before = grid.traversable_count();
    for _ in 0..prune_rounds(grid.height(), grid.width()) {
        grid = prune_round(grid, origin, sink, delay).await;
    }

    log::debug!(
        "pruned {} dead-end cells around {origin}",
        before - grid.traversable_count()
    );
    grid
}
