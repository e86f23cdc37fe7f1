// carve/backtrack.rs - Randomized depth-first carving with an explicit stack

use super::Carver;
use crate::error_handling::Result;
use crate::random::RandomSource;
use crate::sink::PaintSink;
use crate::types::{CellPaint, CellType, Coord, Direction, Grid};

/// Directions explored from every carved cell.
const FORK_FACTOR: usize = 3;

/// A cell is carved only when at least this many of its four sides are
/// border or wall, i.e. it touches at most one carved cell.
const MIN_BLOCKED_SIDES: usize = 3;

pub(super) async fn carve(
    carver: &Carver,
    height: usize,
    width: usize,
    origin: Coord,
    rng: &mut dyn RandomSource,
    sink: &PaintSink<CellPaint>,
) -> Result<Grid> {
    let mut grid = Grid::new(height, width);
    let mut stack = vec![origin];

    while let Some(current) = stack.pop() {
        if grid[current].is_traversable() {
            continue;
        }

        let blocked = Direction::ALL
            .into_iter()
            .filter(|&dir| {
                grid.step(current, dir)
                    .map_or(true, |next| grid[next] == CellType::Wall)
            })
            .count();
        if blocked < MIN_BLOCKED_SIDES {
            continue;
        }

        let cell = carver.cell_for(current, origin, rng)?;
        grid[current] = cell;
        sink.send(CellPaint::new(current, cell, carver.delay)).await;

        // partial shuffle: the first FORK_FACTOR slots become distinct random directions
        let mut dirs = Direction::ALL;
        for i in 0..FORK_FACTOR {
            let j = i + rng.index(dirs.len() - i)?;
            dirs.swap(i, j);

            if let Some(next) = grid.step(current, dirs[i]) {
                if grid[next] == CellType::Wall {
                    stack.push(next);
                }
            }
        }
    }

    Ok(grid)
}
