// carve/prim.rs - Randomized frontier growth over a wait-list of wall cells

use super::Carver;
use crate::error_handling::Result;
use crate::random::RandomSource;
use crate::sink::PaintSink;
use crate::types::{CellPaint, CellType, Coord, Direction, Grid};

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
    let mut wait_list: Vec<Coord> = grid.neighbors(origin).collect();

    grid[origin] = CellType::Passage;
    sink.send(CellPaint::new(origin, CellType::Passage, carver.delay)).await;

    while !wait_list.is_empty() {
        let picked = rng.index(wait_list.len())?;
        let current = wait_list.swap_remove(picked);
        // queued twice, already carved through the other entry
        if grid[current].is_traversable() {
            continue;
        }

        let rollback = wait_list.len();
        let mut blocked = 0;
        for dir in Direction::ALL {
            match grid.step(current, dir) {
                None => blocked += 1,
                Some(next) if grid[next] == CellType::Wall => {
                    wait_list.push(next);
                    blocked += 1;
                }
                Some(_) => {}
            }
        }

        // touching two carved cells would close a loop
        if blocked < MIN_BLOCKED_SIDES {
            wait_list.truncate(rollback);
            continue;
        }

        let cell = carver.terrain.pick(rng)?;
        grid[current] = cell;
        sink.send(CellPaint::new(current, cell, carver.delay)).await;
    }

    Ok(grid)
}
