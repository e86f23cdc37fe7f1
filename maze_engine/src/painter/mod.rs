// painter/mod.rs - Render-side cell state and pacing shared by painters

pub mod terminal;

use std::collections::BTreeMap;
use std::time::Duration;

use crate::types::{CellPaintEvent, CellType, Coord, Grid, MERGE_ORIGIN};

pub use terminal::TerminalPainter;

/// What the renderer shows while two origins carve at once: every cell keeps
/// the last type each origin claimed for it.
///
/// No claims renders as wall, a single claim as that type, and several
/// claims as `Guessing` until an origin-0 event settles the cell.
#[derive(Debug, Clone)]
pub struct DrawState {
    height: usize,
    width: usize,
    claims: Vec<BTreeMap<u8, CellType>>,
}

impl DrawState {
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            claims: vec![BTreeMap::new(); height * width],
        }
    }

    /// Fold one event into the overlay and return what the cell now shows.
    /// Events outside the grid are ignored.
    pub fn apply(&mut self, event: &CellPaintEvent) -> CellType {
        let Some(claims) = self.claims_mut(event.coord) else {
            log::warn!("paint event outside the grid at {}", event.coord);
            return CellType::Wall;
        };

        if event.cell == CellType::Wall {
            claims.remove(&event.origin);
        } else {
            if event.origin == MERGE_ORIGIN {
                claims.clear();
            }
            claims.insert(event.origin, event.cell);
        }
        Self::collapse(claims)
    }

    pub fn resolve(&self, coord: Coord) -> CellType {
        if coord.row >= self.height || coord.col >= self.width {
            return CellType::Wall;
        }
        Self::collapse(&self.claims[coord.row * self.width + coord.col])
    }

    /// Snapshot of every resolved cell.
    pub fn to_grid(&self) -> Grid {
        let mut grid = Grid::new(self.height, self.width);
        for coord in grid.coords() {
            grid[coord] = self.resolve(coord);
        }
        grid
    }

    fn claims_mut(&mut self, coord: Coord) -> Option<&mut BTreeMap<u8, CellType>> {
        if coord.row >= self.height || coord.col >= self.width {
            return None;
        }
        self.claims.get_mut(coord.row * self.width + coord.col)
    }

    fn collapse(claims: &BTreeMap<u8, CellType>) -> CellType {
        let mut values = claims.values();
        match (values.next(), values.next()) {
            (None, _) => CellType::Wall,
            (Some(&cell), None) => cell,
            (Some(_), Some(_)) => CellType::Guessing,
        }
    }
}

/// Sleeps smaller than this are batched; timers are too coarse to honor
/// tens of microseconds one event at a time.
const MIN_SLEEP: Duration = Duration::from_millis(1);

/// Accumulates suggested per-event delays and sleeps once enough is owed.
#[derive(Debug, Default)]
pub struct Pacer {
    owed: Duration,
}

impl Pacer {
    /// Add `delay` to the debt; returns the sleep to take now, if any.
    pub fn owe(&mut self, delay: Duration) -> Option<Duration> {
        self.owed += delay;
        if self.owed < MIN_SLEEP {
            return None;
        }
        Some(std::mem::take(&mut self.owed))
    }

    pub async fn pause(&mut self, delay: Duration) {
        if let Some(sleep) = self.owe(delay) {
            tokio::time::sleep(sleep).await;
        }
    }
}
