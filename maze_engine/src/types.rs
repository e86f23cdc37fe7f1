// types.rs - Grid model shared by carving, merging, path search and painting

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::time::Duration;

/// Origin id of authoritative paint events emitted by the merge.
pub const MERGE_ORIGIN: u8 = 0;
/// Origin id of the sub-maze grown from the start coordinate.
pub const START_ORIGIN: u8 = 1;
/// Origin id of the sub-maze grown from the end coordinate.
pub const END_ORIGIN: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn manhattan(self, other: Coord) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    pub fn is_adjacent(self, other: Coord) -> bool {
        self.manhattan(other) == 1
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

/// Cell classification. `Guessing` and `Path` only ever appear on screen,
/// never inside a generated grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellType {
    #[default]
    Wall,
    Passage,
    /// Cheaper than a plain passage.
    Money,
    Sand,
    River,
    Guessing,
    Path,
}

impl CellType {
    /// Cheapest step any traversable cell can cost.
    pub const MIN_TRAVERSAL_COST: u32 = 0;

    /// Cost of stepping onto this cell, `None` when it cannot be entered.
    pub fn cost(self) -> Option<u32> {
        match self {
            CellType::Money => Some(0),
            CellType::Passage => Some(1),
            CellType::Sand => Some(3),
            CellType::River => Some(5),
            CellType::Wall | CellType::Guessing | CellType::Path => None,
        }
    }

    pub fn is_traversable(self) -> bool {
        self.cost().is_some()
    }

    pub fn is_render_only(self) -> bool {
        matches!(self, CellType::Guessing | CellType::Path)
    }
}

/// Dense row-major height x width grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    height: usize,
    width: usize,
    cells: Vec<CellType>,
}

impl Grid {
    /// All-wall grid.
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            cells: vec![CellType::Wall; height * width],
        }
    }

    /// Build from explicit rows; `None` for an empty or ragged layout.
    pub fn from_rows(rows: Vec<Vec<CellType>>) -> Option<Self> {
        let height = rows.len();
        let width = rows.first().map(Vec::len)?;
        if width == 0 || rows.iter().any(|row| row.len() != width) {
            return None;
        }

        Some(Self {
            height,
            width,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.row < self.height && coord.col < self.width
    }

    pub fn get(&self, coord: Coord) -> Option<CellType> {
        self.contains(coord)
            .then(|| self.cells[coord.row * self.width + coord.col])
    }

    /// Neighbor one step in `dir`, if it lies inside the grid.
    pub fn step(&self, coord: Coord, dir: Direction) -> Option<Coord> {
        let (dr, dc) = dir.delta();
        let row = coord.row.checked_add_signed(dr)?;
        let col = coord.col.checked_add_signed(dc)?;
        let next = Coord::new(row, col);
        self.contains(next).then_some(next)
    }

    /// In-bounds 4-neighbors in `Direction::ALL` order.
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| self.step(coord, dir))
    }

    /// Number of traversable 4-neighbors.
    pub fn open_neighbors(&self, coord: Coord) -> usize {
        self.neighbors(coord)
            .filter(|&next| self[next].is_traversable())
            .count()
    }

    /// Every coordinate in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let width = self.width;
        (0..self.height * self.width).map(move |idx| Coord::new(idx / width, idx % width))
    }

    pub fn traversable_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_traversable()).count()
    }

    /// Cheapest step cost present in this grid; `None` when nothing can be entered.
    pub fn min_step_cost(&self) -> Option<u32> {
        self.cells.iter().filter_map(|cell| cell.cost()).min()
    }
}

impl Index<Coord> for Grid {
    type Output = CellType;

    fn index(&self, coord: Coord) -> &CellType {
        debug_assert!(self.contains(coord), "{coord} outside {}x{}", self.height, self.width);
        &self.cells[coord.row * self.width + coord.col]
    }
}

impl IndexMut<Coord> for Grid {
    fn index_mut(&mut self, coord: Coord) -> &mut CellType {
        debug_assert!(self.contains(coord), "{coord} outside {}x{}", self.height, self.width);
        &mut self.cells[coord.row * self.width + coord.col]
    }
}

/// Validated pipeline input. Height and width are at least 2, start and end
/// differ and both sit on the boundary; `MazeSettings::validate` enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeConfig {
    pub height: usize,
    pub width: usize,
    pub start: Coord,
    pub end: Coord,
}

impl MazeConfig {
    pub fn new(height: usize, width: usize, start: Coord, end: Coord) -> Self {
        Self {
            height,
            width,
            start,
            end,
        }
    }

    pub fn on_boundary(&self, coord: Coord) -> bool {
        coord.row == 0
            || coord.col == 0
            || coord.row + 1 == self.height
            || coord.col + 1 == self.width
    }
}

/// Final merged maze handed to the path search and the painter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maze {
    pub config: MazeConfig,
    pub grid: Grid,
}

impl Maze {
    pub fn new(config: MazeConfig, grid: Grid) -> Self {
        Self { config, grid }
    }
}

/// Untagged mutation on one origin's private stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPaint {
    pub coord: Coord,
    pub cell: CellType,
    pub delay: Duration,
}

impl CellPaint {
    pub fn new(coord: Coord, cell: CellType, delay: Duration) -> Self {
        Self { coord, cell, delay }
    }

    pub fn tagged(self, origin: u8) -> CellPaintEvent {
        CellPaintEvent {
            coord: self.coord,
            cell: self.cell,
            origin,
            delay: self.delay,
        }
    }
}

/// Mutation on the externally visible stream, tagged with its origin id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPaintEvent {
    pub coord: Coord,
    pub cell: CellType,
    pub origin: u8,
    pub delay: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_stays_in_bounds() {
        let grid = Grid::new(3, 4);
        let corner = Coord::new(0, 0);

        assert_eq!(grid.step(corner, Direction::Up), None);
        assert_eq!(grid.step(corner, Direction::Left), None);
        assert_eq!(grid.step(corner, Direction::Right), Some(Coord::new(0, 1)));
        assert_eq!(grid.step(Coord::new(2, 3), Direction::Down), None);
        assert_eq!(grid.neighbors(Coord::new(1, 1)).count(), 4);
        assert_eq!(grid.neighbors(Coord::new(2, 3)).count(), 2);
    }

    #[test]
    fn test_costs() {
        assert_eq!(CellType::Wall.cost(), None);
        assert_eq!(CellType::Money.cost(), Some(CellType::MIN_TRAVERSAL_COST));
        assert!(CellType::Money.cost() < CellType::Passage.cost());
        assert!(CellType::Passage.cost() < CellType::Sand.cost());
        assert!(CellType::Sand.cost() < CellType::River.cost());
        assert!(!CellType::Guessing.is_traversable());
        assert!(CellType::Path.is_render_only());
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        use CellType::*;
        assert!(Grid::from_rows(vec![vec![Wall, Passage], vec![Wall]]).is_none());
        assert!(Grid::from_rows(Vec::new()).is_none());

        let grid = Grid::from_rows(vec![vec![Wall, Passage], vec![Sand, River]]).unwrap();
        assert_eq!(grid[Coord::new(1, 0)], Sand);
        assert_eq!(grid.traversable_count(), 3);
        assert_eq!(grid.coords().last(), Some(Coord::new(1, 1)));
        assert_eq!(grid.min_step_cost(), Some(1));
    }

    #[test]
    fn test_min_step_cost() {
        use CellType::*;
        let walls = Grid::new(2, 2);
        assert_eq!(walls.min_step_cost(), None);

        let grid = Grid::from_rows(vec![vec![River, Money], vec![Wall, Sand]]).unwrap();
        assert_eq!(grid.min_step_cost(), Some(0));
    }

    #[test]
    fn test_boundary() {
        let config = MazeConfig::new(5, 6, Coord::new(0, 2), Coord::new(4, 5));
        assert!(config.on_boundary(Coord::new(0, 3)));
        assert!(config.on_boundary(Coord::new(2, 5)));
        assert!(config.on_boundary(Coord::new(4, 1)));
        assert!(!config.on_boundary(Coord::new(2, 2)));
    }
}
