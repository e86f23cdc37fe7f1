// carve/mod.rs - Interchangeable sub-maze carving strategies

pub mod backtrack;
pub mod prim;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error_handling::Result;
use crate::random::RandomSource;
use crate::sink::PaintSink;
use crate::types::{CellPaint, CellType, Coord, Grid};

/// Carving strategy identifiers accepted on the command line and in settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CarveAlgorithm {
    /// Randomized depth-first backtracking with a three-way fork
    #[default]
    Backtrack,
    /// Randomized frontier growth
    Prim,
}

impl CarveAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            CarveAlgorithm::Backtrack => "backtrack",
            CarveAlgorithm::Prim => "prim",
        }
    }
}

/// What a freshly carved cell becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Terrain {
    /// Every carved cell is a plain passage.
    #[default]
    Plain,
    /// Carved cells are drawn from a fixed 15-slot distribution:
    /// 1 money, 1 river, 1 sand, 12 passage.
    Weighted,
}

impl Terrain {
    pub fn pick(self, rng: &mut dyn RandomSource) -> Result<CellType> {
        match self {
            Terrain::Plain => Ok(CellType::Passage),
            Terrain::Weighted => Ok(match rng.index(15)? {
                0 => CellType::Money,
                1 => CellType::River,
                2 => CellType::Sand,
                _ => CellType::Passage,
            }),
        }
    }
}

/// A configured carving strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carver {
    pub algorithm: CarveAlgorithm,
    pub terrain: Terrain,
    /// Display delay suggested for every carve event.
    pub delay: Duration,
}

impl Carver {
    pub fn new(algorithm: CarveAlgorithm, terrain: Terrain, delay: Duration) -> Self {
        Self {
            algorithm,
            terrain,
            delay,
        }
    }

    /// Grow a tree of traversable cells from `origin` on a fresh all-wall
    /// grid, sending one paint per carved cell. The origin is always a plain
    /// passage.
    pub async fn carve(
        &self,
        height: usize,
        width: usize,
        origin: Coord,
        rng: &mut dyn RandomSource,
        sink: &PaintSink<CellPaint>,
    ) -> Result<Grid> {
        let grid = match self.algorithm {
            CarveAlgorithm::Backtrack => backtrack::carve(self, height, width, origin, rng, sink).await?,
            CarveAlgorithm::Prim => prim::carve(self, height, width, origin, rng, sink).await?,
        };

        log::debug!(
            "{} carved {} cells from {origin}",
            self.algorithm.name(),
            grid.traversable_count()
        );
        Ok(grid)
    }

    fn cell_for(&self, coord: Coord, origin: Coord, rng: &mut dyn RandomSource) -> Result<CellType> {
        if coord == origin {
            Ok(CellType::Passage)
        } else {
            self.terrain.pick(rng)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::random::EntropySource;
    use proptest::prelude::*;

    fn carve_with(algorithm: CarveAlgorithm, terrain: Terrain, height: usize, width: usize, origin: Coord, seed: u64) -> Grid {
        let carver = Carver::new(algorithm, terrain, Duration::ZERO);
        let mut rng = EntropySource::seeded(seed);
        block_on(carver.carve(height, width, origin, &mut rng, &PaintSink::discard())).unwrap()
    }

    fn boundary_origin(height: usize, width: usize, pick: usize) -> Coord {
        let perimeter: Vec<Coord> = (0..height)
            .flat_map(|r| (0..width).map(move |c| Coord::new(r, c)))
            .filter(|c| c.row == 0 || c.col == 0 || c.row + 1 == height || c.col + 1 == width)
            .collect();
        perimeter[pick % perimeter.len()]
    }

    proptest! {
        #[test]
        fn prop_backtrack_carves_a_tree(height in 2usize..14, width in 2usize..14, pick in 0usize..64, seed in any::<u64>()) {
            let origin = boundary_origin(height, width, pick);
            let grid = carve_with(CarveAlgorithm::Backtrack, Terrain::Plain, height, width, origin, seed);
            prop_assert!(is_tree_from(&grid, origin));
        }

        #[test]
        fn prop_prim_carves_a_tree(height in 2usize..14, width in 2usize..14, pick in 0usize..64, seed in any::<u64>()) {
            let origin = boundary_origin(height, width, pick);
            let grid = carve_with(CarveAlgorithm::Prim, Terrain::Weighted, height, width, origin, seed);
            prop_assert!(is_tree_from(&grid, origin));
            prop_assert_eq!(grid[origin], CellType::Passage);
        }
    }

    #[test]
    fn test_weighted_terrain_distribution() {
        let mut rng = EntropySource::seeded(3);
        let picks: Vec<CellType> = (0..3000).map(|_| Terrain::Weighted.pick(&mut rng).unwrap()).collect();
        let count = |t| picks.iter().filter(|&&p| p == t).count();

        // 12 of 15 slots are passage, one each for the rest
        assert!((2200..2600).contains(&count(CellType::Passage)));
        for rare in [CellType::Money, CellType::Sand, CellType::River] {
            assert!((120..280).contains(&count(rare)), "{rare:?}");
        }
        assert!(picks.iter().all(|p| p.is_traversable()));
    }

    #[test]
    fn test_interior_origin_still_tree() {
        for algorithm in [CarveAlgorithm::Backtrack, CarveAlgorithm::Prim] {
            let origin = Coord::new(4, 5);
            let grid = carve_with(algorithm, Terrain::Plain, 9, 11, origin, 11);
            assert!(is_tree_from(&grid, origin), "{algorithm:?}");
            assert!(grid.traversable_count() > 1);
        }
    }
}
