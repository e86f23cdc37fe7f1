// config.rs - Validated run settings: ranges, endpoints, algorithms and display pacing

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::carve::{CarveAlgorithm, Terrain};
use crate::error_handling::{MazeError, Result};
use crate::pathfinder::PathAlgorithm;
use crate::random::Entropy;
use crate::types::{Coord, MazeConfig};

/// Inclusive integer range; a missing end is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange {
    min: Option<i64>,
    max: Option<i64>,
}

impl IntRange {
    pub fn new(min: Option<i64>, max: Option<i64>) -> Result<Self> {
        match (min, max) {
            (Some(min), Some(max)) if min > max => Err(MazeError::InvalidRange { min, max }),
            _ => Ok(Self { min, max }),
        }
    }

    pub fn at_least(min: i64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn between(min: i64, max: i64) -> Result<Self> {
        Self::new(Some(min), Some(max))
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min.map_or(true, |min| min <= value) && self.max.map_or(true, |max| value <= max)
    }

    /// `value` when inside the range, otherwise an `OutOfRange` naming it.
    pub fn check(&self, name: &'static str, value: i64) -> Result<i64> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(MazeError::OutOfRange {
                name,
                value,
                range: self.to_string(),
            })
        }
    }
}

impl fmt::Display for IntRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (None, None) => write!(f, "(-inf, inf)"),
            (None, Some(max)) => write!(f, "(-inf, {max}]"),
            (Some(min), None) => write!(f, "[{min}, inf)"),
            (Some(min), Some(max)) => write!(f, "[{min}, {max}]"),
        }
    }
}

/// Display delays suggested to the renderer, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delays {
    pub carve_micros: u64,
    pub prune_micros: u64,
    pub merge_micros: u64,
    pub search_frame_micros: u64,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            carve_micros: 3_000,
            prune_micros: 100,
            merge_micros: 30,
            search_frame_micros: 50_000,
        }
    }
}

impl Delays {
    /// No pacing at all, for tests and headless runs.
    pub fn none() -> Self {
        Self {
            carve_micros: 0,
            prune_micros: 0,
            merge_micros: 0,
            search_frame_micros: 0,
        }
    }

    pub fn carve(&self) -> Duration {
        Duration::from_micros(self.carve_micros)
    }

    pub fn prune(&self) -> Duration {
        Duration::from_micros(self.prune_micros)
    }

    pub fn merge(&self) -> Duration {
        Duration::from_micros(self.merge_micros)
    }

    pub fn search_frame(&self) -> Duration {
        Duration::from_micros(self.search_frame_micros)
    }
}

/// Everything a run needs, before validation. Loaded from JSON and/or
/// overridden from the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeSettings {
    pub height: usize,
    pub width: usize,
    /// Defaults to the top-left corner.
    pub start: Option<Coord>,
    /// Defaults to the bottom-right corner.
    pub end: Option<Coord>,
    pub carve: CarveAlgorithm,
    pub path: PathAlgorithm,
    pub terrain: bool,
    /// Deterministic entropy instead of the OS source.
    pub seed: Option<u64>,
    pub delays: Delays,
}

impl Default for MazeSettings {
    fn default() -> Self {
        Self {
            height: 15,
            width: 15,
            start: None,
            end: None,
            carve: CarveAlgorithm::default(),
            path: PathAlgorithm::default(),
            terrain: false,
            seed: None,
            delays: Delays::default(),
        }
    }
}

impl MazeSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn terrain(&self) -> Terrain {
        if self.terrain {
            Terrain::Weighted
        } else {
            Terrain::Plain
        }
    }

    pub fn entropy(&self) -> Entropy {
        self.seed.map_or(Entropy::Os, Entropy::Seeded)
    }

    /// Apply the input rules the pipeline relies on: both sides at least 2,
    /// endpoints inside the grid, distinct, and on the boundary.
    pub fn validate(&self) -> Result<MazeConfig> {
        let side = IntRange::at_least(2);
        let height = side.check("height", self.height as i64)? as usize;
        let width = side.check("width", self.width as i64)? as usize;

        let start = self.start.unwrap_or(Coord::new(0, 0));
        let end = self.end.unwrap_or(Coord::new(height - 1, width - 1));

        let rows = IntRange::between(0, height as i64 - 1)?;
        let cols = IntRange::between(0, width as i64 - 1)?;
        rows.check("start row", start.row as i64)?;
        cols.check("start col", start.col as i64)?;
        rows.check("end row", end.row as i64)?;
        cols.check("end col", end.col as i64)?;

        let config = MazeConfig::new(height, width, start, end);
        if start == end {
            return Err(MazeError::InvalidEndpoint {
                reason: "start and end points are equal".into(),
            });
        }
        for (name, coord) in [("start", start), ("end", end)] {
            if !config.on_boundary(coord) {
                return Err(MazeError::InvalidEndpoint {
                    reason: format!("{name} point {coord} must lie on the boundary"),
                });
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_display_and_contains() {
        let open = IntRange::new(None, None).unwrap();
        assert_eq!(open.to_string(), "(-inf, inf)");
        assert!(open.contains(i64::MIN));

        let low = IntRange::at_least(2);
        assert_eq!(low.to_string(), "[2, inf)");
        assert!(!low.contains(1));

        let high = IntRange::new(None, Some(9)).unwrap();
        assert_eq!(high.to_string(), "(-inf, 9]");
        assert!(high.contains(-4) && !high.contains(10));

        let both = IntRange::between(0, 4).unwrap();
        assert_eq!(both.to_string(), "[0, 4]");
        assert!(both.contains(0) && both.contains(4) && !both.contains(5));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = IntRange::between(3, 1).unwrap_err();
        assert!(matches!(err, MazeError::InvalidRange { min: 3, max: 1 }));
        assert_eq!(err.to_string(), "range [3, 1] is invalid");
    }

    #[test]
    fn test_validate_defaults_to_corners() {
        let settings = MazeSettings {
            height: 10,
            width: 12,
            ..MazeSettings::default()
        };
        let config = settings.validate().unwrap();
        assert_eq!(config.start, Coord::new(0, 0));
        assert_eq!(config.end, Coord::new(9, 11));
    }

    #[test]
    fn test_validate_rejections() {
        let base = MazeSettings {
            height: 6,
            width: 8,
            ..MazeSettings::default()
        };

        let too_small = MazeSettings { height: 1, ..base.clone() };
        assert!(matches!(
            too_small.validate(),
            Err(MazeError::OutOfRange { name: "height", .. })
        ));

        let outside = MazeSettings {
            start: Some(Coord::new(6, 0)),
            ..base.clone()
        };
        assert!(matches!(
            outside.validate(),
            Err(MazeError::OutOfRange { name: "start row", .. })
        ));

        let same = MazeSettings {
            start: Some(Coord::new(0, 3)),
            end: Some(Coord::new(0, 3)),
            ..base.clone()
        };
        assert!(matches!(same.validate(), Err(MazeError::InvalidEndpoint { .. })));

        let interior = MazeSettings {
            end: Some(Coord::new(3, 4)),
            ..base.clone()
        };
        assert!(matches!(interior.validate(), Err(MazeError::InvalidEndpoint { .. })));

        let bottom_edge = MazeSettings {
            end: Some(Coord::new(5, 4)),
            ..base
        };
        assert!(bottom_edge.validate().is_ok());
    }

    #[test]
    fn test_settings_from_json() {
        let settings = MazeSettings::from_json(
            r#"{
                "height": 9,
                "width": 7,
                "start": {"row": 0, "col": 3},
                "end": {"row": 8, "col": 3},
                "carve": "prim",
                "path": "a-star",
                "terrain": true,
                "seed": 17,
                "delays": {"carve_micros": 0}
            }"#,
        )
        .unwrap();

        assert_eq!(settings.carve, CarveAlgorithm::Prim);
        assert_eq!(settings.path, PathAlgorithm::AStar);
        assert_eq!(settings.terrain(), Terrain::Weighted);
        assert_eq!(settings.entropy(), Entropy::Seeded(17));
        assert_eq!(settings.delays.carve(), Duration::ZERO);
        assert_eq!(settings.delays.prune_micros, Delays::default().prune_micros);
        assert_eq!(
            settings.validate().unwrap(),
            MazeConfig::new(9, 7, Coord::new(0, 3), Coord::new(8, 3))
        );
    }

    #[test]
    fn test_settings_bad_json() {
        assert!(matches!(
            MazeSettings::from_json("{\"height\": \"tall\"}"),
            Err(MazeError::Settings(_))
        ));
    }
}
