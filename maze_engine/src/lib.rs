// lib.rs - Library exports for maze-engine
// Dual-origin maze synthesis, weighted path search and terminal painting

pub mod carve;
pub mod config;
pub mod error_handling;
pub mod painter;
pub mod pathfinder;
pub mod prune;
pub mod random;
pub mod sink;
pub mod synthesizer;
pub mod task_group;
pub mod types;

// Re-export commonly used types
pub use carve::{CarveAlgorithm, Carver, Terrain};
pub use config::{Delays, IntRange, MazeSettings};
pub use error_handling::{MazeError, Result};
pub use painter::{DrawState, TerminalPainter};
pub use pathfinder::{PathAlgorithm, PathFinder};
pub use random::{Entropy, RandomSource, SourceFactory};
pub use synthesizer::{SynthesisPhase, Synthesizer};
pub use types::{CellPaintEvent, CellType, Coord, Grid, Maze, MazeConfig};
