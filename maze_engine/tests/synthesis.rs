// synthesis.rs - End-to-end maze generation checked against a replay of its paint stream

use std::sync::Arc;
use tokio::sync::mpsc;

use maze_engine::config::Delays;
use maze_engine::{
    CarveAlgorithm, CellPaintEvent, CellType, Carver, Coord, DrawState, Entropy, Maze, MazeConfig,
    MazeError, PathAlgorithm, RandomSource, Result, SourceFactory, Synthesizer, SynthesisPhase,
    Terrain,
};

fn scenarios() -> Vec<MazeConfig> {
    vec![
        MazeConfig::new(5, 5, Coord::new(0, 0), Coord::new(0, 4)),
        MazeConfig::new(10, 10, Coord::new(0, 0), Coord::new(9, 9)),
        MazeConfig::new(7, 7, Coord::new(0, 3), Coord::new(6, 3)),
        MazeConfig::new(6, 8, Coord::new(0, 7), Coord::new(5, 0)),
        MazeConfig::new(8, 8, Coord::new(7, 0), Coord::new(7, 7)),
        MazeConfig::new(12, 12, Coord::new(0, 6), Coord::new(11, 11)),
        MazeConfig::new(15, 10, Coord::new(14, 0), Coord::new(14, 9)),
    ]
}

fn synthesizer(algorithm: CarveAlgorithm, terrain: Terrain, entropy: Arc<dyn SourceFactory>) -> Synthesizer {
    Synthesizer::new(Carver::new(algorithm, terrain, Delays::none().carve()), Delays::none(), entropy)
}

/// Generate while a concurrent consumer replays every event into a DrawState.
async fn generate_and_replay(synth: &Synthesizer, config: MazeConfig) -> (Result<Maze>, DrawState, Vec<CellPaintEvent>) {
    let (tx, mut rx) = mpsc::channel(1);
    let painter = tokio::spawn(async move {
        let mut state = DrawState::new(config.height, config.width);
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            state.apply(&event);
            events.push(event);
        }
        (state, events)
    });

    let result = synth.generate(config, tx).await;
    let (state, events) = painter.await.unwrap();
    (result, state, events)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn replayed_stream_matches_generated_maze() {
    for (i, config) in scenarios().into_iter().enumerate() {
        for algorithm in [CarveAlgorithm::Backtrack, CarveAlgorithm::Prim] {
            let synth = synthesizer(algorithm, Terrain::Weighted, Arc::new(Entropy::Seeded(i as u64)));
            let (result, state, _) = generate_and_replay(&synth, config).await;
            let maze = result.unwrap();

            assert_eq!(state.to_grid(), maze.grid, "scenario {} with {:?}", i + 1, algorithm);
            assert_eq!(maze.grid[config.start], CellType::Passage);
            assert_eq!(maze.grid[config.end], CellType::Passage);
            assert_eq!(synth.phase(), SynthesisPhase::Done);
        }
    }
}

#[tokio::test]
async fn os_entropy_generates_a_maze() {
    let config = MazeConfig::new(9, 9, Coord::new(0, 4), Coord::new(8, 4));
    let synth = synthesizer(CarveAlgorithm::Backtrack, Terrain::Plain, Arc::new(Entropy::Os));
    let (result, state, _) = generate_and_replay(&synth, config).await;
    let maze = result.unwrap();

    assert_eq!(state.to_grid(), maze.grid);
    assert!(maze
        .grid
        .coords()
        .all(|c| matches!(maze.grid[c], CellType::Wall | CellType::Passage)));
}

#[tokio::test]
async fn each_origin_stream_keeps_its_own_order() {
    let config = MazeConfig::new(10, 10, Coord::new(0, 0), Coord::new(9, 9));
    let synth = synthesizer(CarveAlgorithm::Prim, Terrain::Plain, Arc::new(Entropy::Seeded(77)));
    let (result, _, events) = generate_and_replay(&synth, config).await;
    result.unwrap();

    for origin in [1u8, 2] {
        let stream: Vec<&CellPaintEvent> = events.iter().filter(|e| e.origin == origin).collect();
        // carving only opens cells and pruning only closes them, so walls come last
        let first_wall = stream
            .iter()
            .position(|e| e.cell == CellType::Wall)
            .unwrap_or(stream.len());
        assert!(stream[first_wall..].iter().all(|e| e.cell == CellType::Wall));
        assert!(stream[..first_wall].iter().all(|e| e.cell != CellType::Wall));
    }
}

/// A merged maze either connects the endpoints or the search says so.
#[tokio::test]
async fn search_runs_on_generated_mazes() {
    for seed in 0..6 {
        let config = MazeConfig::new(11, 13, Coord::new(0, 0), Coord::new(10, 12));
        let synth = synthesizer(CarveAlgorithm::Backtrack, Terrain::Weighted, Arc::new(Entropy::Seeded(seed)));
        let (result, _, _) = generate_and_replay(&synth, config).await;
        let maze = result.unwrap();

        let dijkstra = PathAlgorithm::Dijkstra.finder().shortest_path(&maze.grid, config.start, config.end);
        let astar = PathAlgorithm::AStar.finder().shortest_path(&maze.grid, config.start, config.end);
        assert_eq!(dijkstra.is_some(), astar.is_some());

        if let (Some(d), Some(a)) = (dijkstra, astar) {
            let cost = |p: &[Coord]| maze_engine::pathfinder::path_cost(&maze.grid, p);
            assert_eq!(cost(&d), cost(&a));
            assert!(maze_engine::pathfinder::is_valid_path(&maze.grid, &d, config.start, config.end));
        }
    }
}

struct Drained;

impl RandomSource for Drained {
    fn index(&mut self, _upper: usize) -> Result<usize> {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "entropy unavailable");
        Err(MazeError::from(rand::Error::new(io)))
    }
}

struct NoEntropy;

impl SourceFactory for NoEntropy {
    fn source(&self, _stream: u64) -> Box<dyn RandomSource> {
        Box::new(Drained)
    }
}

#[tokio::test]
async fn entropy_failure_aborts_with_stage() {
    let config = MazeConfig::new(6, 6, Coord::new(0, 0), Coord::new(5, 5));
    let synth = synthesizer(CarveAlgorithm::Prim, Terrain::Plain, Arc::new(NoEntropy));
    let (result, _, events) = generate_and_replay(&synth, config).await;

    let err = result.unwrap_err();
    assert!(matches!(err, MazeError::Stage { stage: "carve start" | "carve end", .. }));
    assert!(matches!(err.root(), MazeError::RandomSource(_)));
    assert!(events.iter().all(|e| e.origin != 0));
    assert_eq!(synth.phase(), SynthesisPhase::Failed);
}
