// synthesizer.rs - Dual-origin maze synthesis: two concurrent carve+prune pipelines, fan-in, merge

use futures::future::join;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};

use crate::carve::Carver;
use crate::config::{Delays, MazeSettings};
use crate::error_handling::{MazeError, Result, StageContext};
use crate::prune::prune;
use crate::random::{RandomSource, SourceFactory};
use crate::sink::PaintSink;
use crate::task_group::TaskGroup;
use crate::types::{
    CellPaint, CellPaintEvent, CellType, Coord, Grid, Maze, MazeConfig, END_ORIGIN, MERGE_ORIGIN,
    START_ORIGIN,
};

/// Per-origin streams hold at most one event, so carving runs in lockstep
/// with whoever consumes the fan-in.
const ORIGIN_CHANNEL_CAPACITY: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisPhase {
    Idle,
    /// Both origins carving and pruning concurrently.
    Carving,
    Merging,
    Done,
    Failed,
}

pub struct Synthesizer {
    carver: Carver,
    delays: Delays,
    entropy: Arc<dyn SourceFactory>,
    phase: watch::Sender<SynthesisPhase>,
}

impl Synthesizer {
    pub fn new(carver: Carver, delays: Delays, entropy: Arc<dyn SourceFactory>) -> Self {
        let (phase, _) = watch::channel(SynthesisPhase::Idle);
        Self {
            carver,
            delays,
            entropy,
            phase,
        }
    }

    pub fn from_settings(settings: &MazeSettings) -> Self {
        let carver = Carver::new(settings.carve, settings.terrain(), settings.delays.carve());
        Self::new(carver, settings.delays, Arc::new(settings.entropy()))
    }

    pub fn phase(&self) -> SynthesisPhase {
        *self.phase.borrow()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<SynthesisPhase> {
        self.phase.subscribe()
    }

    /// Grow sub-mazes from `config.start` and `config.end` concurrently,
    /// stream their events into `out` tagged with origin 1 and 2, then merge
    /// them into one grid, streaming origin-0 events. `out` is closed when
    /// this returns, successfully or not.
    pub async fn generate(
        &self,
        config: MazeConfig,
        out: mpsc::Sender<CellPaintEvent>,
    ) -> Result<Maze> {
        log::info!(
            "generating {}x{} maze with {} from {} and {}",
            config.height,
            config.width,
            self.carver.algorithm.name(),
            config.start,
            config.end
        );
        self.phase.send_replace(SynthesisPhase::Carving);

        let result = self.run(config, PaintSink::new(out)).await;
        self.phase.send_replace(match result {
            Ok(_) => SynthesisPhase::Done,
            Err(_) => SynthesisPhase::Failed,
        });
        result
    }

    async fn run(&self, config: MazeConfig, out: PaintSink<CellPaintEvent>) -> Result<Maze> {
        let (start_tx, start_rx) = mpsc::channel(ORIGIN_CHANNEL_CAPACITY);
        let (end_tx, end_rx) = mpsc::channel(ORIGIN_CHANNEL_CAPACITY);
        let (start_handoff, start_grid) = oneshot::channel();
        let (end_handoff, end_grid) = oneshot::channel();

        let group = TaskGroup::new();
        group.spawn(
            "carve start",
            grow(
                self.carver,
                config,
                config.start,
                self.entropy.source(START_ORIGIN.into()),
                PaintSink::new(start_tx),
                self.delays.prune(),
                start_handoff,
            ),
        );
        group.spawn(
            "carve end",
            grow(
                self.carver,
                config,
                config.end,
                self.entropy.source(END_ORIGIN.into()),
                PaintSink::new(end_tx),
                self.delays.prune(),
                end_handoff,
            ),
        );
        let fan_out = out.clone();
        group.spawn("fan-in", async move {
            fan_in(fan_out, start_rx, end_rx).await;
            Ok(())
        });
        group.wait().await?;

        let start_grid = start_grid
            .await
            .map_err(|_| MazeError::TaskJoin("start grid was never handed over".into()))?;
        let end_grid = end_grid
            .await
            .map_err(|_| MazeError::TaskJoin("end grid was never handed over".into()))?;

        self.phase.send_replace(SynthesisPhase::Merging);
        let mut rng = self.entropy.source(MERGE_ORIGIN.into());
        let grid = merge_grids(&start_grid, &end_grid, rng.as_mut(), &out, self.delays.merge())
            .await
            .stage("merge")?;

        log::info!(
            "merged maze has {} open cells ({} from start, {} from end)",
            grid.traversable_count(),
            start_grid.traversable_count(),
            end_grid.traversable_count()
        );
        Ok(Maze::new(config, grid))
    }
}

/// Carve and prune one origin's sub-maze, then hand the grid over. The
/// origin's stream closes when `sink` is dropped on return.
async fn grow(
    carver: Carver,
    config: MazeConfig,
    origin: Coord,
    mut rng: Box<dyn RandomSource>,
    sink: PaintSink<CellPaint>,
    prune_delay: Duration,
    handoff: oneshot::Sender<Grid>,
) -> Result<()> {
    let stage = if origin == config.start {
        "carve start"
    } else {
        "carve end"
    };
    log::debug!("{stage}: growing from {origin}");

    let grid = carver
        .carve(config.height, config.width, origin, rng.as_mut(), &sink)
        .await
        .stage(stage)?;
    let grid = prune(grid, origin, &sink, prune_delay).await;

    // the receiver only disappears when generation itself was dropped
    let _ = handoff.send(grid);
    log::debug!("{stage}: done");
    Ok(())
}

/// Forward both origin streams into `out` until both are exhausted.
async fn fan_in(
    out: PaintSink<CellPaintEvent>,
    start: mpsc::Receiver<CellPaint>,
    end: mpsc::Receiver<CellPaint>,
) {
    let (from_start, from_end) = join(
        forward(&out, START_ORIGIN, start),
        forward(&out, END_ORIGIN, end),
    )
    .await;
    log::debug!("fan-in forwarded {from_start} start and {from_end} end events");
}

async fn forward(
    out: &PaintSink<CellPaintEvent>,
    origin: u8,
    mut rx: mpsc::Receiver<CellPaint>,
) -> usize {
    let mut forwarded = 0;
    while let Some(paint) = rx.recv().await {
        out.send(paint.tagged(origin)).await;
        forwarded += 1;
    }
    forwarded
}

/// Cell-by-cell union of two sub-mazes. A cell open in only one grid keeps
/// that value, a cell open in both picks one side at random. Every cell is
/// emitted as an origin-0 event in row-major order.
pub async fn merge_grids(
    first: &Grid,
    second: &Grid,
    rng: &mut dyn RandomSource,
    sink: &PaintSink<CellPaintEvent>,
    delay: Duration,
) -> Result<Grid> {
    debug_assert_eq!(
        (first.height(), first.width()),
        (second.height(), second.width())
    );

    let mut merged = Grid::new(first.height(), first.width());
    for coord in first.coords() {
        let cell = match (first[coord], second[coord]) {
            (CellType::Wall, other) => other,
            (own, CellType::Wall) => own,
            (own, other) => {
                if rng.coin()? {
                    own
                } else {
                    other
                }
            }
        };
        merged[coord] = cell;
        sink.send(CellPaint::new(coord, cell, delay).tagged(MERGE_ORIGIN))
            .await;
    }

    Ok(merged)
}
