// main.rs - Terminal front end: generate a dual-origin maze, animate it, then animate the search

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::ExecutableCommand;
use log::{info, warn};
use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

use maze_engine::painter::terminal::PaintOutcome;
use maze_engine::pathfinder::path_cost;
use maze_engine::{
    CarveAlgorithm, Coord, Maze, MazeConfig, MazeError, MazeSettings, PathAlgorithm, Synthesizer,
    TerminalPainter,
};

const NO_PATH_MESSAGE: &str = "There is no way between start and end points";

/// CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Settings JSON file; flags given here override its values
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Maze height in cells
    #[arg(short = 'H', long)]
    pub height: Option<usize>,

    /// Maze width in cells
    #[arg(short = 'W', long)]
    pub width: Option<usize>,

    /// Start row (default: top-left corner)
    #[arg(long)]
    pub start_row: Option<usize>,

    /// Start column
    #[arg(long)]
    pub start_col: Option<usize>,

    /// End row (default: bottom-right corner)
    #[arg(long)]
    pub end_row: Option<usize>,

    /// End column
    #[arg(long)]
    pub end_col: Option<usize>,

    /// Carving strategy
    #[arg(long, value_enum)]
    pub carve: Option<CarveAlgorithm>,

    /// Path search strategy
    #[arg(long, value_enum)]
    pub path: Option<PathAlgorithm>,

    /// Carve weighted terrain: cheap money, costly sand and river
    #[arg(long)]
    pub terrain: bool,

    /// Deterministic seed instead of OS entropy
    #[arg(long)]
    pub seed: Option<u64>,

    /// Skip the animation and print the finished maze and path once
    #[arg(long)]
    pub no_animation: bool,
}

impl Args {
    /// Layer the flags that were given over `settings`.
    fn apply(&self, settings: &mut MazeSettings) {
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(width) = self.width {
            settings.width = width;
        }

        let bottom_right = Coord::new(
            settings.height.saturating_sub(1),
            settings.width.saturating_sub(1),
        );
        settings.start = override_coord(
            settings.start,
            Coord::new(0, 0),
            self.start_row,
            self.start_col,
        );
        settings.end = override_coord(settings.end, bottom_right, self.end_row, self.end_col);

        if let Some(carve) = self.carve {
            settings.carve = carve;
        }
        if let Some(path) = self.path {
            settings.path = path;
        }
        settings.terrain |= self.terrain;
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
    }
}

fn override_coord(
    current: Option<Coord>,
    fallback: Coord,
    row: Option<usize>,
    col: Option<usize>,
) -> Option<Coord> {
    if row.is_none() && col.is_none() {
        return current;
    }
    let base = current.unwrap_or(fallback);
    Some(Coord::new(row.unwrap_or(base.row), col.unwrap_or(base.col)))
}

/// Settings file (if any) with command-line overrides applied.
async fn load_settings(args: &Args) -> Result<MazeSettings> {
    let mut settings = match &args.settings {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            MazeSettings::from_json(&json)
                .with_context(|| format!("Failed to parse settings JSON from {}", path.display()))?
        }
        None => MazeSettings::default(),
    };
    args.apply(&mut settings);
    Ok(settings)
}

/// Flip the returned flag to true on Ctrl-C.
fn cancel_on_ctrl_c() -> watch::Receiver<bool> {
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(true);
        }
        // keep the sender alive so painters keep watching
        cancel_tx.closed().await;
    });
    cancel_rx
}

/// Run the synthesizer while `painter` animates its events. On failure the
/// painter task is stopped before the error is returned.
async fn generate_painted<W>(
    synthesizer: &Synthesizer,
    config: MazeConfig,
    mut painter: TerminalPainter<W>,
    mut cancel: watch::Receiver<bool>,
) -> Result<(Maze, TerminalPainter<W>, PaintOutcome)>
where
    W: Write + Send + 'static,
{
    let (events_tx, mut events_rx) = mpsc::channel(1);
    let paint_task = tokio::spawn(async move {
        let outcome = painter.paint_generation(&mut events_rx, &mut cancel).await?;
        Ok::<_, MazeError>((painter, outcome))
    });

    let maze = match synthesizer.generate(config, events_tx).await {
        Ok(maze) => maze,
        Err(err) => {
            paint_task.abort();
            if let Err(join) = paint_task.await {
                if join.is_panic() {
                    warn!("Painter task panicked while stopping: {join}");
                }
            }
            return Err(anyhow::Error::new(err).context("Maze generation failed"));
        }
    };
    let (painter, outcome) = paint_task.await.context("Painter task panicked")??;
    Ok((maze, painter, outcome))
}

async fn run_animated(settings: &MazeSettings, config: MazeConfig) -> Result<()> {
    let synthesizer = Synthesizer::from_settings(settings);
    let mut cancel = cancel_on_ctrl_c();

    let mut painter = TerminalPainter::new(io::stdout(), config);
    painter.begin()?;

    let (maze, mut painter, outcome) =
        generate_painted(&synthesizer, config, painter, cancel.clone()).await?;
    if outcome == PaintOutcome::Cancelled {
        painter.finish(Some("Cancelled"))?;
        return Ok(());
    }

    let finder = settings.path.finder();
    info!("Searching with {}", finder.name());
    let (frames_tx, mut frames_rx) = mpsc::channel::<Vec<Coord>>(1);
    let grid = maze.grid.clone();
    let search = tokio::task::spawn_blocking(move || {
        let mut forward = |frame: &[Coord]| {
            // painter gone: keep searching without an audience
            let _ = frames_tx.blocking_send(frame.to_vec());
        };
        finder.search(&grid, config.start, config.end, Some(&mut forward))
    });

    let outcome = painter
        .paint_search(&mut frames_rx, &mut cancel, settings.delays.search_frame())
        .await?;
    // unblocks the search if painting stopped early
    drop(frames_rx);
    let path = search.await.context("Path search task panicked")?;

    match (outcome, path) {
        (PaintOutcome::Cancelled, _) => painter.finish(Some("Cancelled"))?,
        (_, Some(path)) => {
            let cost = path_cost(&maze.grid, &path).unwrap_or_default();
            painter.finish(Some(format!("Path cost: {cost} ({} cells)", path.len()).as_str()))?;
        }
        (_, None) => painter.finish(Some(NO_PATH_MESSAGE))?,
    }
    Ok(())
}

async fn run_headless(settings: &MazeSettings, config: MazeConfig) -> Result<()> {
    let synthesizer = Synthesizer::from_settings(settings);
    let (events_tx, events_rx) = mpsc::channel(1);
    drop(events_rx);

    let maze = synthesizer
        .generate(config, events_tx)
        .await
        .context("Maze generation failed")?;

    let finder = settings.path.finder();
    let grid = maze.grid.clone();
    let path = tokio::task::spawn_blocking(move || {
        finder.shortest_path(&grid, config.start, config.end)
    })
    .await
    .context("Path search task panicked")?;

    let mut painter = TerminalPainter::new(io::stdout(), config);
    painter.begin()?;
    painter.paint_maze(&maze.grid)?;
    match path {
        Some(path) => {
            painter.paint_path(&path, Duration::ZERO).await?;
            let cost = path_cost(&maze.grid, &path).unwrap_or_default();
            painter.finish(Some(format!("Path cost: {cost} ({} cells)", path.len()).as_str()))?;
        }
        None => painter.finish(Some(NO_PATH_MESSAGE))?,
    }
    Ok(())
}

fn restore_cursor(stdout: &mut Stdout) {
    if let Err(err) = stdout.execute(Show) {
        warn!("Failed to restore cursor: {err}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    info!("Starting with {args:?}");

    let settings = load_settings(&args).await?;
    let config = settings.validate().context("Invalid maze settings")?;
    info!(
        "{}x{} maze from {} to {}, carve={}, path={:?}, terrain={}",
        config.height,
        config.width,
        config.start,
        config.end,
        settings.carve.name(),
        settings.path,
        settings.terrain
    );

    if args.no_animation {
        return run_headless(&settings, config).await;
    }

    let mut stdout = io::stdout();
    stdout.execute(Hide)?;
    let result = run_animated(&settings, config).await;
    restore_cursor(&mut stdout);
    result
}
