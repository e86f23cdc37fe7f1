// painter/terminal.rs - Animated maze rendering on an ANSI terminal via crossterm

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use std::io::Write;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

use super::{DrawState, Pacer};
use crate::error_handling::Result;
use crate::types::{CellPaintEvent, CellType, Coord, Grid, MazeConfig};

/// Screen rows above the grid, reserved for endpoint markers.
const TOP_MARGIN: u16 = 1;
/// Screen columns left of the grid, reserved for endpoint markers.
const LEFT_MARGIN: u16 = 2;
/// Every cell is drawn as a two-column block.
const CELL_WIDTH: u16 = 2;

fn cell_color(cell: CellType) -> Color {
    match cell {
        CellType::Wall => Color::Black,
        CellType::Passage => Color::White,
        CellType::Money => Color::Green,
        CellType::Sand => Color::Yellow,
        CellType::River => Color::Blue,
        CellType::Guessing => Color::Grey,
        CellType::Path => Color::Red,
    }
}

/// How a painting phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOutcome {
    /// The stream closed after every event was drawn.
    Completed,
    Cancelled,
}

pub struct TerminalPainter<W: Write> {
    out: W,
    config: MazeConfig,
    state: DrawState,
    pacer: Pacer,
    /// Cells of the search frame currently on screen.
    frame: Vec<Coord>,
}

impl<W: Write> TerminalPainter<W> {
    pub fn new(out: W, config: MazeConfig) -> Self {
        Self {
            out,
            config,
            state: DrawState::new(config.height, config.width),
            pacer: Pacer::default(),
            frame: Vec::new(),
        }
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    /// Clear the screen, draw an all-wall grid and the endpoint markers.
    pub fn begin(&mut self) -> Result<()> {
        self.out.queue(Clear(ClearType::All))?;
        for row in 0..self.config.height {
            for col in 0..self.config.width {
                self.draw_cell(Coord::new(row, col), CellType::Wall)?;
            }
        }
        self.draw_marker(self.config.start, Color::Green, true)?;
        self.draw_marker(self.config.end, Color::Red, false)?;
        self.out.flush()?;
        Ok(())
    }

    /// Draw generation events until the stream closes or `cancel` turns true.
    pub async fn paint_generation(
        &mut self,
        events: &mut mpsc::Receiver<CellPaintEvent>,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<PaintOutcome> {
        let mut watching = true;
        loop {
            if *cancel.borrow() {
                log::warn!("painting cancelled during generation");
                return Ok(PaintOutcome::Cancelled);
            }

            tokio::select! {
                biased;
                changed = cancel.changed(), if watching => {
                    // sender gone: nobody can cancel any more
                    if changed.is_err() {
                        watching = false;
                    }
                }
                event = events.recv() => {
                    let Some(event) = event else {
                        return Ok(PaintOutcome::Completed);
                    };
                    let shown = self.state.apply(&event);
                    self.draw_cell(event.coord, shown)?;
                    self.out.flush()?;
                    self.pacer.pause(event.delay).await;
                }
            }
        }
    }

    /// Animate search frames: each frame replaces the previous one. An empty
    /// frame clears the search front.
    pub async fn paint_search(
        &mut self,
        frames: &mut mpsc::Receiver<Vec<Coord>>,
        cancel: &mut watch::Receiver<bool>,
        frame_delay: Duration,
    ) -> Result<PaintOutcome> {
        let mut watching = true;
        loop {
            if *cancel.borrow() {
                log::warn!("painting cancelled during search");
                return Ok(PaintOutcome::Cancelled);
            }

            tokio::select! {
                biased;
                changed = cancel.changed(), if watching => {
                    if changed.is_err() {
                        watching = false;
                    }
                }
                frame = frames.recv() => {
                    let Some(frame) = frame else {
                        return Ok(PaintOutcome::Completed);
                    };
                    self.show_frame(frame)?;
                    self.pacer.pause(frame_delay).await;
                }
            }
        }
    }

    /// Draw a finished grid in one go, replacing whatever is on screen.
    pub fn paint_maze(&mut self, grid: &Grid) -> Result<()> {
        for coord in grid.coords() {
            self.draw_cell(coord, grid[coord])?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// Mark `path` cell by cell, `delay` apart.
    pub async fn paint_path(&mut self, path: &[Coord], delay: Duration) -> Result<()> {
        for &coord in path {
            self.draw_cell(coord, CellType::Path)?;
            self.out.flush()?;
            self.pacer.pause(delay).await;
        }
        Ok(())
    }

    /// Park the cursor under the grid and print `message` there.
    pub fn finish(&mut self, message: Option<&str>) -> Result<()> {
        let below = TOP_MARGIN + self.config.height as u16 + 1;
        self.out.queue(ResetColor)?;
        self.out.queue(MoveTo(0, below))?;
        if let Some(message) = message {
            self.out.queue(Print(message))?;
            self.out.queue(Print("\r\n"))?;
        }
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn show_frame(&mut self, frame: Vec<Coord>) -> Result<()> {
        let previous = std::mem::replace(&mut self.frame, frame);
        for &coord in &previous {
            self.draw_cell(coord, self.state.resolve(coord))?;
        }
        for i in 0..self.frame.len() {
            self.draw_cell(self.frame[i], CellType::Path)?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn screen_position(coord: Coord) -> (u16, u16) {
        (
            LEFT_MARGIN + coord.col as u16 * CELL_WIDTH,
            TOP_MARGIN + coord.row as u16,
        )
    }

    fn draw_cell(&mut self, coord: Coord, cell: CellType) -> Result<()> {
        let (x, y) = Self::screen_position(coord);
        self.out.queue(MoveTo(x, y))?;
        self.out.queue(SetBackgroundColor(cell_color(cell)))?;
        self.out.queue(Print("  "))?;
        self.out.queue(ResetColor)?;
        Ok(())
    }

    /// Arrow just outside the grid edge the endpoint sits on. The entrance
    /// points into the maze, the exit points out of it.
    fn draw_marker(&mut self, coord: Coord, color: Color, inward: bool) -> Result<()> {
        let (x, y) = Self::screen_position(coord);
        let (x, y) = if coord.row == 0 {
            (x, y - 1)
        } else if coord.row + 1 == self.config.height {
            (x, y + 1)
        } else if coord.col == 0 {
            (x - 1, y)
        } else {
            (x + CELL_WIDTH, y)
        };

        self.out.queue(MoveTo(x, y))?;
        self.out.queue(SetForegroundColor(color))?;
        self.out.queue(Print(marker_arrow(&self.config, coord, inward)))?;
        self.out.queue(ResetColor)?;
        Ok(())
    }
}

fn marker_arrow(config: &MazeConfig, coord: Coord, inward: bool) -> &'static str {
    let (toward, away) = if coord.row == 0 {
        ("vv", "^^")
    } else if coord.row + 1 == config.height {
        ("^^", "vv")
    } else if coord.col == 0 {
        (">", "<")
    } else {
        ("<", ">")
    };
    if inward {
        toward
    } else {
        away
    }
}
