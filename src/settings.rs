use clap::Parser;
use simplelog::LevelFilter;
use std::io;
use std::path::PathBuf;

use crate::grid::{Direction, GridGeometry};
use crate::snake::Heading;

pub const MIN_BOARD_SIDE: u16 = 3;
pub const MAX_BOARD_SIDE: u16 = 1000;
pub const MAX_CELL_WIDTH: u16 = 4;
pub const MAX_SPEED: u32 = 60;

/// Snake on a wrapping board: red food grows it, brown food shrinks it.
#[derive(Parser, Debug, Clone)]
#[command(name = "snekwrap", version)]
pub struct Settings {
    /// Board width in cells
    #[arg(long, default_value_t = 32)]
    pub width: u16,

    /// Board height in cells
    #[arg(long, default_value_t = 24)]
    pub height: u16,

    /// Terminal columns per cell
    #[arg(long, default_value_t = 2)]
    pub cell_width: u16,

    /// Ticks per second
    #[arg(long, default_value_t = 7)]
    pub speed: u32,

    /// Initial heading; random when omitted
    #[arg(long, value_enum)]
    pub heading: Option<Direction>,

    /// Seed for food placement and headings
    #[arg(long)]
    pub seed: Option<u64>,

    /// File the log is written to
    #[arg(long, default_value = "snake.log")]
    pub log_file: PathBuf,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl Settings {
    pub fn validate(&self) -> io::Result<()> {
        let sides = MIN_BOARD_SIDE..=MAX_BOARD_SIDE;
        if !sides.contains(&self.width) || !sides.contains(&self.height) {
            return Err(invalid(format!(
                "board sides must be between {MIN_BOARD_SIDE} and {MAX_BOARD_SIDE} cells, got {}x{}",
                self.width, self.height
            )));
        }
        if !(1..=MAX_CELL_WIDTH).contains(&self.cell_width) {
            return Err(invalid(format!(
                "cell width must be between 1 and {MAX_CELL_WIDTH}, got {}",
                self.cell_width
            )));
        }
        if !(1..=MAX_SPEED).contains(&self.speed) {
            return Err(invalid(format!(
                "speed must be between 1 and {MAX_SPEED} ticks per second, got {}",
                self.speed
            )));
        }
        Ok(())
    }

    pub fn geometry(&self) -> GridGeometry {
        GridGeometry::new(self.width, self.height, self.cell_width)
    }

    pub fn heading(&self) -> Heading {
        self.heading.map_or(Heading::Random, Heading::Fixed)
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}

fn invalid(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}
