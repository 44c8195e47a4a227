mod food;
mod game;
mod grid;
mod settings;
mod snake;
mod term;

use clap::Parser;
use crossterm::terminal;
use log::{error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use simplelog::{Config, WriteLogger};
use std::fs::File;
use std::io;

use game::Game;
use settings::Settings;
use term::{CrosstermInput, FixedRateClock, TerminalRenderer};

fn main() -> Result<(), io::Error> {
    let settings = Settings::parse();
    settings.validate()?;

    // Set up logging before anything else
    WriteLogger::init(
        settings.log_level(),
        Config::default(),
        File::create(&settings.log_file)?,
    )
    .map_err(io::Error::other)?;

    let seed = settings.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!("Starting snekwrap with {:?}, seed {}", settings, seed);

    let geometry = settings.geometry();
    let (needed_cols, needed_rows) = term::required_size(geometry);
    let (cols, rows) = terminal::size()?;
    if cols < needed_cols || rows < needed_rows {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "terminal is {cols}x{rows} but the board needs {needed_cols}x{needed_rows}; \
                 try a smaller --width/--height"
            ),
        ));
    }

    let mut game = Game::new(geometry, settings.heading(), StdRng::seed_from_u64(seed))?;

    let mut renderer = TerminalRenderer::new(term::setup_terminal()?, geometry);
    let mut input = CrosstermInput;
    let mut clock = FixedRateClock::new(settings.speed);
    info!("Ticking every {:?}", clock.interval());

    let result = game::run(&mut game, &mut input, &mut clock, &mut renderer);

    // Restore the terminal even if the loop failed
    term::restore_terminal(renderer.terminal_mut())?;

    if let Err(e) = &result {
        error!("Game loop failed: {}", e);
    }
    result
}
