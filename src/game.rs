use std::collections::HashSet;
use std::io;
use std::ops::ControlFlow;

use log::{debug, info};
use rand::Rng;

use crate::food::{Food, FoodKind};
use crate::grid::{occupied_set, Cell, Direction, Entity, GridGeometry};
use crate::snake::{Heading, Shrink, Snake};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    Turn(Direction),
}

/// What a cell should look like on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Paint {
    SnakeHead,
    SnakeBody,
    Food(FoodKind),
}

/// Status shown next to the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hud {
    pub length: usize,
    pub target_length: usize,
}

pub trait Renderer {
    /// Wipes every cell back to the background.
    fn clear(&mut self) -> io::Result<()>;

    fn draw_cell(&mut self, cell: Cell, paint: Paint) -> io::Result<()>;

    fn erase_cell(&mut self, cell: Cell) -> io::Result<()>;

    fn present(&mut self, hud: &Hud) -> io::Result<()>;
}

pub trait InputSource {
    /// Returns whatever arrived since the last poll without blocking.
    fn poll_events(&mut self) -> io::Result<Vec<InputEvent>>;
}

pub trait Clock {
    /// Blocks until the next tick boundary.
    fn wait_for_tick(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult {
    Ongoing,
    Collision,
    Ate(FoodKind),
}

pub struct Game<R: Rng> {
    geometry: GridGeometry,
    snake: Snake,
    apple: Food,
    bad_food: Food,
    rng: R,
    needs_clear: bool,
}

impl<R: Rng> Game<R> {
    pub fn new(geometry: GridGeometry, heading: Heading, mut rng: R) -> io::Result<Self> {
        let snake = Snake::new(geometry, heading, &mut rng);
        let apple = Food::spawn(FoodKind::Good, geometry, &occupied_set(&[&snake]), &mut rng)
            .ok_or_else(board_too_small)?;
        let bad_food = Food::spawn(
            FoodKind::Bad,
            geometry,
            &occupied_set(&[&snake, &apple]),
            &mut rng,
        )
        .ok_or_else(board_too_small)?;

        info!(
            "New game on {}x{} board, snake at {:?} heading {:?}",
            geometry.width,
            geometry.height,
            snake.head(),
            snake.direction()
        );

        Ok(Game {
            geometry,
            snake,
            apple,
            bad_food,
            rng,
            needs_clear: true,
        })
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn apple(&self) -> &Food {
        &self.apple
    }

    pub fn bad_food(&self) -> &Food {
        &self.bad_food
    }

    pub fn occupied_cells(&self) -> HashSet<Cell> {
        occupied_set(&[&self.snake, &self.apple, &self.bad_food])
    }

    pub fn handle_input(&mut self, event: InputEvent) -> ControlFlow<()> {
        match event {
            InputEvent::Quit => ControlFlow::Break(()),
            InputEvent::Turn(direction) => {
                if self.snake.set_next_direction(direction) {
                    debug!("Queued turn to {:?}", self.snake.next_direction());
                } else {
                    debug!("Ignored reversal to {:?}", direction);
                }
                ControlFlow::Continue(())
            }
        }
    }

    /// Advances the board by one tick.
    pub fn step(&mut self) -> StepResult {
        self.snake.apply_pending_direction();
        self.snake.slither();

        if self.snake.hit_itself() {
            debug!(
                "Snake ran into itself at {:?} with length {}",
                self.snake.head(),
                self.snake.len()
            );
            self.snake.reset(&mut self.rng);
            self.relocate(FoodKind::Good);
            self.relocate(FoodKind::Bad);
            self.needs_clear = true;
            return StepResult::Collision;
        }

        let head = self.snake.head();

        if self.apple.occupies(head) {
            self.snake.grow();
            self.relocate(FoodKind::Good);
            return StepResult::Ate(FoodKind::Good);
        }

        if self.bad_food.occupies(head) {
            if self.snake.shrink(&mut self.rng) == Shrink::Reset {
                info!("Ate bad food at minimum length, snake reset");
                self.relocate(FoodKind::Good);
            }
            self.relocate(FoodKind::Bad);
            self.needs_clear = true;
            return StepResult::Ate(FoodKind::Bad);
        }

        StepResult::Ongoing
    }

    fn relocate(&mut self, kind: FoodKind) {
        let occupied = self.occupied_cells();
        let food = match kind {
            FoodKind::Good => &mut self.apple,
            FoodKind::Bad => &mut self.bad_food,
        };
        food.randomize_position(self.geometry, &occupied, &mut self.rng);
    }

    pub fn draw(&mut self, renderer: &mut impl Renderer) -> io::Result<()> {
        if self.needs_clear {
            renderer.clear()?;
            self.needs_clear = false;
        } else if let Some(vacated) = self.snake.last_vacated() {
            renderer.erase_cell(vacated)?;
        }

        for food in [&self.apple, &self.bad_food] {
            renderer.draw_cell(food.position(), Paint::Food(food.kind()))?;
        }

        for cell in self.snake.body().iter().skip(1) {
            renderer.draw_cell(*cell, Paint::SnakeBody)?;
        }
        renderer.draw_cell(self.snake.head(), Paint::SnakeHead)?;

        renderer.present(&Hud {
            length: self.snake.len(),
            target_length: self.snake.target_length(),
        })
    }

    /// Runs one full tick after the clock has fired: input, update, draw.
    pub fn tick(
        &mut self,
        input: &mut impl InputSource,
        renderer: &mut impl Renderer,
    ) -> io::Result<ControlFlow<()>> {
        for event in input.poll_events()? {
            if self.handle_input(event).is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }

        match self.step() {
            StepResult::Collision => info!("Snake ran into itself, board reset"),
            StepResult::Ate(kind) => debug!(
                "Ate {:?} food, target length {}",
                kind,
                self.snake.target_length()
            ),
            StepResult::Ongoing => {}
        }

        self.draw(renderer)?;
        Ok(ControlFlow::Continue(()))
    }
}

/// Drives the game at the clock's pace until the player quits.
pub fn run<R: Rng>(
    game: &mut Game<R>,
    input: &mut impl InputSource,
    clock: &mut impl Clock,
    renderer: &mut impl Renderer,
) -> io::Result<()> {
    game.draw(renderer)?;

    loop {
        clock.wait_for_tick();
        if game.tick(input, renderer)?.is_break() {
            info!(
                "Quit requested, final length {}, food at {:?} and {:?}",
                game.snake().len(),
                game.apple().position(),
                game.bad_food().position()
            );
            return Ok(());
        }
    }
}

fn board_too_small() -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        "board is too small to place food",
    )
}
