use std::collections::HashSet;

use log::warn;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::grid::{Cell, Entity, GridGeometry};

/// Sampling attempts per spawnable cell before falling back to a full scan.
const SAMPLES_PER_CELL: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FoodKind {
    /// Grows the snake by one.
    Good,
    /// Shrinks the snake by one, or resets it at minimum length.
    Bad,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Food {
    kind: FoodKind,
    position: Cell,
}

impl Food {
    /// Places a new food item on a free cell, or `None` if the board is full.
    pub fn spawn(
        kind: FoodKind,
        geometry: GridGeometry,
        occupied: &HashSet<Cell>,
        rng: &mut impl Rng,
    ) -> Option<Self> {
        random_free_cell(geometry, occupied, rng).map(|position| Food { kind, position })
    }

    pub fn kind(&self) -> FoodKind {
        self.kind
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    /// Moves to a random free cell. Stays put and returns `false` when no
    /// cell is free.
    pub fn randomize_position(
        &mut self,
        geometry: GridGeometry,
        occupied: &HashSet<Cell>,
        rng: &mut impl Rng,
    ) -> bool {
        match random_free_cell(geometry, occupied, rng) {
            Some(position) => {
                self.position = position;
                true
            }
            None => {
                warn!("No free cell for {:?} food, leaving it at {:?}", self.kind, self.position);
                false
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn at(kind: FoodKind, position: Cell) -> Self {
        Food { kind, position }
    }
}

impl Entity for Food {
    fn mark_occupied(&self, occupied: &mut HashSet<Cell>) {
        occupied.insert(self.position);
    }

    fn occupies(&self, cell: Cell) -> bool {
        self.position == cell
    }
}

/// Uniformly samples the spawn range until a cell outside `occupied` turns up.
///
/// Sampling gives up after a bounded number of misses and picks among the
/// remaining free cells directly, so a crowded board still terminates.
pub fn random_free_cell(
    geometry: GridGeometry,
    occupied: &HashSet<Cell>,
    rng: &mut impl Rng,
) -> Option<Cell> {
    if geometry.spawn_area() == 0 {
        return None;
    }

    for _ in 0..geometry.spawn_area() * SAMPLES_PER_CELL {
        let cell = Cell {
            col: rng.gen_range(geometry.spawn_cols()),
            row: rng.gen_range(geometry.spawn_rows()),
        };
        if !occupied.contains(&cell) {
            return Some(cell);
        }
    }

    let free: Vec<Cell> = geometry
        .spawn_cells()
        .filter(|cell| !occupied.contains(cell))
        .collect();
    free.choose(rng).copied()
}
