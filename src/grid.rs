use std::collections::HashSet;
use std::ops::Range;

/// One square of the board, addressed by column and row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub col: u16,
    pub row: u16,
}

impl Cell {
    pub fn new(col: u16, row: u16) -> Self {
        Cell { col, row }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellDelta {
    pub col: i32,
    pub row: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(&self, other: Direction) -> bool {
        self.opposite() == other
    }
}

impl From<Direction> for CellDelta {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Up => CellDelta { col: 0, row: -1 },
            Direction::Down => CellDelta { col: 0, row: 1 },
            Direction::Left => CellDelta { col: -1, row: 0 },
            Direction::Right => CellDelta { col: 1, row: 0 },
        }
    }
}

/// Board dimensions in cells, plus how many terminal columns one cell spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridGeometry {
    pub width: u16,
    pub height: u16,
    pub cell_size: u16,
}

impl GridGeometry {
    pub fn new(width: u16, height: u16, cell_size: u16) -> Self {
        GridGeometry {
            width,
            height,
            cell_size,
        }
    }

    pub fn center(&self) -> Cell {
        Cell::new(
            self.width.saturating_sub(1) / 2,
            self.height.saturating_sub(1) / 2,
        )
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.col < self.width && cell.row < self.height
    }

    /// Adds `delta` to `cell` on a torus: leaving one edge re-enters at the
    /// opposite edge with the same offset.
    pub fn wrapped_add(&self, cell: Cell, delta: CellDelta) -> Cell {
        let col = (cell.col as i32 + delta.col).rem_euclid(self.width as i32) as u16;
        let row = (cell.row as i32 + delta.row).rem_euclid(self.height as i32) as u16;
        Cell { col, row }
    }

    /// Columns food may be placed in. Column 0 is never used.
    pub fn spawn_cols(&self) -> Range<u16> {
        1..self.width
    }

    /// Rows food may be placed in. Row 0 is never used.
    pub fn spawn_rows(&self) -> Range<u16> {
        1..self.height
    }

    pub fn spawn_area(&self) -> usize {
        self.spawn_cols().len() * self.spawn_rows().len()
    }

    pub fn spawn_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.spawn_rows()
            .flat_map(move |row| self.spawn_cols().map(move |col| Cell { col, row }))
    }

    /// Board size in terminal columns and rows, saturating at `u16::MAX`.
    pub fn screen_size(&self) -> (u16, u16) {
        (self.width.saturating_mul(self.cell_size), self.height)
    }
}

/// Anything that covers cells of the board.
pub trait Entity {
    fn mark_occupied(&self, occupied: &mut HashSet<Cell>);

    fn occupies(&self, cell: Cell) -> bool;
}

pub fn occupied_set(entities: &[&dyn Entity]) -> HashSet<Cell> {
    let mut occupied = HashSet::new();
    for entity in entities {
        entity.mark_occupied(&mut occupied);
    }
    occupied
}
