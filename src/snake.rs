use std::collections::{HashSet, VecDeque};

use log::debug;
use rand::Rng;

use crate::grid::{Cell, Direction, Entity, GridGeometry};

/// How the snake picks its direction whenever it (re)starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heading {
    Fixed(Direction),
    Random,
}

impl Heading {
    fn pick(&self, rng: &mut impl Rng) -> Direction {
        match self {
            Heading::Fixed(dir) => *dir,
            Heading::Random => Direction::ALL[rng.gen_range(0..Direction::ALL.len())],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shrink {
    Shrunk,
    Reset,
}

/// The player's snake. `body[0]` is the head.
///
/// Length changes are lazy: `grow` only raises the target length, and the
/// body catches up one cell per `slither`.
#[derive(Debug)]
pub struct Snake {
    geometry: GridGeometry,
    heading: Heading,
    body: VecDeque<Cell>,
    direction: Direction,
    next_direction: Option<Direction>,
    target_length: usize,
    last_vacated: Option<Cell>,
}

impl Snake {
    pub fn new(geometry: GridGeometry, heading: Heading, rng: &mut impl Rng) -> Self {
        let mut snake = Snake {
            geometry,
            heading,
            body: VecDeque::new(),
            direction: Direction::Right,
            next_direction: None,
            target_length: 1,
            last_vacated: None,
        };
        snake.reset(rng);
        snake
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn body(&self) -> &VecDeque<Cell> {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn next_direction(&self) -> Option<Direction> {
        self.next_direction
    }

    pub fn target_length(&self) -> usize {
        self.target_length
    }

    /// Tail cell given up by the most recent `slither`, if any.
    pub fn last_vacated(&self) -> Option<Cell> {
        self.last_vacated
    }

    /// Queues a turn for the next tick. Reversing onto the body is ignored.
    pub fn set_next_direction(&mut self, direction: Direction) -> bool {
        if direction.is_opposite(self.direction) {
            return false;
        }
        self.next_direction = Some(direction);
        true
    }

    pub fn apply_pending_direction(&mut self) {
        if let Some(direction) = self.next_direction.take() {
            self.direction = direction;
        }
    }

    pub fn slither(&mut self) {
        let new_head = self
            .geometry
            .wrapped_add(self.head(), self.direction.into());
        self.body.push_front(new_head);

        self.last_vacated = if self.body.len() > self.target_length {
            self.body.pop_back()
        } else {
            None
        };
    }

    pub fn grow(&mut self) {
        self.target_length += 1;
    }

    pub fn shrink(&mut self, rng: &mut impl Rng) -> Shrink {
        if self.target_length <= 1 {
            self.reset(rng);
            return Shrink::Reset;
        }

        self.target_length -= 1;
        self.body.truncate(self.target_length);
        self.last_vacated = None;
        Shrink::Shrunk
    }

    pub fn reset(&mut self, rng: &mut impl Rng) {
        self.body.clear();
        self.body.push_back(self.geometry.center());
        self.direction = self.heading.pick(rng);
        self.next_direction = None;
        self.target_length = 1;
        self.last_vacated = None;
        debug!("Snake reset at {:?} heading {:?}", self.head(), self.direction);
    }

    pub fn hit_itself(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|cell| *cell == head)
    }

    #[cfg(test)]
    pub(crate) fn with_body(
        geometry: GridGeometry,
        direction: Direction,
        body: Vec<Cell>,
        target_length: usize,
    ) -> Self {
        Snake {
            geometry,
            heading: Heading::Fixed(direction),
            body: body.into(),
            direction,
            next_direction: None,
            target_length,
            last_vacated: None,
        }
    }
}

impl Entity for Snake {
    fn mark_occupied(&self, occupied: &mut HashSet<Cell>) {
        occupied.extend(self.body.iter().copied());
    }

    fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn geometry() -> GridGeometry {
        GridGeometry::new(10, 10, 1)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn east_snake() -> Snake {
        Snake::new(geometry(), Heading::Fixed(Direction::Right), &mut rng())
    }

    #[test]
    fn test_new_snake_at_center() {
        let snake = east_snake();

        assert_eq!(snake.body().len(), 1);
        assert_eq!(snake.head(), Cell::new(4, 4));
        assert_eq!(snake.direction(), Direction::Right);
        assert_eq!(snake.target_length(), 1);
        assert_eq!(snake.next_direction(), None);
        assert_eq!(snake.last_vacated(), None);
    }

    #[test]
    fn test_random_heading_is_a_valid_direction() {
        let mut rng = rng();
        for _ in 0..20 {
            let snake = Snake::new(geometry(), Heading::Random, &mut rng);
            assert!(Direction::ALL.contains(&snake.direction()));
        }
    }

    #[test]
    fn test_set_next_direction_rejects_reversal() {
        for current in Direction::ALL {
            for requested in Direction::ALL {
                let mut snake = Snake::with_body(geometry(), current, vec![Cell::new(4, 4)], 1);
                let accepted = snake.set_next_direction(requested);

                assert_eq!(accepted, requested != current.opposite());
                if accepted {
                    assert_eq!(snake.next_direction(), Some(requested));
                } else {
                    assert_eq!(snake.next_direction(), None);
                }
            }
        }
    }

    #[test]
    fn test_last_accepted_turn_wins() {
        let mut snake = east_snake();

        assert!(snake.set_next_direction(Direction::Up));
        assert!(!snake.set_next_direction(Direction::Left));
        assert!(snake.set_next_direction(Direction::Down));
        assert_eq!(snake.next_direction(), Some(Direction::Down));
    }

    #[test]
    fn test_apply_pending_direction() {
        let mut snake = east_snake();

        // nothing pending keeps the heading
        snake.apply_pending_direction();
        assert_eq!(snake.direction(), Direction::Right);

        snake.set_next_direction(Direction::Up);
        snake.apply_pending_direction();
        assert_eq!(snake.direction(), Direction::Up);
        assert_eq!(snake.next_direction(), None);
    }

    #[test]
    fn test_slither_moves_head_and_drops_tail() {
        let mut snake = Snake::with_body(
            geometry(),
            Direction::Right,
            vec![Cell::new(5, 5), Cell::new(4, 5), Cell::new(3, 5)],
            3,
        );

        snake.slither();

        assert_eq!(
            snake.body().iter().copied().collect::<Vec<_>>(),
            vec![Cell::new(6, 5), Cell::new(5, 5), Cell::new(4, 5)]
        );
        assert_eq!(snake.last_vacated(), Some(Cell::new(3, 5)));
    }

    #[test]
    fn test_slither_wraps_right_edge() {
        let mut snake = Snake::with_body(geometry(), Direction::Right, vec![Cell::new(9, 2)], 1);

        snake.slither();

        assert_eq!(snake.head(), Cell::new(0, 2));
        assert_eq!(snake.last_vacated(), Some(Cell::new(9, 2)));
    }

    #[test]
    fn test_slither_wraps_top_edge() {
        let mut snake = Snake::with_body(geometry(), Direction::Up, vec![Cell::new(3, 0)], 1);

        snake.slither();

        assert_eq!(snake.head(), Cell::new(3, 9));
    }

    #[test]
    fn test_growth_catches_up_lazily() {
        let mut snake = east_snake();

        snake.grow();
        snake.grow();
        assert_eq!(snake.target_length(), 3);
        assert_eq!(snake.len(), 1);

        snake.slither();
        assert_eq!(snake.len(), 2);
        assert_eq!(snake.last_vacated(), None);

        snake.slither();
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.last_vacated(), None);

        // at rest: length holds at target
        for _ in 0..5 {
            snake.slither();
            assert_eq!(snake.len(), snake.target_length());
            assert!(snake.last_vacated().is_some());
        }
    }

    #[test]
    fn test_shrink_drops_tail_immediately() {
        let mut snake = Snake::with_body(
            geometry(),
            Direction::Right,
            vec![Cell::new(5, 5), Cell::new(4, 5), Cell::new(3, 5)],
            3,
        );

        assert_eq!(snake.shrink(&mut rng()), Shrink::Shrunk);
        assert_eq!(snake.target_length(), 2);
        assert_eq!(
            snake.body().iter().copied().collect::<Vec<_>>(),
            vec![Cell::new(5, 5), Cell::new(4, 5)]
        );
    }

    #[test]
    fn test_shrink_while_growth_pending() {
        // ate good food last tick, body has not caught up yet
        let mut snake = Snake::with_body(
            geometry(),
            Direction::Right,
            vec![Cell::new(5, 5), Cell::new(4, 5)],
            3,
        );

        assert_eq!(snake.shrink(&mut rng()), Shrink::Shrunk);
        assert_eq!(snake.target_length(), 2);
        assert_eq!(
            snake.body().iter().copied().collect::<Vec<_>>(),
            vec![Cell::new(5, 5), Cell::new(4, 5)]
        );

        // no further growth: the tail now follows the head
        snake.slither();
        assert_eq!(snake.len(), 2);
        assert_eq!(snake.last_vacated(), Some(Cell::new(4, 5)));
    }

    #[test]
    fn test_shrink_at_length_one_resets() {
        let mut snake = Snake::with_body(geometry(), Direction::Up, vec![Cell::new(1, 1)], 1);

        assert_eq!(snake.shrink(&mut rng()), Shrink::Reset);
        assert_eq!(snake.target_length(), 1);
        assert_eq!(
            snake.body().iter().copied().collect::<Vec<_>>(),
            vec![geometry().center()]
        );
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut snake = east_snake();
        snake.grow();
        snake.slither();
        snake.set_next_direction(Direction::Down);

        snake.reset(&mut rng());

        assert_eq!(snake.len(), 1);
        assert_eq!(snake.head(), geometry().center());
        assert_eq!(snake.target_length(), 1);
        assert_eq!(snake.next_direction(), None);
        assert_eq!(snake.direction(), Direction::Right);
    }

    #[test]
    fn test_self_collision_detection() {
        let h = Cell::new(2, 2);
        let colliding = Snake::with_body(
            geometry(),
            Direction::Right,
            vec![h, Cell::new(2, 3), Cell::new(3, 3), h],
            4,
        );
        assert!(colliding.hit_itself());

        let distinct = Snake::with_body(
            geometry(),
            Direction::Right,
            vec![h, Cell::new(2, 3), Cell::new(3, 3), Cell::new(3, 2)],
            4,
        );
        assert!(!distinct.hit_itself());
    }

    #[test]
    fn test_turning_into_own_body_collides() {
        // head curls down onto a body cell that the tail has not vacated yet
        let mut snake = Snake::with_body(
            geometry(),
            Direction::Right,
            vec![
                Cell::new(5, 5),
                Cell::new(4, 5),
                Cell::new(4, 6),
                Cell::new(5, 6),
                Cell::new(6, 6),
            ],
            5,
        );
        assert!(!snake.hit_itself());

        snake.set_next_direction(Direction::Down);
        snake.apply_pending_direction();
        snake.slither();

        assert_eq!(snake.head(), Cell::new(5, 6));
        assert_eq!(snake.last_vacated(), Some(Cell::new(6, 6)));
        assert!(snake.hit_itself());
    }

    #[test]
    fn test_occupies_whole_body() {
        let snake = Snake::with_body(
            geometry(),
            Direction::Right,
            vec![Cell::new(5, 5), Cell::new(4, 5)],
            2,
        );
        let mut occupied = HashSet::new();
        snake.mark_occupied(&mut occupied);

        assert_eq!(occupied.len(), 2);
        assert!(snake.occupies(Cell::new(4, 5)));
        assert!(!snake.occupies(Cell::new(3, 5)));
    }
}
