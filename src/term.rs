use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use std::io::{self, Stdout};
use std::thread;
use std::time::{Duration, Instant};

use crate::food::FoodKind;
use crate::game::{Clock, Hud, InputEvent, InputSource, Paint, Renderer};
use crate::grid::{Cell, Direction, GridGeometry};

const SNAKE_COLOR: Color = Color::Rgb(0, 255, 0);
const HEAD_COLOR: Color = Color::Rgb(180, 255, 180);
const APPLE_COLOR: Color = Color::Rgb(255, 0, 0);
const BAD_FOOD_COLOR: Color = Color::Rgb(88, 57, 39);
const BORDER_COLOR: Color = Color::Rgb(93, 216, 228);
const BOARD_BACKGROUND_COLOR: Color = Color::Black;

const STATUS_HEIGHT: u16 = 3;
const TITLE: &str = " Snake  arrows/WASD steer  Esc/q quit ";

pub type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

pub fn setup_terminal() -> io::Result<CrosstermTerminal> {
    enable_raw_mode()?;
    undo_on_err(open_alternate_screen(), disable_raw_mode)
}

fn open_alternate_screen() -> io::Result<CrosstermTerminal> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;
    Ok(terminal)
}

/// Runs `undo` when `result` failed. The original error wins over any error
/// from `undo`.
fn undo_on_err<T>(result: io::Result<T>, undo: impl FnOnce() -> io::Result<()>) -> io::Result<T> {
    if result.is_err() {
        let _ = undo();
    }
    result
}

pub fn restore_terminal(terminal: &mut CrosstermTerminal) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Terminal columns and rows needed to show the board with its frame.
pub fn required_size(geometry: GridGeometry) -> (u16, u16) {
    let (cols, rows) = geometry.screen_size();
    (
        cols.saturating_add(2),
        rows.saturating_add(2 + STATUS_HEIGHT),
    )
}

/// Reads pending key presses from crossterm without blocking.
#[derive(Debug, Default)]
pub struct CrosstermInput;

impl InputSource for CrosstermInput {
    fn poll_events(&mut self) -> io::Result<Vec<InputEvent>> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                events.extend(translate_key(key));
            }
        }
        Ok(events)
    }
}

pub fn translate_key(key: KeyEvent) -> Option<InputEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(InputEvent::Quit)
        }
        KeyCode::Esc | KeyCode::Char('q') => Some(InputEvent::Quit),
        KeyCode::Up | KeyCode::Char('w') => Some(InputEvent::Turn(Direction::Up)),
        KeyCode::Down | KeyCode::Char('s') => Some(InputEvent::Turn(Direction::Down)),
        KeyCode::Left | KeyCode::Char('a') => Some(InputEvent::Turn(Direction::Left)),
        KeyCode::Right | KeyCode::Char('d') => Some(InputEvent::Turn(Direction::Right)),
        _ => None,
    }
}

/// Sleeps so that ticks land on a fixed schedule. A late tick restarts the
/// schedule instead of firing a burst to catch up.
#[derive(Debug)]
pub struct FixedRateClock {
    interval: Duration,
    next_tick: Instant,
}

impl FixedRateClock {
    pub fn new(ticks_per_second: u32) -> Self {
        let interval = Duration::from_secs(1) / ticks_per_second.max(1);
        FixedRateClock {
            interval,
            next_tick: Instant::now() + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Clock for FixedRateClock {
    fn wait_for_tick(&mut self) {
        let now = Instant::now();
        if now < self.next_tick {
            thread::sleep(self.next_tick - now);
            self.next_tick += self.interval;
        } else {
            self.next_tick = now + self.interval;
        }
    }
}

/// Keeps the painted cells between frames and hands them to ratatui on
/// `present`.
pub struct TerminalRenderer<B: Backend> {
    terminal: Terminal<B>,
    geometry: GridGeometry,
    canvas: Vec<Option<Paint>>,
}

impl<B: Backend> TerminalRenderer<B> {
    pub fn new(terminal: Terminal<B>, geometry: GridGeometry) -> Self {
        let cells = geometry.width as usize * geometry.height as usize;
        TerminalRenderer {
            terminal,
            geometry,
            canvas: vec![None; cells],
        }
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }

    fn slot_mut(&mut self, cell: Cell) -> Option<&mut Option<Paint>> {
        if !self.geometry.contains(cell) {
            return None;
        }
        let index = cell.row as usize * self.geometry.width as usize + cell.col as usize;
        self.canvas.get_mut(index)
    }
}

impl<B: Backend> Renderer for TerminalRenderer<B> {
    fn clear(&mut self) -> io::Result<()> {
        self.canvas.fill(None);
        Ok(())
    }

    fn draw_cell(&mut self, cell: Cell, paint: Paint) -> io::Result<()> {
        if let Some(slot) = self.slot_mut(cell) {
            *slot = Some(paint);
        }
        Ok(())
    }

    fn erase_cell(&mut self, cell: Cell) -> io::Result<()> {
        if let Some(slot) = self.slot_mut(cell) {
            *slot = None;
        }
        Ok(())
    }

    fn present(&mut self, hud: &Hud) -> io::Result<()> {
        let board = BoardView {
            geometry: self.geometry,
            canvas: &self.canvas,
        };
        let (board_width, board_height) = required_size(self.geometry);

        self.terminal.draw(|frame| {
            let area = frame.area();
            let layout = Layout::default()
                .direction(layout::Direction::Vertical)
                .constraints([
                    Constraint::Length(STATUS_HEIGHT),
                    Constraint::Length(board_height - STATUS_HEIGHT),
                    Constraint::Min(0),
                ])
                .split(Rect {
                    width: area.width.min(board_width),
                    ..area
                });

            frame.render_widget(
                Paragraph::new(format!(
                    "SNAKE    Length: {}    Target: {}",
                    hud.length, hud.target_length
                ))
                .alignment(Alignment::Left)
                .block(Block::default().borders(Borders::ALL)),
                layout[0],
            );

            let block = Block::default()
                .title(TITLE)
                .borders(Borders::ALL)
                .style(Style::default().bg(BOARD_BACKGROUND_COLOR));
            let inner_area = block.inner(layout[1]);
            frame.render_widget(block, layout[1]);
            frame.render_widget(board, inner_area);
        })?;

        Ok(())
    }
}

struct BoardView<'a> {
    geometry: GridGeometry,
    canvas: &'a [Option<Paint>],
}

fn paint_style(paint: Paint) -> Style {
    match paint {
        Paint::SnakeHead => Style::default()
            .fg(BORDER_COLOR)
            .bg(HEAD_COLOR)
            .add_modifier(Modifier::BOLD),
        Paint::SnakeBody => Style::default().fg(BORDER_COLOR).bg(SNAKE_COLOR),
        Paint::Food(FoodKind::Good) => Style::default().fg(BORDER_COLOR).bg(APPLE_COLOR),
        Paint::Food(FoodKind::Bad) => Style::default().fg(BORDER_COLOR).bg(BAD_FOOD_COLOR),
    }
}

/// Symbol for column `offset` of a cell `width` columns wide: `[ ]` framing.
fn cell_symbol(offset: u16, width: u16) -> &'static str {
    if width < 2 {
        " "
    } else if offset == 0 {
        "["
    } else if offset == width - 1 {
        "]"
    } else {
        " "
    }
}

impl Widget for BoardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = self.geometry.width as usize;
        let cell_size = self.geometry.cell_size;

        for (index, paint) in self.canvas.iter().enumerate() {
            let Some(paint) = paint else { continue };
            let col = (index % width) as u16;
            let row = (index / width) as u16;

            let y = area.y + row;
            if y >= area.bottom() {
                continue;
            }

            let style = paint_style(*paint);
            for offset in 0..cell_size {
                let x = area.x + col * cell_size + offset;
                if x >= area.right() {
                    break;
                }
                buf[(x, y)]
                    .set_symbol(cell_symbol(offset, cell_size))
                    .set_style(style);
            }
        }
    }
}
