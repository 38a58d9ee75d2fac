//! Game state machine: falling-piece lifecycle, gravity tick, line clearing,
//! scoring, and game-over detection.

use std::time::Duration;

use crate::grid::{Cell, CellGrid, GridView, Pos, StaticGrid};
use crate::provider::{BagProvider, PieceProvider};
use crate::tetromino::Tetromino;

// ============================================================================
// Configuration
// ============================================================================

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 30;

/// First board row shown to the player. Rows above it are staging space where
/// pieces spawn and may briefly live off-screen before game-over triggers.
pub const VISIBLE_START_ROW: usize = 10;
pub const VISIBLE_ROWS: usize = BOARD_HEIGHT - VISIBLE_START_ROW;

pub const SPAWN_POS: Pos = Pos { x: 3, y: 9 };

/// Gravity cadence. Fixed for the whole game.
pub const TICK_PERIOD: Duration = Duration::from_millis(500);

// Row-flash cadence handed to the presentation on line clears.
pub const FLASH_TOGGLES: u32 = 5;
pub const FLASH_INTERVAL: Duration = Duration::from_millis(100);

// Scoring
pub const SCORE_SINGLE: u32 = 100;
pub const SCORE_DOUBLE: u32 = 300;
pub const SCORE_TRIPLE: u32 = 500;
pub const SCORE_TETRIS: u32 = 800;
pub const SCORE_EXTRA_PER_LINE: u32 = 200;

/// Points awarded for clearing `lines` rows in one lock-in.
pub fn line_points(lines: usize) -> u32 {
    match lines {
        0 => 0,
        1 => SCORE_SINGLE,
        2 => SCORE_DOUBLE,
        3 => SCORE_TRIPLE,
        4 => SCORE_TETRIS,
        n => SCORE_EXTRA_PER_LINE * n as u32,
    }
}

// ============================================================================
// Types
// ============================================================================

pub type Board = StaticGrid<BOARD_WIDTH, BOARD_HEIGHT>;

/// Read-only window over the rendered part of a board.
pub fn visible_view(board: &Board) -> GridView<'_> {
    GridView::new(
        board,
        Pos::new(0, VISIBLE_START_ROW),
        Pos::new(BOARD_WIDTH, BOARD_HEIGHT),
    )
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Running,
    GameOver,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PieceLocked,
    LinesCleared(u32),
    /// Rows about to be removed, with the pre-collapse board snapshot and the
    /// alternating-display cadence. The board itself has already been
    /// compacted by the time this event is drained.
    RowFlash {
        board: Board,
        rows: Vec<usize>,
        toggles: u32,
        interval: Duration,
    },
    GameOver,
    GameRestarted,
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    pub board: Board,
    pub falling: Tetromino,
    pub falling_pos: Pos,
    pub next: Tetromino,
    pub score: u32,
    pub state: GameState,
    provider: Box<dyn PieceProvider>,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new() -> Self {
        Self::with_provider(Box::new(BagProvider::new()))
    }

    pub fn with_provider(provider: Box<dyn PieceProvider>) -> Self {
        Self::with_board(Board::new(), provider)
    }

    /// Starts a game on a pre-seeded board. If the spawn position is already
    /// blocked the game begins in `GameOver`.
    pub fn with_board(board: Board, mut provider: Box<dyn PieceProvider>) -> Self {
        let falling = provider.next();
        let next = provider.next();
        let mut game = Self {
            board,
            falling,
            falling_pos: SPAWN_POS,
            next,
            score: 0,
            state: GameState::Running,
            provider,
            events: Vec::new(),
        };
        if !game.board.can_place(game.falling_pos, &game.falling) {
            game.state = GameState::GameOver;
            game.events.push(GameEvent::GameOver);
        }
        game
    }

    /// Moves the falling piece by one step if the target cells are free.
    /// A blocked move is a rejected attempt, not an error.
    fn shift(&mut self, dx: i64, dy: i64) -> bool {
        let new_x = self.falling_pos.x as i64 + dx;
        let new_y = self.falling_pos.y as i64 + dy;
        if new_x < 0 || new_y < 0 {
            return false;
        }
        let candidate = Pos::new(new_x as usize, new_y as usize);
        if !self.board.can_place(candidate, &self.falling) {
            return false;
        }
        self.falling_pos = candidate;
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.state == GameState::Running && self.shift(-1, 0)
    }

    pub fn move_right(&mut self) -> bool {
        self.state == GameState::Running && self.shift(1, 0)
    }

    pub fn soft_drop(&mut self) -> bool {
        self.state == GameState::Running && self.shift(0, 1)
    }

    pub fn rotate_ccw(&mut self) {
        if self.state != GameState::Running {
            return;
        }
        self.falling.rotate_ccw(&self.board, &mut self.falling_pos);
    }

    pub fn rotate_cw(&mut self) {
        if self.state != GameState::Running {
            return;
        }
        self.falling.rotate_cw(&self.board, &mut self.falling_pos);
    }

    /// Drops the piece to the lowest valid row and locks it immediately.
    pub fn hard_drop(&mut self) {
        if self.state != GameState::Running {
            return;
        }
        while self.shift(0, 1) {}
        self.tick();
    }

    /// Gravity step: move the falling piece down one row; if it cannot fall,
    /// lock it, clear full rows, and spawn the next piece.
    pub fn tick(&mut self) {
        if self.state != GameState::Running {
            return;
        }
        if self.shift(0, 1) {
            return;
        }
        self.board.place(self.falling_pos, &self.falling);
        self.events.push(GameEvent::PieceLocked);
        self.clear_lines();
        if !self.spawn() {
            self.state = GameState::GameOver;
            self.events.push(GameEvent::GameOver);
        }
    }

    /// Scans for full rows, awards points, emits the flash event, and
    /// collapses cleared rows top-to-bottom.
    fn clear_lines(&mut self) {
        let size = self.board.size();
        let mut cleared = Vec::new();
        for y in 0..size.height {
            if self.board.row(y).iter().all(|cell| !cell.is_empty()) {
                cleared.push(y);
            }
        }
        self.score += line_points(cleared.len());
        if cleared.is_empty() {
            return;
        }
        self.events.push(GameEvent::RowFlash {
            board: self.board.clone(),
            rows: cleared.clone(),
            toggles: FLASH_TOGGLES,
            interval: FLASH_INTERVAL,
        });
        self.events
            .push(GameEvent::LinesCleared(cleared.len() as u32));
        for &row in &cleared {
            self.board.collapse_row(row);
        }
    }

    /// Promotes the next piece to falling at the spawn position and draws a
    /// fresh next piece. Returns false if the spawn position is blocked.
    fn spawn(&mut self) -> bool {
        self.falling = std::mem::replace(&mut self.next, self.provider.next());
        self.falling_pos = SPAWN_POS;
        self.board.can_place(self.falling_pos, &self.falling)
    }

    /// Reinitializes every field in place, including the provider. Only
    /// honored in `GameOver`.
    pub fn reset(&mut self) {
        if self.state != GameState::GameOver {
            return;
        }
        self.board = Board::new();
        self.score = 0;
        self.provider.reset();
        self.falling = self.provider.next();
        self.next = self.provider.next();
        self.falling_pos = SPAWN_POS;
        self.state = GameState::Running;
        self.events.clear();
        self.events.push(GameEvent::GameRestarted);
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    /// Takes and clears all pending events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// The visible window of the board with the falling piece overlaid,
    /// clipped to the window. Row 0 of the result is board row
    /// `VISIBLE_START_ROW`.
    pub fn visible_cells(&self) -> Vec<Vec<Cell>> {
        let view = visible_view(&self.board);
        let size = view.size();
        let mut cells = vec![vec![Cell::Empty; size.width]; size.height];
        for (y, row) in cells.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = view.get(Pos::new(x, y));
            }
        }
        let piece_size = self.falling.size();
        for py in 0..piece_size.height {
            for px in 0..piece_size.width {
                let cell = self.falling.get(Pos::new(px, py));
                if cell.is_empty() {
                    continue;
                }
                let bx = self.falling_pos.x + px;
                let by = self.falling_pos.y + py;
                if bx >= BOARD_WIDTH || by < VISIBLE_START_ROW || by >= BOARD_HEIGHT {
                    continue;
                }
                cells[by - VISIBLE_START_ROW][bx] = cell;
            }
        }
        cells
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
