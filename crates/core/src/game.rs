//! Game module - a single Tetris board and its state machine
//!
//! `Ready --start()--> Playing --(spawn collides)--> GameOver`
//!
//! Gravity is one row per [`TetrisGame::tick`]. Every mutating operation is a
//! no-op unless the game is `Playing`, and `GameOver` has no way out.

use crate::board::Board;
use crate::pieces::{get_spawn_cells, rotate_cw, translate, PieceCells};
use crate::rng::SimpleRng;
use crate::types::{GameStatus, PieceKind, TetrisAction, BOARD_HEIGHT, BOARD_WIDTH};

/// Row-major view of a board: 0 empty, 1 settled, 2 falling piece
pub type ViewBoard = [[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];

pub const VIEW_EMPTY: u8 = 0;
pub const VIEW_SETTLED: u8 = 1;
pub const VIEW_FALLING: u8 = 2;

/// The falling piece, anchored in board coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FallingPiece {
    pub kind: PieceKind,
    pub cells: PieceCells,
}

impl FallingPiece {
    /// A piece of `kind` at its spawn position
    pub fn spawn(kind: PieceKind) -> Self {
        Self {
            kind,
            cells: get_spawn_cells(kind),
        }
    }

    /// Copy moved by (dx, dy)
    pub fn shifted(&self, dx: i8, dy: i8) -> Self {
        Self {
            cells: translate(&self.cells, dx, dy),
            ..*self
        }
    }

    /// Copy rotated 90° clockwise around its bounding-box minimum
    pub fn rotated(&self) -> Self {
        Self {
            cells: rotate_cw(&self.cells),
            ..*self
        }
    }

    pub fn collides(&self, board: &Board) -> bool {
        self.cells.iter().any(|&(x, y)| board.collides(x, y))
    }
}

/// Result of one gravity step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gravity {
    /// The piece moved down one row
    Moved,
    /// The piece was committed; carries the number of rows cleared
    Placed { lines: u32 },
}

/// One player's game
#[derive(Debug, Clone)]
pub struct TetrisGame {
    board: Board,
    current: Option<FallingPiece>,
    stored: Option<PieceKind>,
    swapped: bool,
    score: u32,
    status: GameStatus,
    rng: SimpleRng,
}

impl TetrisGame {
    /// Create a game in `Ready` with the given RNG seed
    pub fn new(seed: u32) -> Self {
        Self {
            board: Board::new(),
            current: None,
            stored: None,
            swapped: false,
            score: 0,
            status: GameStatus::Ready,
            rng: SimpleRng::new(seed),
        }
    }

    /// Start the game: clears the board and spawns the first piece.
    ///
    /// Only a `Ready` game can start; returns whether it did.
    pub fn start(&mut self) -> bool {
        if self.status != GameStatus::Ready {
            return false;
        }
        self.board.clear();
        self.status = GameStatus::Playing;
        self.spawn(None);
        true
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable board access for scripted setups (replays, tests)
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn current_piece(&self) -> Option<FallingPiece> {
        self.current
    }

    pub fn current_piece_type(&self) -> Option<PieceKind> {
        self.current.map(|p| p.kind)
    }

    pub fn stored_piece(&self) -> Option<PieceKind> {
        self.stored
    }

    pub fn has_swapped(&self) -> bool {
        self.swapped
    }

    pub fn seed(&self) -> u32 {
        self.rng.seed()
    }

    /// Replace the falling piece with a fresh one of `kind` (random if `None`).
    ///
    /// Only valid while `Playing`. Returns false if the new piece collides,
    /// which ends the game.
    pub fn spawn_piece(&mut self, kind: Option<PieceKind>) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.spawn(kind)
    }

    fn spawn(&mut self, forced: Option<PieceKind>) -> bool {
        let kind = forced.unwrap_or_else(|| self.rng.next_piece());
        let piece = FallingPiece::spawn(kind);
        self.current = Some(piece);

        if piece.collides(&self.board) {
            self.status = GameStatus::GameOver;
            return false;
        }
        true
    }

    /// Apply gravity once while `Playing`
    pub fn tick(&mut self) -> Option<Gravity> {
        if !self.is_playing() {
            return None;
        }
        self.step_down()
    }

    /// Move the piece down a row, or place it and spawn the next one
    fn step_down(&mut self) -> Option<Gravity> {
        let current = self.current?;
        let candidate = current.shifted(0, 1);

        if candidate.collides(&self.board) {
            let lines = self.place_piece();
            self.spawn(None);
            return Some(Gravity::Placed { lines });
        }

        self.current = Some(candidate);
        Some(Gravity::Moved)
    }

    /// Commit the falling piece, clear complete rows and reset the swap flag
    fn place_piece(&mut self) -> u32 {
        let Some(current) = self.current.take() else {
            return 0;
        };

        self.board.lock_cells(&current.cells);
        let lines = self.board.clear_full_rows().len() as u32;
        self.score += lines;
        self.swapped = false;
        lines
    }

    fn try_shift(&mut self, dx: i8) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        let candidate = current.shifted(dx, 0);
        if candidate.collides(&self.board) {
            return false;
        }
        self.current = Some(candidate);
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.is_playing() && self.try_shift(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.is_playing() && self.try_shift(1)
    }

    /// Rotate clockwise; rejected (piece untouched) on collision
    pub fn rotate(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }
        let Some(current) = self.current else {
            return false;
        };
        let candidate = current.rotated();
        if candidate.collides(&self.board) {
            return false;
        }
        self.current = Some(candidate);
        true
    }

    /// Swap the falling piece with the stored one, once per placement.
    ///
    /// With nothing stored yet a random piece spawns instead.
    pub fn store(&mut self) -> bool {
        if !self.is_playing() || self.swapped {
            return false;
        }
        let Some(current) = self.current else {
            return false;
        };

        self.swapped = true;
        let previous = self.stored.replace(current.kind);
        self.spawn(previous);
        true
    }

    /// Drop the piece straight down to its resting place and place it.
    ///
    /// Returns the number of rows cleared by the placement.
    pub fn drop_piece(&mut self) -> Option<u32> {
        if !self.is_playing() {
            return None;
        }
        // Bounded by board height: every Moved step lowers the piece a row.
        loop {
            match self.step_down()? {
                Gravity::Moved => continue,
                Gravity::Placed { lines } => return Some(lines),
            }
        }
    }

    /// Apply one action. Returns whether the game state changed.
    pub fn apply_action(&mut self, action: TetrisAction) -> bool {
        if !self.is_playing() {
            return false;
        }
        match action {
            TetrisAction::MoveLeft => self.move_left(),
            TetrisAction::MoveRight => self.move_right(),
            TetrisAction::Rotate => self.rotate(),
            TetrisAction::Drop => self.drop_piece().is_some(),
            TetrisAction::Store => self.store(),
        }
    }

    /// Settled board with the falling piece overlaid
    pub fn view_board(&self) -> ViewBoard {
        let mut view = [[VIEW_EMPTY; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        for (y, row) in self.board.rows().enumerate() {
            for (x, &occupied) in row.iter().enumerate() {
                if occupied {
                    view[y][x] = VIEW_SETTLED;
                }
            }
        }
        if let Some(piece) = self.current {
            for &(x, y) in &piece.cells {
                if (0..BOARD_WIDTH as i8).contains(&x) && (0..BOARD_HEIGHT as i8).contains(&y) {
                    view[y as usize][x as usize] = VIEW_FALLING;
                }
            }
        }
        view
    }
}

impl Default for TetrisGame {
    fn default() -> Self {
        Self::new(1)
    }
}
