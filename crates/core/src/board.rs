//! Board module - manages the settled-block grid
//!
//! The board is a 10x20 grid where each cell is either empty or occupied.
//! Uses a flat array for cache locality and zero allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top to bottom).
//!
//! The falling piece is never stored here; it only appears in the view projection
//! built by [`crate::game::TetrisGame::view_board`].

use arrayvec::ArrayVec;

use crate::types::{BOARD_HEIGHT, BOARD_WIDTH};

/// Total number of cells on the board
const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

/// Row indices removed by a single clear pass (any row may be complete)
pub type ClearedRows = ArrayVec<usize, { BOARD_HEIGHT as usize }>;

/// The settled-block grid - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [bool; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [false; BOARD_SIZE],
        }
    }

    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * (BOARD_WIDTH as usize) + (x as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y); `None` if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<bool> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y). Returns false if out of bounds.
    pub fn set(&mut self, x: i8, y: i8, occupied: bool) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = occupied;
                true
            }
            None => false,
        }
    }

    /// Check if position is within bounds and filled
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(true))
    }

    /// Check whether a piece cell at (x, y) would collide.
    ///
    /// Left, right and bottom edges collide; the top edge does not, so a cell
    /// above row 0 only collides if its column is out of range.
    pub fn collides(&self, x: i8, y: i8) -> bool {
        if x < 0 || x >= BOARD_WIDTH as i8 || y >= BOARD_HEIGHT as i8 {
            return true;
        }
        y >= 0 && self.is_occupied(x, y)
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= BOARD_HEIGHT as usize {
            return false;
        }
        let start = y * BOARD_WIDTH as usize;
        let end = start + BOARD_WIDTH as usize;
        self.cells[start..end].iter().all(|&cell| cell)
    }

    /// Collect every complete row, top to bottom
    pub fn full_rows(&self) -> ClearedRows {
        (0..BOARD_HEIGHT as usize)
            .filter(|&y| self.is_row_full(y))
            .collect()
    }

    /// Remove the given rows in one compacting pass.
    ///
    /// Surviving rows keep their relative order and settle toward the bottom;
    /// the rows vacated at the top are emptied.
    pub fn remove_rows(&mut self, rows: &[usize]) {
        let width = BOARD_WIDTH as usize;
        let mut write_y = BOARD_HEIGHT as usize;

        for read_y in (0..BOARD_HEIGHT as usize).rev() {
            if rows.contains(&read_y) {
                continue;
            }
            write_y -= 1;
            if write_y != read_y {
                let src_start = read_y * width;
                self.cells
                    .copy_within(src_start..src_start + width, write_y * width);
            }
        }

        for cell in &mut self.cells[..write_y * width] {
            *cell = false;
        }
    }

    /// Clear all full rows and return the indices that were removed (top to bottom)
    pub fn clear_full_rows(&mut self) -> ClearedRows {
        let rows = self.full_rows();
        if !rows.is_empty() {
            self.remove_rows(&rows);
        }
        rows
    }

    /// Mark the given absolute cells as settled. Cells off the board are skipped.
    pub fn lock_cells(&mut self, cells: &[(i8, i8)]) {
        for &(x, y) in cells {
            self.set(x, y, true);
        }
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Iterate rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks_exact(BOARD_WIDTH as usize)
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells = [false; BOARD_SIZE];
    }

    /// Fill a whole row, leaving the listed columns empty
    pub fn fill_row_except(&mut self, y: i8, gaps: &[i8]) {
        for x in 0..BOARD_WIDTH as i8 {
            self.set(x, y, !gaps.contains(&x));
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
