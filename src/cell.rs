use serde::{Deserialize, Serialize};

use crate::types::Idx;

/// A single square of the minefield.
///
/// Cells are plain state holders with no rule knowledge: reveal propagation,
/// counter bookkeeping, and end-of-game detection all live in
/// [`Board`](crate::Board), which owns every cell exclusively. Consumers only
/// ever see cells through the board's read-only accessor, so all mutators are
/// crate-private.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    row: Idx,
    col: Idx,
    mine: bool,
    visible: bool,
    flagged: bool,
    adjacent_mines: u8,
    adjacent_flags: u8,
}

impl Cell {
    pub(crate) const fn new(row: Idx, col: Idx) -> Self {
        Self {
            row,
            col,
            mine: false,
            visible: false,
            flagged: false,
            adjacent_mines: 0,
            adjacent_flags: 0,
        }
    }

    pub const fn row(&self) -> Idx {
        self.row
    }

    pub const fn col(&self) -> Idx {
        self.col
    }

    pub const fn is_mine(&self) -> bool {
        self.mine
    }

    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub const fn is_flagged(&self) -> bool {
        self.flagged
    }

    /// Number of mines in adjacent cells, fixed once mines are generated.
    /// The cell's own mine is never counted.
    pub const fn adjacent_mines(&self) -> u8 {
        self.adjacent_mines
    }

    /// Number of flags currently placed on adjacent cells.
    pub const fn adjacent_flags(&self) -> u8 {
        self.adjacent_flags
    }

    /// Uncovers the cell. Idempotent; visibility never goes back.
    pub(crate) fn reveal(&mut self) {
        self.visible = true;
    }

    /// One-way: a mine stays a mine.
    pub(crate) fn mark_mine(&mut self) {
        self.mine = true;
    }

    /// Flips the flag, unless the cell is already visible.
    pub(crate) fn toggle_flag(&mut self) {
        if !self.visible {
            self.flagged = !self.flagged;
        }
    }

    pub(crate) fn add_adjacent_mine(&mut self) {
        self.adjacent_mines += 1;
    }

    pub(crate) fn add_adjacent_flag(&mut self) {
        self.adjacent_flags += 1;
    }

    pub(crate) fn remove_adjacent_flag(&mut self) {
        self.adjacent_flags -= 1;
    }
}
