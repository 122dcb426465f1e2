//! Rules engine for a Minesweeper game.
//!
//! The crate models the game board and nothing else: mine generation with a
//! first-click safety guarantee, flood reveal of zero-count regions, flag and
//! chord handling, and win/loss detection. Rendering, input translation, and
//! timers belong to the consumer, which drives the engine through
//! [`Board`]'s operations and polls its queries between moves.

use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use error::*;
pub use types::*;

mod board;
mod cell;
mod error;
mod types;

/// Validated board dimensions and mine count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub rows: Idx,
    pub cols: Idx,
    pub mines: CellCount,
}

impl BoardConfig {
    /// Rejects empty dimensions, a zero mine count, and boards where the
    /// mines would fill (or overflow) the grid.
    pub fn new(rows: Idx, cols: Idx, mines: CellCount) -> Result<Self> {
        if rows == 0 || cols == 0 || mines == 0 || mines >= area(rows, cols) {
            return Err(GameError::InvalidConfiguration);
        }
        Ok(Self { rows, cols, mines })
    }

    pub const fn total_cells(&self) -> CellCount {
        area(self.rows, self.cols)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mines
    }

    pub(crate) const fn bounds(&self) -> RowCol {
        (self.rows, self.cols)
    }
}
