use std::collections::{BTreeSet, VecDeque};
use std::ops::BitOr;

use chrono::{DateTime, Utc};
use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{BoardConfig, Cell, CellCount, GameError, Idx, NeighborIter, Result, RowCol, ToNdIndex};

/// Where the game currently stands.
///
/// Valid transitions:
/// - AwaitingFirstStep -> InProgress (mine generation on the first step)
/// - InProgress -> Won
/// - InProgress -> Lost
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Grid allocated, mines not yet placed.
    AwaitingFirstStep,
    /// Mines placed, board partially opened.
    InProgress,
    /// Every safe cell opened without stepping on a mine.
    Won,
    /// A mine was stepped on.
    Lost,
}

impl GamePhase {
    /// Indicates the game has ended and no further moves change the board.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Outcome of a step or chord operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    NoChange,
    Opened,
    Exploded,
    Won,
}

impl StepOutcome {
    /// Whether this outcome could have caused an update to the board.
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Used to merge per-neighbor outcomes when chording.
impl BitOr for StepOutcome {
    type Output = StepOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use StepOutcome::*;
        match (self, rhs) {
            // an explosion trumps everything
            (Exploded, _) | (_, Exploded) => Exploded,
            (Won, _) | (_, Won) => Won,
            (Opened, _) | (_, Opened) => Opened,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// Outcome of a flag toggle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Placed,
    Removed,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// A Minesweeper board from first click to win or loss.
///
/// The board exclusively owns its cells; every mutation goes through the
/// operations here, and [`Board::cell`] hands out read-only views that are
/// valid until the next mutating call. Mines are not placed at construction
/// time: the first [`Board::step_on_cell`] seeds generation with its own
/// coordinates so the first move never lands on a mine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    config: BoardConfig,
    grid: Array2<Cell>,
    seed: u64,
    opened_count: CellCount,
    flags_placed: CellCount,
    phase: GamePhase,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl Board {
    /// Starts a new game with a randomly seeded mine layout.
    pub fn new_game(rows: Idx, cols: Idx, mines: CellCount) -> Result<Self> {
        Self::new_game_seeded(rows, cols, mines, rand::random())
    }

    /// Starts a new game whose eventual mine layout is fixed by `seed`.
    pub fn new_game_seeded(rows: Idx, cols: Idx, mines: CellCount, seed: u64) -> Result<Self> {
        let config = BoardConfig::new(rows, cols, mines)?;
        let grid = Array2::from_shape_fn((rows as usize, cols as usize), |(row, col)| {
            Cell::new(row as Idx, col as Idx)
        });
        Ok(Self {
            config,
            grid,
            seed,
            opened_count: 0,
            flags_placed: 0,
            phase: GamePhase::AwaitingFirstStep,
            started_at: None,
            ended_at: None,
        })
    }

    /// Builds a board with mines already placed at the given coordinates,
    /// skipping deferred generation entirely. Duplicate coordinates are
    /// rejected as an invalid configuration.
    pub fn with_mine_coords(rows: Idx, cols: Idx, mine_coords: &[RowCol]) -> Result<Self> {
        let mines: CellCount = mine_coords
            .len()
            .try_into()
            .map_err(|_| GameError::InvalidConfiguration)?;
        let mut board = Self::new_game_seeded(rows, cols, mines, 0)?;

        for &coords in mine_coords {
            board.validate_coords(coords)?;
            if board.grid[coords.to_nd_index()].is_mine() {
                return Err(GameError::InvalidConfiguration);
            }
            board.place_mine(coords);
        }

        board.phase = GamePhase::InProgress;
        board.started_at = Some(Utc::now());
        Ok(board)
    }

    pub const fn num_rows(&self) -> Idx {
        self.config.rows
    }

    pub const fn num_cols(&self) -> Idx {
        self.config.cols
    }

    pub const fn num_mines(&self) -> CellCount {
        self.config.mines
    }

    pub const fn config(&self) -> BoardConfig {
        self.config
    }

    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Flags remaining to place. Capped to `0..=num_mines` by the placement
    /// budget in [`Board::toggle_flag`].
    pub const fn flags_left(&self) -> CellCount {
        self.config.mines - self.flags_placed
    }

    /// Wall-clock seconds since mines were generated, 0 before the first
    /// step. Stops counting when the game ends.
    pub fn elapsed_seconds(&self) -> u32 {
        match self.started_at {
            Some(started_at) => {
                let end = self.ended_at.unwrap_or_else(Utc::now);
                (end - started_at).num_seconds().max(0) as u32
            }
            None => 0,
        }
    }

    /// A constructed board always has a game under way: starting a game and
    /// constructing the board are the same operation. Kept so pollers can
    /// treat the whole lifecycle uniformly.
    pub const fn is_game_started(&self) -> bool {
        true
    }

    pub const fn is_game_over(&self) -> bool {
        self.phase.is_terminal()
    }

    pub const fn is_player_dead(&self) -> bool {
        matches!(self.phase, GamePhase::Lost)
    }

    pub const fn is_game_won(&self) -> bool {
        matches!(self.phase, GamePhase::Won)
    }

    /// Read-only view of the cell at `coords`.
    pub fn cell(&self, coords: RowCol) -> Result<&Cell> {
        let coords = self.validate_coords(coords)?;
        Ok(&self.grid[coords.to_nd_index()])
    }

    /// Steps on a cell, generating mines first if this is the opening move.
    ///
    /// Flagged and already-visible cells are left alone. Stepping on a mine
    /// ends the game and uncovers every mine on the board; stepping on a
    /// zero-count cell opens its whole connected region plus the numbered
    /// border around it.
    pub fn step_on_cell(&mut self, coords: RowCol) -> Result<StepOutcome> {
        let coords = self.validate_coords(coords)?;
        if self.phase.is_terminal() {
            return Ok(StepOutcome::NoChange);
        }

        if matches!(self.phase, GamePhase::AwaitingFirstStep) {
            self.generate_mines(coords);
        }

        let outcome = self.reveal_cell(coords);
        Ok(self.settle(outcome))
    }

    /// Opens every neighbor of a cell whose adjacent flag count matches its
    /// adjacent mine count. The flags themselves are not checked against the
    /// actual mines, so a misplaced flag can detonate here.
    pub fn chord_cell(&mut self, coords: RowCol) -> Result<StepOutcome> {
        let coords = self.validate_coords(coords)?;
        if !matches!(self.phase, GamePhase::InProgress) {
            return Ok(StepOutcome::NoChange);
        }

        let cell = &self.grid[coords.to_nd_index()];
        if cell.adjacent_flags() != cell.adjacent_mines() {
            return Ok(StepOutcome::NoChange);
        }

        let outcome = self
            .neighbors(coords)
            .map(|neighbor| self.reveal_cell(neighbor))
            .reduce(BitOr::bitor)
            .unwrap_or(StepOutcome::NoChange);
        Ok(self.settle(outcome))
    }

    /// Places or removes a flag on a covered cell.
    ///
    /// Removal is always allowed; placement is refused silently once
    /// [`Board::flags_left`] reaches zero, so the remaining-flags display can
    /// never go negative. Neighbor flag counters are kept in step either way.
    pub fn toggle_flag(&mut self, coords: RowCol) -> Result<FlagOutcome> {
        let coords = self.validate_coords(coords)?;
        if self.phase.is_terminal() {
            return Ok(FlagOutcome::NoChange);
        }

        let cell = &self.grid[coords.to_nd_index()];
        if cell.is_visible() {
            return Ok(FlagOutcome::NoChange);
        }

        if cell.is_flagged() {
            self.grid[coords.to_nd_index()].toggle_flag();
            self.flags_placed -= 1;
            for neighbor in self.neighbors(coords) {
                self.grid[neighbor.to_nd_index()].remove_adjacent_flag();
            }
            Ok(FlagOutcome::Removed)
        } else {
            if self.flags_left() == 0 {
                return Ok(FlagOutcome::NoChange);
            }
            self.grid[coords.to_nd_index()].toggle_flag();
            self.flags_placed += 1;
            for neighbor in self.neighbors(coords) {
                self.grid[neighbor.to_nd_index()].add_adjacent_flag();
            }
            Ok(FlagOutcome::Placed)
        }
    }

    fn validate_coords(&self, coords: RowCol) -> Result<RowCol> {
        if coords.0 < self.config.rows && coords.1 < self.config.cols {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    fn neighbors(&self, center: RowCol) -> NeighborIter {
        NeighborIter::new(center, self.config.bounds())
    }

    /// Places mines by rejection sampling, never on the first-step cell and,
    /// when enough safe cells exist for a full 3x3 zone, never adjacent to it
    /// either. The retry loop is unbounded; the configuration guard keeps it
    /// feasible for every accepted board.
    fn generate_mines(&mut self, start: RowCol) {
        let restricted: BTreeSet<RowCol> = if self.config.safe_cells() >= 9 {
            self.neighbors(start).chain(std::iter::once(start)).collect()
        } else {
            BTreeSet::from([start])
        };

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut placed: CellCount = 0;
        while placed < self.config.mines {
            let coords = (
                rng.random_range(0..self.config.rows),
                rng.random_range(0..self.config.cols),
            );
            if restricted.contains(&coords) || self.grid[coords.to_nd_index()].is_mine() {
                continue;
            }
            self.place_mine(coords);
            placed += 1;
        }

        self.phase = GamePhase::InProgress;
        self.started_at = Some(Utc::now());
        log::debug!("placed {} mines, first step at {:?}", placed, start);
    }

    fn place_mine(&mut self, coords: RowCol) {
        self.grid[coords.to_nd_index()].mark_mine();
        for neighbor in self.neighbors(coords) {
            self.grid[neighbor.to_nd_index()].add_adjacent_mine();
        }
    }

    /// Opens a single cell and flood-fills from it when it has no adjacent
    /// mines. Flagged and visible cells are skipped, which is also what makes
    /// the flood terminate.
    fn reveal_cell(&mut self, coords: RowCol) -> StepOutcome {
        let cell = &mut self.grid[coords.to_nd_index()];
        if cell.is_flagged() || cell.is_visible() {
            return StepOutcome::NoChange;
        }

        cell.reveal();
        let stepped_on_mine = cell.is_mine();
        let count = cell.adjacent_mines();
        self.opened_count += 1;
        log::debug!("opened cell at {:?}, adjacent mines: {}", coords, count);

        if stepped_on_mine {
            self.explode();
            return StepOutcome::Exploded;
        }

        if count == 0 {
            let mut visited = BTreeSet::from([coords]);
            let mut to_visit: VecDeque<RowCol> = self.neighbors(coords).collect();

            while let Some(visit_coords) = to_visit.pop_front() {
                if !visited.insert(visit_coords) {
                    continue;
                }

                let cell = &mut self.grid[visit_coords.to_nd_index()];
                if cell.is_flagged() || cell.is_visible() {
                    continue;
                }

                // zero cells never border a mine, so this is always safe
                cell.reveal();
                let visit_count = cell.adjacent_mines();
                self.opened_count += 1;
                log::trace!(
                    "flood opened cell at {:?}, adjacent mines: {}",
                    visit_coords,
                    visit_count
                );

                if visit_count == 0 {
                    to_visit.extend(
                        self.neighbors(visit_coords)
                            .filter(|pos| !visited.contains(pos)),
                    );
                }
            }
        }

        StepOutcome::Opened
    }

    fn explode(&mut self) {
        self.phase = GamePhase::Lost;
        self.ended_at = Some(Utc::now());
        // loss disclosure: uncover every mine, opened_count untouched
        for cell in self.grid.iter_mut() {
            if cell.is_mine() {
                cell.reveal();
            }
        }
        log::debug!("stepped on a mine, game lost");
    }

    /// Promotes the board to won once every safe cell is open, unless the
    /// same move already lost the game.
    fn settle(&mut self, outcome: StepOutcome) -> StepOutcome {
        if matches!(self.phase, GamePhase::Lost) {
            return outcome;
        }
        if self.opened_count == self.config.safe_cells() {
            self.phase = GamePhase::Won;
            self.ended_at = Some(Utc::now());
            log::debug!("all safe cells opened, game won");
            return outcome | StepOutcome::Won;
        }
        outcome
    }
}
