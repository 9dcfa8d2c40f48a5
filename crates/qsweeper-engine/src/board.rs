use arrayvec::ArrayVec;
use rand::{Rng as _, SeedableRng as _, seq::IndexedRandom as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{BoardConfig, BoardSeed, Cell};

/// Offsets of the 8 surrounding cells in raster order (NW, N, NE, W, E, SW, S, SE).
pub const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Progress of a single game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum GameState {
    #[display("IN_PROGRESS")]
    InProgress,
    #[display("WIN")]
    Win,
    #[display("LOSS")]
    Loss,
}

impl GameState {
    /// Returns whether the game has ended (won or lost).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        match self {
            Self::InProgress => false,
            Self::Win | Self::Loss => true,
        }
    }
}

/// A Minesweeper board and the rules that operate on it.
///
/// # Mine Placement
///
/// Mines are placed lazily by the first effective [`reveal`](Self::reveal): they
/// are scattered uniformly over every cell outside the 3×3 area centered on the
/// clicked cell, so the first click always opens a zero-count area. Adjacency
/// counts are computed right after placement.
///
/// # Invalid Moves
///
/// Revealing a cell that is out of range, already revealed, or flagged, or
/// revealing anything after the game ended, is a no-op returning 0. There is
/// no error surface.
///
/// # Example
///
/// ```
/// use qsweeper_engine::{Board, BoardConfig, GameState};
///
/// let mut board = Board::new(BoardConfig::new(1, 1, 0).unwrap());
/// assert_eq!(board.reveal(0, 0), 1);
/// assert_eq!(board.state(), GameState::Win);
/// ```
#[derive(Debug, Clone)]
pub struct Board {
    config: BoardConfig,
    cells: Vec<Cell>,
    state: GameState,
    revealed_count: usize,
    mines_placed: bool,
    rng: Pcg32,
}

impl Board {
    /// Creates a board with a random seed.
    ///
    /// For deterministic mine placement, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new(config: BoardConfig) -> Self {
        Self::with_seed(config, rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic mine placement.
    #[must_use]
    pub fn with_seed(config: BoardConfig, seed: BoardSeed) -> Self {
        Self {
            config,
            cells: vec![Cell::default(); config.cells()],
            state: GameState::InProgress,
            revealed_count: 0,
            mines_placed: false,
            rng: Pcg32::from_seed(seed.0),
        }
    }

    /// Creates a board with mines at fixed positions.
    ///
    /// The mine count of `config` is ignored; the board's mine count is the
    /// number of distinct in-range positions given. At least one cell always
    /// stays safe: positions past `width * height - 1` mines are ignored. No
    /// safe-opening guarantee applies since mines are already placed.
    ///
    /// # Example
    ///
    /// ```
    /// use qsweeper_engine::{Board, BoardConfig};
    ///
    /// let config = BoardConfig::new(3, 3, 0).unwrap();
    /// let board = Board::with_mines(config, &[(0, 0)]);
    /// assert_eq!(board.mines(), 1);
    /// assert_eq!(board.cell(1, 1).adjacent_mines(), 1);
    /// ```
    #[must_use]
    pub fn with_mines(config: BoardConfig, mines: &[(usize, usize)]) -> Self {
        let mut board = Self::with_seed(config, BoardSeed([0; 16]));
        let max_mines = config.cells() - 1;
        let mut count = 0;
        for &(row, col) in mines {
            if count == max_mines {
                break;
            }
            if let Some(index) = board.index(row, col)
                && !board.cells[index].mine
            {
                board.cells[index].mine = true;
                count += 1;
            }
        }
        board.config = BoardConfig::from_layout(config.width(), config.height(), count);
        board.compute_adjacent_mines();
        board.mines_placed = true;
        board
    }

    #[must_use]
    pub const fn config(&self) -> &BoardConfig {
        &self.config
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.config.width()
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.config.height()
    }

    #[must_use]
    pub const fn mines(&self) -> usize {
        self.config.mines()
    }

    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// Number of safe cells revealed so far.
    ///
    /// A revealed mine ends the game and is not counted.
    #[must_use]
    pub const fn revealed_count(&self) -> usize {
        self.revealed_count
    }

    /// Returns whether mines have been placed (after the first effective reveal).
    #[must_use]
    pub const fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    /// Bounds check only.
    #[must_use]
    pub const fn is_valid(&self, row: usize, col: usize) -> bool {
        row < self.height() && col < self.width()
    }

    /// Returns the cell at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of range.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        assert!(
            self.is_valid(row, col),
            "cell ({row}, {col}) out of range for {}x{} board",
            self.width(),
            self.height()
        );
        &self.cells[row * self.width() + col]
    }

    /// Returns the cell at `(row, col)`, or `None` if out of range.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.index(row, col).map(|index| &self.cells[index])
    }

    /// Returns the position offset by `(dr, dc)` from `(row, col)` if it is on the board.
    #[must_use]
    pub fn offset(&self, row: usize, col: usize, dr: isize, dc: isize) -> Option<(usize, usize)> {
        let row = row.checked_add_signed(dr)?;
        let col = col.checked_add_signed(dc)?;
        self.is_valid(row, col).then_some((row, col))
    }

    /// Returns the in-range positions among the 8 surrounding cells.
    #[must_use]
    pub fn neighbors(&self, row: usize, col: usize) -> ArrayVec<(usize, usize), 8> {
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&(dr, dc)| self.offset(row, col, dr, dc))
            .collect()
    }

    /// Iterates over all positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> + use<> {
        let width = self.width();
        (0..self.height()).flat_map(move |row| (0..width).map(move |col| (row, col)))
    }

    /// Iterates over the positions that can still be revealed (neither revealed nor flagged).
    pub fn hidden_positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.positions()
            .filter(|&(row, col)| self.cell(row, col).is_hidden())
    }

    /// Reveals the cell at `(row, col)` and returns how many cells were newly revealed.
    ///
    /// - On the first effective reveal, mines are placed (see the type-level docs).
    /// - Revealing a mine reveals only that cell, returns 1 and ends the game with
    ///   [`GameState::Loss`].
    /// - Revealing a zero-count cell cascades to its neighbors until the opened
    ///   area is bordered by numbered cells.
    /// - When every safe cell is revealed the game ends with [`GameState::Win`].
    pub fn reveal(&mut self, row: usize, col: usize) -> usize {
        if self.state.is_terminal() {
            return 0;
        }
        let Some(index) = self.index(row, col) else {
            return 0;
        };
        if !self.cells[index].is_hidden() {
            return 0;
        }

        if !self.mines_placed {
            self.place_mines(row, col);
        }

        if self.cells[index].mine {
            self.cells[index].revealed = true;
            self.state = GameState::Loss;
            return 1;
        }

        let newly_revealed = self.flood_reveal(row, col);
        if self.revealed_count == self.config.safe_cells() {
            self.state = GameState::Win;
        }
        newly_revealed
    }

    /// Toggles a flag on a hidden cell. Returns whether the cell changed.
    ///
    /// Flagged cells cannot be revealed until unflagged.
    pub fn toggle_flag(&mut self, row: usize, col: usize) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        let Some(index) = self.index(row, col) else {
            return false;
        };
        let cell = &mut self.cells[index];
        if cell.revealed {
            return false;
        }
        cell.flagged = !cell.flagged;
        true
    }

    /// Renders the board as text, one line per row.
    ///
    /// Uses [`Cell::symbol`] for each cell. With `show_mines`, unrevealed mines
    /// are drawn as `*` too.
    #[must_use]
    pub fn render_text(&self, show_mines: bool) -> String {
        let mut text = String::with_capacity(self.height() * (self.width() * 2 + 1));
        for row in 0..self.height() {
            for col in 0..self.width() {
                let cell = self.cell(row, col);
                let symbol = if show_mines && cell.mine {
                    '*'
                } else {
                    cell.symbol()
                };
                if col > 0 {
                    text.push(' ');
                }
                text.push(symbol);
            }
            text.push('\n');
        }
        text
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        self.is_valid(row, col).then(|| row * self.width() + col)
    }

    fn place_mines(&mut self, first_row: usize, first_col: usize) {
        let candidates = self
            .positions()
            .filter(|&(row, col)| row.abs_diff(first_row) > 1 || col.abs_diff(first_col) > 1)
            .collect::<Vec<_>>();
        // BoardConfig guarantees the mines fit outside any 3x3 opening.
        let mines = self.mines();
        debug_assert!(candidates.len() >= mines);
        for &(row, col) in candidates.choose_multiple(&mut self.rng, mines) {
            let index = row * self.width() + col;
            self.cells[index].mine = true;
        }
        self.compute_adjacent_mines();
        self.mines_placed = true;
    }

    fn compute_adjacent_mines(&mut self) {
        for (row, col) in self.positions() {
            let index = row * self.width() + col;
            if self.cells[index].mine {
                continue;
            }
            let count = self
                .neighbors(row, col)
                .into_iter()
                .filter(|&(r, c)| self.cell(r, c).mine)
                .fold(0_u8, |count, _| count + 1);
            self.cells[index].adjacent_mines = count;
        }
    }

    /// Reveals a safe cell and everything its zero-count region opens up.
    ///
    /// Cells are marked revealed when pushed, so each cell enters the worklist
    /// at most once.
    fn flood_reveal(&mut self, row: usize, col: usize) -> usize {
        let mut newly_revealed = 0;
        let mut stack = vec![(row, col)];
        self.mark_revealed(row, col);
        newly_revealed += 1;

        while let Some((row, col)) = stack.pop() {
            if self.cell(row, col).adjacent_mines != 0 {
                continue;
            }
            for (r, c) in self.neighbors(row, col) {
                let neighbor = self.cell(r, c);
                if !neighbor.is_hidden() || neighbor.mine {
                    continue;
                }
                self.mark_revealed(r, c);
                newly_revealed += 1;
                stack.push((r, c));
            }
        }
        newly_revealed
    }

    fn mark_revealed(&mut self, row: usize, col: usize) {
        let index = row * self.width() + col;
        self.cells[index].revealed = true;
        self.revealed_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(width: usize, height: usize, mines: usize) -> BoardConfig {
        BoardConfig::new(width, height, mines).unwrap()
    }

    fn seed(n: u8) -> BoardSeed {
        BoardSeed([n; 16])
    }

    fn count_revealed_safe(board: &Board) -> usize {
        board
            .positions()
            .filter(|&(r, c)| {
                let cell = board.cell(r, c);
                cell.is_revealed() && !cell.is_mine()
            })
            .count()
    }

    fn count_mines(board: &Board) -> usize {
        board
            .positions()
            .filter(|&(r, c)| board.cell(r, c).is_mine())
            .count()
    }

    #[test]
    fn test_single_cell_board_wins_immediately() {
        let mut board = Board::new(config(1, 1, 0));
        assert_eq!(board.reveal(0, 0), 1);
        assert_eq!(board.state(), GameState::Win);
        assert_eq!(board.revealed_count(), 1);
    }

    #[test]
    fn test_first_reveal_is_safe_opening() {
        for n in 0..=255 {
            for (first_row, first_col) in [(0, 0), (2, 3), (4, 4), (0, 4)] {
                let mut board = Board::with_seed(config(5, 5, 16), seed(n));
                let revealed = board.reveal(first_row, first_col);
                assert!(revealed >= 1);
                assert_ne!(board.state(), GameState::Loss);
                assert_eq!(count_mines(&board), 16);

                let first = board.cell(first_row, first_col);
                assert!(!first.is_mine());
                assert_eq!(first.adjacent_mines(), 0);
                for (r, c) in board.neighbors(first_row, first_col) {
                    assert!(!board.cell(r, c).is_mine());
                }
            }
        }
    }

    #[test]
    fn test_adjacent_counts_match_layout() {
        let mut board = Board::with_seed(config(6, 6, 8), seed(7));
        board.reveal(3, 3);
        for (row, col) in board.positions() {
            let cell = board.cell(row, col);
            if cell.is_mine() {
                continue;
            }
            let expected = board
                .neighbors(row, col)
                .into_iter()
                .filter(|&(r, c)| board.cell(r, c).is_mine())
                .count();
            assert_eq!(usize::from(cell.adjacent_mines()), expected);
        }
    }

    #[test]
    fn test_cascade_opens_zero_region() {
        // . . . .
        // . . . .
        // . . 1 1
        // . . 1 *
        let mut board = Board::with_mines(config(4, 4, 0), &[(3, 3)]);
        assert_eq!(board.reveal(0, 0), 15);
        assert_eq!(board.state(), GameState::Win);
        assert_eq!(board.revealed_count(), 15);
        assert!(!board.cell(3, 3).is_revealed());
    }

    #[test]
    fn test_cascade_stops_at_numbers() {
        // . 1 *
        // . 1 1
        // . . .
        let mut board = Board::with_mines(config(3, 3, 0), &[(0, 2)]);
        assert_eq!(board.reveal(1, 1), 1);
        assert_eq!(board.cell(1, 1).adjacent_mines(), 1);
        assert_eq!(board.state(), GameState::InProgress);

        assert_eq!(board.reveal(2, 0), 7);
        assert_eq!(board.revealed_count(), 8);
        assert_eq!(board.state(), GameState::Win);
    }

    #[test]
    fn test_reveal_mine_is_loss() {
        let mut board = Board::with_mines(config(3, 3, 0), &[(1, 1)]);
        assert_eq!(board.reveal(1, 1), 1);
        assert_eq!(board.state(), GameState::Loss);
        assert!(board.cell(1, 1).is_revealed());
        assert_eq!(board.revealed_count(), 0);

        // Terminal boards ignore further reveals.
        assert_eq!(board.reveal(0, 0), 0);
        assert!(!board.cell(0, 0).is_revealed());
    }

    #[test]
    fn test_invalid_reveals_are_noops() {
        let mut board = Board::with_mines(config(3, 3, 0), &[(0, 0)]);
        assert_eq!(board.reveal(3, 0), 0);
        assert_eq!(board.reveal(0, 3), 0);
        assert_eq!(board.reveal(usize::MAX, usize::MAX), 0);

        assert_eq!(board.reveal(1, 1), 1);
        assert_eq!(board.reveal(1, 1), 0);

        assert!(board.toggle_flag(2, 2));
        assert_eq!(board.reveal(2, 2), 0);
        assert!(board.cell(2, 2).is_flagged());
        assert!(!board.toggle_flag(1, 1));
        assert!(board.toggle_flag(2, 2));
        assert!(board.reveal(2, 2) > 0);
    }

    #[test]
    fn test_out_of_range_reveal_does_not_place_mines() {
        let mut board = Board::with_seed(config(4, 4, 2), seed(1));
        assert_eq!(board.reveal(10, 10), 0);
        assert!(!board.mines_placed());
        board.reveal(0, 0);
        assert!(board.mines_placed());
    }

    #[test]
    fn test_revealed_count_matches_cells() {
        for n in 0..64 {
            let mut board = Board::with_seed(config(6, 5, 6), seed(n));
            let mut order = board.positions().collect::<Vec<_>>();
            let shift = usize::from(n) % order.len();
            order.rotate_left(shift);
            for (row, col) in order {
                board.reveal(row, col);
                assert_eq!(board.revealed_count(), count_revealed_safe(&board));
                assert!(board.revealed_count() <= board.config().safe_cells());
                if board.state().is_terminal() {
                    break;
                }
            }
        }
    }

    #[test]
    fn test_hidden_positions_excludes_flags_and_revealed() {
        let mut board = Board::with_mines(config(3, 1, 0), &[(0, 2)]);
        board.toggle_flag(0, 1);
        board.reveal(0, 0);
        assert_eq!(board.hidden_positions().collect::<Vec<_>>(), vec![(0, 2)]);
    }

    #[test]
    fn test_neighbors_clamped_to_edges() {
        let board = Board::new(config(3, 3, 0));
        assert_eq!(board.neighbors(0, 0).len(), 3);
        assert_eq!(board.neighbors(0, 1).len(), 5);
        assert_eq!(board.neighbors(1, 1).len(), 8);
    }

    #[test]
    fn test_get_out_of_range() {
        let board = Board::with_mines(config(3, 2, 0), &[(1, 2)]);
        assert!(board.get(1, 2).is_some_and(Cell::is_mine));
        assert!(board.get(0, 0).is_some_and(|cell| !cell.is_mine()));
        assert!(board.get(2, 0).is_none());
        assert!(board.get(0, 3).is_none());
    }

    #[test]
    fn test_with_mines_keeps_one_safe_cell() {
        let mut board = Board::with_mines(config(2, 2, 0), &[(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert_eq!(board.mines(), 3);
        assert_eq!(count_mines(&board), 3);
        assert!(!board.cell(1, 1).is_mine());
        assert_eq!(board.reveal(1, 1), 1);
        assert_eq!(board.state(), GameState::Win);

        let board = Board::with_mines(config(1, 1, 0), &[(0, 0)]);
        assert_eq!(board.mines(), 0);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let mut board1 = Board::with_seed(config(8, 8, 10), seed(42));
        let mut board2 = Board::with_seed(config(8, 8, 10), seed(42));
        board1.reveal(4, 4);
        board2.reveal(4, 4);
        assert_eq!(board1.render_text(true), board2.render_text(true));
    }

    #[test]
    fn test_render_text() {
        let mut board = Board::with_mines(config(3, 2, 0), &[(0, 2)]);
        board.reveal(1, 0);
        assert_eq!(board.render_text(false), ". 1 #\n. 1 #\n");
        assert_eq!(board.render_text(true), ". 1 *\n. 1 #\n");
    }
}
