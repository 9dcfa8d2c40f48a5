/// A single square of the minefield.
///
/// Cells are owned by [`Board`](crate::Board) and only change through its
/// operations; everything outside the engine sees them read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    pub(crate) mine: bool,
    pub(crate) revealed: bool,
    pub(crate) flagged: bool,
    pub(crate) adjacent_mines: u8,
}

impl Cell {
    #[must_use]
    pub const fn is_mine(&self) -> bool {
        self.mine
    }

    #[must_use]
    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    #[must_use]
    pub const fn is_flagged(&self) -> bool {
        self.flagged
    }

    /// Returns whether the cell can still be revealed (neither revealed nor flagged).
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        !self.revealed && !self.flagged
    }

    /// Number of mines in the 8 surrounding cells (0-8).
    ///
    /// Always 0 for mines and for cells of a board whose mines are not placed yet.
    #[must_use]
    pub const fn adjacent_mines(&self) -> u8 {
        self.adjacent_mines
    }

    /// Returns the character used by [`Board::render_text`](crate::Board::render_text).
    ///
    /// - `F`: flagged
    /// - `#`: hidden
    /// - `*`: revealed mine
    /// - `.`: revealed, no adjacent mines
    /// - `1`-`8`: revealed adjacent mine count
    #[must_use]
    pub fn symbol(&self) -> char {
        if self.flagged {
            'F'
        } else if !self.revealed {
            '#'
        } else if self.mine {
            '*'
        } else if self.adjacent_mines == 0 {
            '.'
        } else {
            char::from(b'0' + self.adjacent_mines)
        }
    }
}
