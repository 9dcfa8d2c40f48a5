use serde::{Deserialize, Serialize};

/// Error returned when board dimensions or the mine count are unusable.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardConfigError {
    #[display("board must be at least 1x1, got {width}x{height}")]
    EmptyBoard { width: usize, height: usize },
    #[display("too many mines: {mines} requested, at most {max} fit outside the opening area")]
    TooManyMines { mines: usize, max: usize },
}

/// Board dimensions and mine count.
///
/// Mines are never placed on the first revealed cell or its 8 neighbors, so a
/// config only allows as many mines as fit outside the largest possible
/// opening area (`min(3, width) * min(3, height)` cells). This implies
/// `mines < width * height`.
///
/// # Example
///
/// ```
/// use qsweeper_engine::BoardConfig;
///
/// let config = BoardConfig::new(6, 6, 4).unwrap();
/// assert_eq!(config.safe_cells(), 32);
///
/// assert!(BoardConfig::new(1, 1, 0).is_ok());
/// assert!(BoardConfig::new(2, 2, 3).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBoardConfig")]
pub struct BoardConfig {
    width: usize,
    height: usize,
    mines: usize,
}

#[derive(Deserialize)]
struct RawBoardConfig {
    width: usize,
    height: usize,
    mines: usize,
}

impl TryFrom<RawBoardConfig> for BoardConfig {
    type Error = BoardConfigError;

    fn try_from(raw: RawBoardConfig) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.height, raw.mines)
    }
}

impl BoardConfig {
    pub fn new(width: usize, height: usize, mines: usize) -> Result<Self, BoardConfigError> {
        if width == 0 || height == 0 {
            return Err(BoardConfigError::EmptyBoard { width, height });
        }
        let max = Self::max_mines(width, height);
        if mines > max {
            return Err(BoardConfigError::TooManyMines { mines, max });
        }
        Ok(Self {
            width,
            height,
            mines,
        })
    }

    /// Config for a board whose mines were laid out by hand.
    ///
    /// Skips the opening-area limit since no first-click placement happens.
    pub(crate) const fn from_layout(width: usize, height: usize, mines: usize) -> Self {
        Self {
            width,
            height,
            mines,
        }
    }

    /// Largest mine count accepted for a `width`×`height` board.
    #[must_use]
    pub fn max_mines(width: usize, height: usize) -> usize {
        let opening = usize::min(3, width) * usize::min(3, height);
        (width * height).saturating_sub(opening)
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub const fn mines(&self) -> usize {
        self.mines
    }

    #[must_use]
    pub const fn cells(&self) -> usize {
        self.width * self.height
    }

    /// Number of cells that must be revealed to win.
    #[must_use]
    pub const fn safe_cells(&self) -> usize {
        self.cells() - self.mines
    }
}
