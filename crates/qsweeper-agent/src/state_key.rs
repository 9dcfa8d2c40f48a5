//! Symmetry-reduced encoding of a cell's surroundings.
//!
//! A candidate cell is described by its 8 neighbors in raster order:
//!
//! ```text
//! 0 1 2      NW N NE
//! 3 . 4  =   W  .  E
//! 5 6 7      SW S SE
//! ```
//!
//! Each neighbor is off-board, hidden, or a revealed adjacent-mine count. The
//! same pattern rotated or flipped is the same situation for the agent, so
//! the key stored in the Q-table is the smallest encoding among the 8 images
//! of the pattern under the symmetries of the square.

use std::{fmt, str::FromStr};

use qsweeper_engine::{Board, NEIGHBOR_OFFSETS};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of neighbors in a [`Neighborhood`].
pub const NEIGHBOR_COUNT: usize = 8;

/// Descriptor of a neighbor position outside the board.
pub const OFF_BOARD: i8 = -2;
/// Descriptor of a neighbor that has not been revealed.
pub const HIDDEN: i8 = -1;

const OFF_BOARD_SYMBOL: u8 = b'#';
const HIDDEN_SYMBOL: u8 = b'?';

/// The 8 neighbor descriptors of a cell.
///
/// Each entry is [`OFF_BOARD`], [`HIDDEN`], or a revealed count in `0..=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Neighborhood([i8; NEIGHBOR_COUNT]);

impl Neighborhood {
    /// Index permutation for a 90° clockwise rotation.
    ///
    /// `rotated[i] = original[ROTATE_CLOCKWISE[i]]`.
    pub const ROTATE_CLOCKWISE: [usize; NEIGHBOR_COUNT] = [5, 3, 0, 6, 1, 7, 4, 2];

    /// Index permutation for a left-right flip.
    pub const FLIP: [usize; NEIGHBOR_COUNT] = [2, 1, 0, 4, 3, 7, 6, 5];

    /// Creates a neighborhood from raw descriptors.
    ///
    /// Returns `None` if any descriptor is outside `-2..=8`.
    #[must_use]
    pub fn new(descriptors: [i8; NEIGHBOR_COUNT]) -> Option<Self> {
        descriptors
            .iter()
            .all(|d| (OFF_BOARD..=8).contains(d))
            .then_some(Self(descriptors))
    }

    /// Describes the surroundings of `(row, col)` on `board`.
    #[must_use]
    pub fn from_board(board: &Board, row: usize, col: usize) -> Self {
        let descriptors = NEIGHBOR_OFFSETS.map(|(dr, dc)| {
            let cell = row
                .checked_add_signed(dr)
                .zip(col.checked_add_signed(dc))
                .and_then(|(r, c)| board.get(r, c));
            match cell {
                None => OFF_BOARD,
                Some(cell) if cell.is_revealed() => {
                    i8::try_from(cell.adjacent_mines()).unwrap_or(8)
                }
                Some(_) => HIDDEN,
            }
        });
        Self(descriptors)
    }

    #[must_use]
    pub const fn descriptors(&self) -> [i8; NEIGHBOR_COUNT] {
        self.0
    }

    #[must_use]
    pub fn rotated(self) -> Self {
        self.permuted(&Self::ROTATE_CLOCKWISE)
    }

    #[must_use]
    pub fn flipped(self) -> Self {
        self.permuted(&Self::FLIP)
    }

    /// Returns the 8 images of this neighborhood: 4 rotations and their mirrors.
    #[must_use]
    pub fn variants(self) -> [Self; 8] {
        let mut variants = [self; 8];
        let mut current = self;
        for i in 0..4 {
            variants[2 * i] = current;
            variants[2 * i + 1] = current.flipped();
            current = current.rotated();
        }
        variants
    }

    /// Encodes this exact orientation, without canonicalization.
    #[must_use]
    pub fn key(self) -> StateKey {
        StateKey(self.0.map(descriptor_symbol))
    }

    /// Returns the smallest key among all symmetric variants.
    ///
    /// Neighborhoods that are rotations or reflections of each other always
    /// share the same canonical key.
    #[must_use]
    pub fn canonical_key(self) -> StateKey {
        self.variants()
            .into_iter()
            .map(Self::key)
            .min()
            .unwrap_or_else(|| self.key())
    }

    fn permuted(self, permutation: &[usize; NEIGHBOR_COUNT]) -> Self {
        Self(permutation.map(|i| self.0[i]))
    }
}

/// Canonical key of the cell at `(row, col)`.
#[must_use]
pub fn state_key(board: &Board, row: usize, col: usize) -> StateKey {
    Neighborhood::from_board(board, row, col).canonical_key()
}

fn descriptor_symbol(descriptor: i8) -> u8 {
    match descriptor {
        OFF_BOARD => OFF_BOARD_SYMBOL,
        HIDDEN => HIDDEN_SYMBOL,
        // Neighborhood::new and from_board keep counts in 0..=8.
        n => b'0' + n.clamp(0, 8).cast_unsigned(),
    }
}

/// Q-table key: an 8-character encoding of a neighborhood.
///
/// Characters are `#` (off-board), `?` (hidden) and `0`-`8` (revealed count),
/// in raster order. Keys sort and compare as their string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateKey([u8; NEIGHBOR_COUNT]);

/// Error returned when parsing a [`StateKey`] from a string fails.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid state key {input:?}: expected {NEIGHBOR_COUNT} characters of '#', '?' or '0'-'8'")]
pub struct ParseStateKeyError {
    input: String,
}

impl StateKey {
    /// Decodes the key back into neighbor descriptors.
    #[must_use]
    pub fn neighborhood(&self) -> Neighborhood {
        Neighborhood(self.0.map(|symbol| match symbol {
            OFF_BOARD_SYMBOL => OFF_BOARD,
            HIDDEN_SYMBOL => HIDDEN,
            digit => (digit - b'0').cast_signed(),
        }))
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &symbol in &self.0 {
            write!(f, "{}", char::from(symbol))?;
        }
        Ok(())
    }
}

impl FromStr for StateKey {
    type Err = ParseStateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseStateKeyError {
            input: s.to_owned(),
        };
        let bytes: [u8; NEIGHBOR_COUNT] = s.as_bytes().try_into().map_err(|_| err())?;
        let valid = bytes
            .iter()
            .all(|&b| b == OFF_BOARD_SYMBOL || b == HIDDEN_SYMBOL || (b'0'..=b'8').contains(&b));
        if !valid {
            return Err(err());
        }
        Ok(Self(bytes))
    }
}

impl Serialize for StateKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StateKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
