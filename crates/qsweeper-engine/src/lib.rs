//! Minesweeper game engine.
//!
//! This crate owns all per-square game data and the rules that mutate it:
//!
//! - [`Cell`] - State of a single square (mine, revealed, flagged, adjacent count)
//! - [`BoardConfig`] - Validated board dimensions and mine count
//! - [`Board`] - Grid of cells, lazy mine placement, cascading reveal, win/loss
//! - [`GameState`] - Whether the game is still running, won, or lost
//! - [`BoardSeed`] - Seed for deterministic mine layouts
//!
//! # Game Flow
//!
//! 1. Create a [`Board`] from a [`BoardConfig`]
//! 2. Reveal a cell; mines are placed on this first reveal so that the clicked
//!    cell and its neighbors are always safe
//! 3. Keep revealing; zero-count cells cascade to their neighbors
//! 4. The game ends when a mine is revealed ([`GameState::Loss`]) or every
//!    safe cell is revealed ([`GameState::Win`])
//!
//! # Example
//!
//! ```
//! use qsweeper_engine::{Board, BoardConfig, GameState};
//!
//! let config = BoardConfig::new(5, 5, 3).unwrap();
//! let mut board = Board::new(config);
//!
//! let revealed = board.reveal(2, 2);
//! assert!(revealed >= 1);
//! assert_ne!(board.state(), GameState::Loss);
//! ```

pub use self::{board::*, cell::*, config::*, seed::*};

mod board;
mod cell;
mod config;
mod seed;
