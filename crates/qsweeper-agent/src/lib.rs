//! Tabular Q-learning agent that learns Minesweeper through self-play.
//!
//! # How Learning Works
//!
//! 1. **Observe** - For every hidden cell, describe its 8 neighbors (off-board,
//!    hidden, or revealed count)
//! 2. **Canonicalize** - Reduce the description under the 8 rotations and
//!    reflections of the square, producing a [`StateKey`]
//! 3. **Act** - Pick a cell epsilon-greedily by the Q-value of its key
//! 4. **Reward** - Score the reveal (loss, win, or cells opened)
//! 5. **Update** - Apply the Bellman backup to the chosen key
//!
//! # Architecture
//!
//! ```text
//! Board (qsweeper-engine)
//!     ↓ neighborhood of each hidden cell
//! Neighborhood → StateKey (canonical under the dihedral group)
//!     ↓ looked up in
//! QTable (StateKey → expected reward)
//!     ↓ ranks actions for
//! QLearningAgent (epsilon-greedy, Bellman update)
//!     ↓ reports
//! TrainingProgress / TrainingReport / EvaluationReport
//! ```
//!
//! The state key only sees the local 3×3 window around a candidate cell. This
//! loses information, but it keeps the table small (a few thousand keys) and
//! lets experience from one part of the board transfer to every other part
//! and orientation.
//!
//! # Example
//!
//! ```
//! use qsweeper_agent::{AgentParams, Headless, QLearningAgent};
//! use qsweeper_engine::BoardConfig;
//!
//! let config = BoardConfig::new(4, 4, 2).unwrap();
//! let mut agent = QLearningAgent::with_seed(AgentParams::default(), 7).unwrap();
//!
//! let report = agent.train(500, config, |_progress, _table| {});
//! assert_eq!(report.episodes, 500);
//! assert!(!agent.q_table().is_empty());
//!
//! let evaluation = agent.test(20, config, &mut Headless, None);
//! assert_eq!(evaluation.episodes(), 20);
//! ```
//!
//! # Current Limitations
//!
//! - **Local view only**: Two cells with identical 3×3 surroundings always share a
//!   value, even when the wider board makes one of them provably safe
//! - **No flagging**: The agent never flags mines; flags only exist for manual play
//! - **Fixed reward shape**: The reward shaping ([`RewardParams`]) is a heuristic,
//!   not a tuned optimum

pub use self::{agent::*, params::*, q_table::*, report::*, state_key::*, visualizer::*};

mod agent;
mod params;
mod q_table;
mod report;
mod state_key;
mod visualizer;
