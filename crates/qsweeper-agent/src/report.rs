use qsweeper_engine::GameState;
use serde::{Deserialize, Serialize};

/// Episodes between two [`TrainingProgress`] reports.
pub const PROGRESS_INTERVAL: usize = 1000;

#[expect(clippy::cast_precision_loss)]
fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Snapshot emitted every [`PROGRESS_INTERVAL`] training episodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingProgress {
    /// Number of episodes completed so far.
    pub episode: usize,
    /// Total episodes requested.
    pub episodes: usize,
    /// Episodes covered by `window_wins`.
    pub window_episodes: usize,
    /// Wins since the previous report.
    pub window_wins: usize,
    pub exploration_rate: f64,
    pub q_table_size: usize,
}

impl TrainingProgress {
    /// Win rate over the last window, in percent.
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        percentage(self.window_wins, self.window_episodes)
    }
}

/// Summary of a whole training run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub episodes: usize,
    pub wins: usize,
    pub final_exploration_rate: f64,
    pub q_table_size: usize,
}

impl TrainingReport {
    /// Win rate over all training episodes, in percent.
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        percentage(self.wins, self.episodes)
    }
}

/// Result of a single played game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeOutcome {
    /// Final state. `InProgress` means the agent ran out of actions.
    pub state: GameState,
    /// Number of reveals performed.
    pub moves: usize,
    /// Safe cells revealed when the game ended.
    pub revealed: usize,
}

impl EpisodeOutcome {
    pub(crate) const UNPLAYED: Self = Self {
        state: GameState::InProgress,
        moves: 0,
        revealed: 0,
    };
}

/// Outcomes of a batch of exploitation-only games.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub outcomes: Vec<EpisodeOutcome>,
}

impl EvaluationReport {
    #[must_use]
    pub fn episodes(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn wins(&self) -> usize {
        self.count(GameState::Win)
    }

    #[must_use]
    pub fn losses(&self) -> usize {
        self.count(GameState::Loss)
    }

    /// Games that ended without a win or loss.
    #[must_use]
    pub fn stalled(&self) -> usize {
        self.count(GameState::InProgress)
    }

    /// Win rate in percent.
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        percentage(self.wins(), self.episodes())
    }

    /// Average number of reveals per game.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn mean_moves(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        let total = self.outcomes.iter().map(|o| o.moves).sum::<usize>();
        total as f64 / self.outcomes.len() as f64
    }

    fn count(&self, state: GameState) -> usize {
        self.outcomes.iter().filter(|o| o.state == state).count()
    }
}
