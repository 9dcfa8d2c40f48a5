use std::{iter, path::Path, thread, time::Duration};

use qsweeper_engine::{Board, BoardConfig, GameState};
use rand::{
    Rng, SeedableRng as _,
    seq::{IndexedRandom as _, SliceRandom as _},
};
use rand_pcg::Pcg32;

use crate::{
    AgentParams, AgentParamsError, EpisodeOutcome, EvaluationReport, PROGRESS_INTERVAL, QTable,
    QTableError, RewardParams, StateKey, TrainingProgress, TrainingReport, Visualizer, state_key,
};

/// Result of [`QLearningAgent::load_q_table`].
#[derive(Debug, derive_more::IsVariant)]
pub enum LoadOutcome {
    /// The table was read; it holds `states` entries.
    Loaded { states: usize },
    /// No file exists at the path; the agent starts from an empty table.
    Missing,
    /// The file exists but could not be read; the agent starts from an empty table.
    Corrupt(QTableError),
}

/// Epsilon-greedy tabular Q-learning agent.
///
/// Every hidden cell is an action, valued by the Q-value of its canonical
/// [`StateKey`]. The agent owns its random number generator, so an agent
/// built with [`QLearningAgent::with_seed`] replays the same games.
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    params: AgentParams,
    rewards: RewardParams,
    exploration_rate: f64,
    q_table: QTable,
    rng: Pcg32,
}

impl QLearningAgent {
    /// Creates an agent with an empty Q-table and a randomly seeded generator.
    pub fn new(params: AgentParams) -> Result<Self, AgentParamsError> {
        Self::with_rng(params, Pcg32::from_rng(&mut rand::rng()))
    }

    /// Creates an agent whose games are fully determined by `seed`.
    pub fn with_seed(params: AgentParams, seed: u64) -> Result<Self, AgentParamsError> {
        Self::with_rng(params, Pcg32::seed_from_u64(seed))
    }

    fn with_rng(params: AgentParams, rng: Pcg32) -> Result<Self, AgentParamsError> {
        params.validate()?;
        Ok(Self {
            params,
            rewards: RewardParams::default(),
            exploration_rate: params.exploration_rate,
            q_table: QTable::new(),
            rng,
        })
    }

    #[must_use]
    pub fn with_rewards(mut self, rewards: RewardParams) -> Self {
        self.rewards = rewards;
        self
    }

    #[must_use]
    pub const fn params(&self) -> &AgentParams {
        &self.params
    }

    #[must_use]
    pub const fn rewards(&self) -> &RewardParams {
        &self.rewards
    }

    /// Current epsilon. Starts at [`AgentParams::exploration_rate`] and decays during training.
    #[must_use]
    pub const fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }

    #[must_use]
    pub const fn q_table(&self) -> &QTable {
        &self.q_table
    }

    /// Canonical key of the cell at `(row, col)`.
    #[must_use]
    #[expect(clippy::unused_self)]
    pub fn state_key(&self, board: &Board, row: usize, col: usize) -> StateKey {
        state_key(board, row, col)
    }

    /// Picks the next cell to reveal.
    ///
    /// With probability epsilon a uniformly random hidden cell is returned.
    /// Otherwise the hidden cells are shuffled and the first one with the
    /// strictly highest Q-value wins, so ties break randomly.
    ///
    /// Returns `None` if the game is over or no hidden cell remains.
    pub fn choose_action(&mut self, board: &Board) -> Option<(usize, usize)> {
        if board.state().is_terminal() {
            return None;
        }
        if self.rng.random::<f64>() < self.exploration_rate {
            let actions = board.hidden_positions().collect::<Vec<_>>();
            return actions.choose(&mut self.rng).copied();
        }
        greedy_action(&self.q_table, board, &mut self.rng)
    }

    /// Applies the Bellman backup to `key`.
    ///
    /// `Q(s) ← Q(s) + α·(reward + γ·maxNext − Q(s))`, where `maxNext` is the
    /// best Q-value among the hidden cells of `next_board`, floored at `0.0`,
    /// and exactly `0.0` once the game has ended.
    pub fn update_q_value(&mut self, key: StateKey, reward: f64, next_board: &Board) {
        let old = self.q_table.get(&key);
        let max_next = self.max_next_q(next_board);
        let target = reward + self.params.discount_factor * max_next;
        let new = old + self.params.learning_rate * (target - old);
        self.q_table.set(key, new);
    }

    fn max_next_q(&self, board: &Board) -> f64 {
        match board.state() {
            GameState::InProgress => board
                .hidden_positions()
                .map(|(row, col)| self.q_table.get(&state_key(board, row, col)))
                .fold(0.0, f64::max),
            GameState::Win | GameState::Loss => 0.0,
        }
    }

    /// Plays `episodes` learning games on fresh boards of `config`.
    ///
    /// Epsilon decays after every episode. `on_progress` is called every
    /// [`PROGRESS_INTERVAL`] episodes with the win rate of that window and the
    /// table learned so far, which is the point to checkpoint it.
    pub fn train<F>(
        &mut self,
        episodes: usize,
        config: BoardConfig,
        mut on_progress: F,
    ) -> TrainingReport
    where
        F: FnMut(&TrainingProgress, &QTable),
    {
        let mut wins = 0;
        let mut window_wins = 0;
        for episode in 1..=episodes {
            let mut board = Board::with_seed(config, self.rng.random());
            self.play_training_episode(&mut board);
            if board.state().is_win() {
                wins += 1;
                window_wins += 1;
            }
            self.decay_exploration_rate();

            if episode % PROGRESS_INTERVAL == 0 {
                let progress = TrainingProgress {
                    episode,
                    episodes,
                    window_episodes: PROGRESS_INTERVAL,
                    window_wins,
                    exploration_rate: self.exploration_rate,
                    q_table_size: self.q_table.len(),
                };
                on_progress(&progress, &self.q_table);
                window_wins = 0;
            }
        }
        TrainingReport {
            episodes,
            wins,
            final_exploration_rate: self.exploration_rate,
            q_table_size: self.q_table.len(),
        }
    }

    fn play_training_episode(&mut self, board: &mut Board) {
        while let Some((row, col)) = self.choose_action(board) {
            let key = state_key(board, row, col);
            let revealed = board.reveal(row, col);
            let reward = self.rewards.reward(board.state(), revealed);
            self.update_q_value(key, reward, board);
        }
    }

    fn decay_exploration_rate(&mut self) {
        self.exploration_rate = f64::max(
            self.params.min_exploration_rate,
            self.exploration_rate * self.params.exploration_decay,
        );
    }

    /// Plays `episodes` games with epsilon = 0, without learning.
    ///
    /// The agent's exploration rate is left untouched. `visualizer` sees the
    /// initial board of every game and the board after every move; if
    /// `delay` is set, the agent sleeps that long after each move.
    pub fn test<V>(
        &mut self,
        episodes: usize,
        config: BoardConfig,
        visualizer: &mut V,
        delay: Option<Duration>,
    ) -> EvaluationReport
    where
        V: Visualizer + ?Sized,
    {
        let mut outcomes = Vec::with_capacity(episodes);
        for episode in 0..episodes {
            let mut board = Board::with_seed(config, self.rng.random());
            visualizer.show_board(&board);
            let outcome = play_greedy_episode(&self.q_table, &mut board, &mut self.rng, |board| {
                visualizer.redraw(board);
                if let Some(delay) = delay {
                    thread::sleep(delay);
                }
            });
            visualizer.episode_finished(episode, &outcome);
            outcomes.push(outcome);
        }
        EvaluationReport { outcomes }
    }

    /// Plays `episodes` greedy games spread over `jobs` threads.
    ///
    /// Same policy as [`QLearningAgent::test`], without visualization. Each
    /// worker draws its boards from its own generator, seeded from the agent's.
    pub fn evaluate(
        &mut self,
        episodes: usize,
        config: BoardConfig,
        jobs: usize,
    ) -> EvaluationReport {
        let mut outcomes = vec![EpisodeOutcome::UNPLAYED; episodes];
        if episodes == 0 {
            return EvaluationReport { outcomes };
        }
        let chunk_size = episodes.div_ceil(jobs.max(1));
        let seeds = iter::repeat_with(|| self.rng.random::<u64>())
            .take(episodes.div_ceil(chunk_size))
            .collect::<Vec<_>>();

        let q_table = &self.q_table;
        thread::scope(|s| {
            for (chunk, seed) in outcomes.chunks_mut(chunk_size).zip(seeds) {
                s.spawn(move || {
                    let mut rng = Pcg32::seed_from_u64(seed);
                    for slot in chunk {
                        let mut board = Board::with_seed(config, rng.random());
                        *slot = play_greedy_episode(q_table, &mut board, &mut rng, |_| {});
                    }
                });
            }
        });
        EvaluationReport { outcomes }
    }

    /// Writes the Q-table to `path`.
    pub fn save_q_table(&self, path: &Path) -> Result<(), QTableError> {
        self.q_table.save(path)
    }

    /// Replaces the Q-table with the one stored at `path`.
    ///
    /// Never fails: a missing or unreadable file leaves the agent with an
    /// empty table, and the returned [`LoadOutcome`] says which case applied.
    pub fn load_q_table(&mut self, path: &Path) -> LoadOutcome {
        match QTable::open(path) {
            Ok(table) => {
                let states = table.len();
                self.q_table = table;
                LoadOutcome::Loaded { states }
            }
            Err(err) => {
                self.q_table = QTable::new();
                if err.is_not_found() {
                    LoadOutcome::Missing
                } else {
                    LoadOutcome::Corrupt(err)
                }
            }
        }
    }
}

fn greedy_action<R>(q_table: &QTable, board: &Board, rng: &mut R) -> Option<(usize, usize)>
where
    R: Rng + ?Sized,
{
    let mut actions = board.hidden_positions().collect::<Vec<_>>();
    actions.shuffle(rng);

    let mut best = None;
    let mut best_value = f64::NEG_INFINITY;
    for &(row, col) in &actions {
        let value = q_table.get(&state_key(board, row, col));
        if value > best_value {
            best_value = value;
            best = Some((row, col));
        }
    }
    best.or_else(|| actions.first().copied())
}

fn play_greedy_episode<R, F>(
    q_table: &QTable,
    board: &mut Board,
    rng: &mut R,
    mut after_move: F,
) -> EpisodeOutcome
where
    R: Rng + ?Sized,
    F: FnMut(&Board),
{
    let mut moves = 0;
    while board.state() == GameState::InProgress {
        let Some((row, col)) = greedy_action(q_table, board, rng) else {
            break;
        };
        board.reveal(row, col);
        moves += 1;
        after_move(board);
    }
    EpisodeOutcome {
        state: board.state(),
        moves,
        revealed: board.revealed_count(),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::q_table::tests::temp_path;

    fn greedy_params() -> AgentParams {
        AgentParams {
            exploration_rate: 0.0,
            min_exploration_rate: 0.0,
            ..AgentParams::default()
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_new_rejects_invalid_params() {
        let params = AgentParams {
            learning_rate: 2.0,
            ..AgentParams::default()
        };
        assert!(QLearningAgent::new(params).is_err());
        assert!(QLearningAgent::new(AgentParams::default()).is_ok());
    }

    #[test]
    fn test_update_terminal_loss() {
        let mut agent = QLearningAgent::with_seed(AgentParams::default(), 1).unwrap();
        let config = BoardConfig::new(3, 3, 0).unwrap();
        let mut board = Board::with_mines(config, &[(0, 0)]);
        let key = agent.state_key(&board, 0, 0);
        board.reveal(0, 0);
        assert!(board.state().is_loss());

        // Q = 0 + 0.1 * (-100 + 0.9 * 0 - 0)
        agent.update_q_value(key, -100.0, &board);
        assert_close(agent.q_table().get(&key), -10.0);
        // Q = -10 + 0.1 * (-100 - (-10))
        agent.update_q_value(key, -100.0, &board);
        assert_close(agent.q_table().get(&key), -19.0);
    }

    #[test]
    fn test_update_uses_best_next_value() {
        let mut agent = QLearningAgent::with_seed(AgentParams::default(), 1).unwrap();
        let config = BoardConfig::new(3, 3, 0).unwrap();
        let mut board = Board::with_mines(config, &[(0, 2)]);
        board.reveal(1, 1);
        assert!(board.state().is_in_progress());

        let next_key = agent.state_key(&board, 2, 0);
        agent.q_table.set(next_key, 40.0);
        let key = "????????".parse::<StateKey>().unwrap();
        // Q = 0 + 0.1 * (1 + 0.9 * 40 - 0)
        agent.update_q_value(key, 1.0, &board);
        assert_close(agent.q_table().get(&key), 3.7);
    }

    #[test]
    fn test_max_next_is_floored_at_zero() {
        let mut agent = QLearningAgent::with_seed(AgentParams::default(), 1).unwrap();
        let config = BoardConfig::new(3, 3, 0).unwrap();
        let mut board = Board::with_mines(config, &[(0, 2)]);
        board.reveal(1, 1);
        for (row, col) in board.hidden_positions().collect::<Vec<_>>() {
            let key = agent.state_key(&board, row, col);
            agent.q_table.set(key, -50.0);
        }
        let key = "????????".parse::<StateKey>().unwrap();
        agent.update_q_value(key, 1.0, &board);
        assert_close(agent.q_table().get(&key), 0.1);
    }

    #[test]
    fn test_choose_action_none_when_finished() {
        let mut agent = QLearningAgent::with_seed(AgentParams::default(), 1).unwrap();
        let mut board = Board::new(BoardConfig::new(1, 1, 0).unwrap());
        assert_eq!(agent.choose_action(&board), Some((0, 0)));
        board.reveal(0, 0);
        assert!(board.state().is_win());
        assert_eq!(agent.choose_action(&board), None);
    }

    #[test]
    fn test_choose_action_prefers_highest_value() {
        let mut agent = QLearningAgent::with_seed(greedy_params(), 3).unwrap();
        let config = BoardConfig::new(3, 3, 0).unwrap();
        let mut board = Board::with_mines(config, &[(0, 2)]);
        board.reveal(1, 1);

        let corner = agent.state_key(&board, 2, 0);
        agent.q_table.set(corner, 50.0);
        for _ in 0..50 {
            let (row, col) = agent.choose_action(&board).unwrap();
            assert_eq!(agent.state_key(&board, row, col), corner);
            assert!(!board.cell(row, col).is_revealed());
        }
    }

    #[test]
    fn test_choose_action_breaks_ties_randomly() {
        let mut agent = QLearningAgent::with_seed(greedy_params(), 5).unwrap();
        let board = Board::with_mines(BoardConfig::new(3, 3, 0).unwrap(), &[]);
        let mut chosen = (0..200)
            .filter_map(|_| agent.choose_action(&board))
            .collect::<Vec<_>>();
        chosen.sort_unstable();
        chosen.dedup();
        assert!(chosen.len() > 1);
    }

    #[test]
    fn test_exploration_decays_to_floor() {
        let mut agent = QLearningAgent::with_seed(AgentParams::default(), 9).unwrap();
        let config = BoardConfig::new(4, 4, 2).unwrap();

        agent.train(100, config, |_, _| {});
        assert_close(agent.exploration_rate(), 0.9995_f64.powi(100));

        let params = AgentParams {
            exploration_decay: 0.5,
            ..AgentParams::default()
        };
        let mut agent = QLearningAgent::with_seed(params, 9).unwrap();
        let report = agent.train(50, config, |_, _| {});
        assert_close(report.final_exploration_rate, 0.01);
    }

    #[test]
    fn test_train_reports_progress_every_interval() {
        let mut agent = QLearningAgent::with_seed(AgentParams::default(), 11).unwrap();
        let config = BoardConfig::new(4, 4, 2).unwrap();
        let mut reports = Vec::new();
        let report = agent.train(2500, config, |p, table| {
            assert_eq!(p.q_table_size, table.len());
            reports.push(*p);
        });

        assert_eq!(
            reports.iter().map(|p| p.episode).collect::<Vec<_>>(),
            [1000, 2000]
        );
        assert!(reports.iter().all(|p| p.window_wins <= p.window_episodes));
        assert_eq!(report.episodes, 2500);
        assert!(report.wins <= 2500);
        assert_eq!(report.q_table_size, agent.q_table().len());
        assert!(!agent.q_table().is_empty());
    }

    #[test]
    fn test_seeded_agents_are_deterministic() {
        let config = BoardConfig::new(4, 4, 2).unwrap();
        let mut a = QLearningAgent::with_seed(AgentParams::default(), 42).unwrap();
        let mut b = QLearningAgent::with_seed(AgentParams::default(), 42).unwrap();
        assert_eq!(a.train(300, config, |_, _| {}), b.train(300, config, |_, _| {}));
        assert_eq!(a.q_table(), b.q_table());
    }

    #[test]
    fn test_test_mode_keeps_exploration_and_table() {
        struct Recorder {
            shown: usize,
            redraws: usize,
            finished: Vec<usize>,
        }
        impl Visualizer for Recorder {
            fn show_board(&mut self, board: &Board) {
                assert_eq!(board.revealed_count(), 0);
                self.shown += 1;
            }
            fn redraw(&mut self, _board: &Board) {
                self.redraws += 1;
            }
            fn episode_finished(&mut self, episode: usize, outcome: &EpisodeOutcome) {
                assert!(outcome.state.is_terminal());
                self.finished.push(episode);
            }
        }

        let mut agent = QLearningAgent::with_seed(AgentParams::default(), 13).unwrap();
        let config = BoardConfig::new(4, 4, 2).unwrap();
        agent.train(200, config, |_, _| {});
        let epsilon = agent.exploration_rate();
        let table = agent.q_table().clone();

        let mut recorder = Recorder {
            shown: 0,
            redraws: 0,
            finished: Vec::new(),
        };
        let report = agent.test(5, config, &mut recorder, None);

        assert_eq!(report.episodes(), 5);
        assert_eq!(recorder.shown, 5);
        assert_eq!(recorder.finished, [0, 1, 2, 3, 4]);
        assert_eq!(
            recorder.redraws,
            report.outcomes.iter().map(|o| o.moves).sum::<usize>()
        );
        assert_eq!(report.wins() + report.losses(), 5);
        assert_close(agent.exploration_rate(), epsilon);
        assert_eq!(agent.q_table(), &table);
    }

    #[test]
    fn test_evaluate_covers_all_episodes() {
        let mut agent = QLearningAgent::with_seed(AgentParams::default(), 17).unwrap();
        let config = BoardConfig::new(4, 4, 2).unwrap();
        for jobs in [0, 1, 3, 8, 100] {
            let report = agent.evaluate(37, config, jobs);
            assert_eq!(report.episodes(), 37);
            assert!(report.outcomes.iter().all(|o| o.moves > 0));
            assert_eq!(report.stalled(), 0);
        }
        assert_eq!(agent.evaluate(0, config, 4).episodes(), 0);
    }

    #[test]
    fn test_trained_agent_beats_untrained() {
        let config = BoardConfig::new(4, 4, 2).unwrap();
        let mut untrained = QLearningAgent::with_seed(AgentParams::default(), 21).unwrap();
        let mut trained = QLearningAgent::with_seed(AgentParams::default(), 21).unwrap();
        trained.train(20_000, config, |_, _| {});

        let before = untrained.evaluate(3000, config, 4);
        let after = trained.evaluate(3000, config, 4);
        assert!(
            after.win_rate() > before.win_rate(),
            "trained {:.2}% vs untrained {:.2}%",
            after.win_rate(),
            before.win_rate()
        );
    }

    #[test]
    fn test_learns_on_5x5_with_5_mines() {
        let config = BoardConfig::new(5, 5, 5).unwrap();
        let mut agent = QLearningAgent::with_seed(AgentParams::default(), 2024).unwrap();
        agent.train(50_000, config, |_, _| {});
        assert!(!agent.q_table().is_empty());

        let report = agent.test(200, config, &mut crate::Headless, None);
        assert!(report.win_rate() > 0.0);
    }

    #[test]
    fn test_save_then_load_restores_table() {
        let mut agent = QLearningAgent::with_seed(AgentParams::default(), 23).unwrap();
        agent.train(500, BoardConfig::new(4, 4, 2).unwrap(), |_, _| {});

        let path = temp_path("agent");
        agent.save_q_table(&path).unwrap();
        let mut restored = QLearningAgent::with_seed(AgentParams::default(), 0).unwrap();
        let outcome = restored.load_q_table(&path);
        fs::remove_file(&path).unwrap();

        assert!(matches!(outcome, LoadOutcome::Loaded { states } if states == agent.q_table().len()));
        assert_eq!(restored.q_table(), agent.q_table());
    }

    #[test]
    fn test_failed_save_keeps_table() {
        let mut agent = QLearningAgent::with_seed(AgentParams::default(), 31).unwrap();
        agent.train(300, BoardConfig::new(4, 4, 2).unwrap(), |_, _| {});
        let before = agent.q_table().clone();

        let path = temp_path("no-such-dir").join("table.json");
        let err = agent.save_q_table(&path).unwrap_err();
        assert!(matches!(err, QTableError::Io { .. }));
        assert_eq!(agent.q_table(), &before);

        let retry = temp_path("retry");
        agent.save_q_table(&retry).unwrap();
        let reopened = QTable::open(&retry).unwrap();
        fs::remove_file(&retry).unwrap();
        assert_eq!(reopened, before);
    }

    #[test]
    fn test_load_falls_back_to_empty_table() {
        let mut agent = QLearningAgent::with_seed(AgentParams::default(), 29).unwrap();
        agent.train(100, BoardConfig::new(4, 4, 2).unwrap(), |_, _| {});
        assert!(agent.load_q_table(&temp_path("absent")).is_missing());
        assert!(agent.q_table().is_empty());

        let path = temp_path("garbage");
        fs::write(&path, "not json").unwrap();
        let outcome = agent.load_q_table(&path);
        fs::remove_file(&path).unwrap();
        assert!(outcome.is_corrupt());
        assert!(agent.q_table().is_empty());
    }
}
