use std::{
    env,
    path::{Path, PathBuf},
};

use chrono::Utc;
use qsweeper_agent::{LoadOutcome, QLearningAgent, QTable, TrainingProgress, TrainingReport};
use qsweeper_engine::BoardConfig;

use crate::{
    command::{AgentArg, BoardArg, DEFAULT_Q_TABLE_PATH, QTableArg},
    model::training_summary::TrainingSummary,
    util,
};

const DEFAULT_EPISODES: usize = 1_000_000;
const DEFAULT_CHECKPOINT_EVERY: usize = 50_000;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    #[clap(flatten)]
    pub(super) board: BoardArg,
    #[clap(flatten)]
    pub(super) agent: AgentArg,
    #[clap(flatten)]
    pub(super) q_table: QTableArg,
    /// Number of training episodes
    #[arg(long, default_value_t = DEFAULT_EPISODES)]
    pub(super) episodes: usize,
    /// Save the Q-table every N episodes during training (0 disables)
    #[arg(long, default_value_t = DEFAULT_CHECKPOINT_EVERY)]
    pub(super) checkpoint_every: usize,
    /// Write a JSON training summary to this file ("-" for stdout)
    #[arg(long)]
    pub(super) summary: Option<PathBuf>,
}

impl Default for TrainArg {
    fn default() -> Self {
        Self {
            board: BoardArg::default(),
            agent: AgentArg::default(),
            q_table: QTableArg::default(),
            episodes: DEFAULT_EPISODES,
            checkpoint_every: DEFAULT_CHECKPOINT_EVERY,
            summary: None,
        }
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = arg.board.to_config()?;
    let mut agent = arg.agent.build_agent()?;
    load_for_training(&mut agent, &arg.q_table.path);
    train_and_save(&mut agent, config, arg)?;
    Ok(())
}

/// Loads an existing table so training continues from it.
///
/// A missing or unreadable table is not an error here; training starts fresh.
pub(super) fn load_for_training(agent: &mut QLearningAgent, path: &Path) {
    match agent.load_q_table(path) {
        LoadOutcome::Loaded { states } => {
            eprintln!("Loaded Q-table: {} ({states} states)", path.display());
        }
        LoadOutcome::Missing => {
            eprintln!("No Q-table at {}, starting fresh", path.display());
        }
        LoadOutcome::Corrupt(err) => {
            eprintln!(
                "Ignoring unreadable Q-table, starting fresh: {:#}",
                anyhow::Error::new(err)
            );
        }
    }
}

pub(super) fn train_and_save(
    agent: &mut QLearningAgent,
    config: BoardConfig,
    arg: &TrainArg,
) -> anyhow::Result<TrainingReport> {
    eprintln!(
        "Training on {}x{} board with {} mines for {} episodes...",
        config.width(),
        config.height(),
        config.mines(),
        arg.episodes
    );
    let path = &arg.q_table.path;
    let mut checkpoint = Checkpoint::new(path, arg.checkpoint_every);
    let report = agent.train(arg.episodes, config, |progress, table| {
        eprintln!(
            "Episode {}/{} - Win Rate: {:.2}% - Epsilon: {:.4} - Q-Table size: {}",
            progress.episode,
            progress.episodes,
            progress.win_rate(),
            progress.exploration_rate,
            progress.q_table_size
        );
        checkpoint.on_progress(progress, table);
    });

    eprintln!("Training completed.");
    eprintln!("  Episodes: {}", report.episodes);
    eprintln!("  Wins: {} ({:.2}%)", report.wins, report.win_rate());
    eprintln!("  Final epsilon: {:.4}", report.final_exploration_rate);
    eprintln!("  Q-table: {} states", report.q_table_size);

    save_final(agent.q_table(), path)?;
    eprintln!("Q-table saved: {}", path.display());

    if let Some(summary_path) = &arg.summary {
        let summary = TrainingSummary {
            trained_at: Utc::now(),
            q_table: path.clone(),
            board: config,
            params: *agent.params(),
            rewards: *agent.rewards(),
            seed: arg.agent.seed,
            report,
        };
        let output = (summary_path.as_os_str() != "-").then_some(summary_path.as_path());
        util::save_json(&summary, output)?;
        eprintln!("Training summary saved: {}", summary_path.display());
    }

    Ok(report)
}

/// Periodic Q-table saves during training.
///
/// A failed save is logged and attempted again at the next progress report.
#[derive(Debug)]
struct Checkpoint<'a> {
    path: &'a Path,
    every: usize,
    last_saved: usize,
}

impl<'a> Checkpoint<'a> {
    fn new(path: &'a Path, every: usize) -> Self {
        Self {
            path,
            every,
            last_saved: 0,
        }
    }

    /// Saves `table` if a checkpoint is due. Returns whether a save succeeded.
    fn on_progress(&mut self, progress: &TrainingProgress, table: &QTable) -> bool {
        if self.every == 0
            || progress.episode == progress.episodes
            || progress.episode - self.last_saved < self.every
        {
            return false;
        }
        match table.save(self.path) {
            Ok(()) => {
                self.last_saved = progress.episode;
                eprintln!(
                    "Checkpoint saved: {} (episode {})",
                    self.path.display(),
                    progress.episode
                );
                true
            }
            Err(err) => {
                eprintln!(
                    "Checkpoint failed, retrying at the next report: {:#}",
                    anyhow::Error::new(err)
                );
                false
            }
        }
    }
}

/// Saves the trained table to `path`.
///
/// If that fails, a copy is written to the temp directory so the run is not
/// lost, and the error names it.
fn save_final(table: &QTable, path: &Path) -> anyhow::Result<()> {
    let Err(err) = table.save(path) else {
        return Ok(());
    };
    let err = anyhow::Error::new(err);
    let rescue = rescue_path(path);
    let message = match table.save(&rescue) {
        Ok(()) => format!(
            "Failed to save Q-table: {} (a copy was saved to {})",
            path.display(),
            rescue.display()
        ),
        Err(rescue_err) => format!(
            "Failed to save Q-table: {} (copy to {} also failed: {:#})",
            path.display(),
            rescue.display(),
            anyhow::Error::new(rescue_err)
        ),
    };
    Err(err.context(message))
}

fn rescue_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| DEFAULT_Q_TABLE_PATH.into(), |name| name.to_string_lossy());
    env::temp_dir().join(format!("qsweeper-rescue-{name}"))
}
