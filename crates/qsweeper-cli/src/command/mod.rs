use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use qsweeper_agent::{AgentParams, QLearningAgent, RewardParams};
use qsweeper_engine::BoardConfig;

use self::{play::PlayArg, run::RunArg, test::TestArg, train::TrainArg};

mod play;
mod run;
mod train;

const DEFAULT_WIDTH: usize = 6;
const DEFAULT_HEIGHT: usize = 6;
const DEFAULT_Q_TABLE_PATH: &str = "qtable.json";

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train the agent and save its Q-table
    Train(#[clap(flatten)] TrainArg),
    /// Play test games with a trained Q-table
    Test(#[clap(flatten)] TestArg),
    /// Train, then test (default)
    Run(#[clap(flatten)] RunArg),
    /// Play Minesweeper yourself
    Play(#[clap(flatten)] PlayArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Run(RunArg::default())) {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Test(arg) => test::run(&arg)?,
        Mode::Run(arg) => run::run(&arg)?,
        Mode::Play(arg) => play::run_manual(&arg)?,
    }
    Ok(())
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BoardArg {
    /// Board width in cells
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,
    /// Board height in cells
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,
    /// Number of mines [default: one per 8 cells]
    #[arg(long)]
    mines: Option<usize>,
}

impl Default for BoardArg {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            mines: None,
        }
    }
}

impl BoardArg {
    pub(crate) fn to_config(&self) -> anyhow::Result<BoardConfig> {
        let Self {
            width,
            height,
            mines,
        } = *self;
        let mines = mines.unwrap_or(width * height / 8);
        BoardConfig::new(width, height, mines)
            .with_context(|| format!("Invalid board: {width}x{height} with {mines} mines"))
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct QTableArg {
    /// Q-table file (JSON format)
    #[arg(long = "q-table", default_value = DEFAULT_Q_TABLE_PATH)]
    path: PathBuf,
}

impl Default for QTableArg {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_Q_TABLE_PATH),
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AgentArg {
    /// Learning rate (alpha)
    #[arg(long, default_value_t = AgentParams::default().learning_rate)]
    learning_rate: f64,
    /// Discount factor (gamma)
    #[arg(long, default_value_t = AgentParams::default().discount_factor)]
    discount_factor: f64,
    /// Initial exploration rate (epsilon)
    #[arg(long, default_value_t = AgentParams::default().exploration_rate)]
    exploration_rate: f64,
    /// Epsilon decay factor applied after each training episode
    #[arg(long, default_value_t = AgentParams::default().exploration_decay)]
    exploration_decay: f64,
    /// Lower bound for epsilon
    #[arg(long, default_value_t = AgentParams::default().min_exploration_rate)]
    min_exploration_rate: f64,
    /// Reward for revealing a mine
    #[arg(long, default_value_t = RewardParams::default().loss, allow_hyphen_values = true)]
    loss_reward: f64,
    /// Reward for winning a game
    #[arg(long, default_value_t = RewardParams::default().win, allow_hyphen_values = true)]
    win_reward: f64,
    /// Reward per cell opened by a cascading reveal
    #[arg(long, default_value_t = RewardParams::default().per_cascaded_cell, allow_hyphen_values = true)]
    cascade_reward: f64,
    /// Reward for revealing a single safe cell
    #[arg(long, default_value_t = RewardParams::default().single_reveal, allow_hyphen_values = true)]
    single_reveal_reward: f64,
    /// Seed for reproducible runs [default: random]
    #[arg(long)]
    seed: Option<u64>,
}

impl Default for AgentArg {
    fn default() -> Self {
        let params = AgentParams::default();
        let rewards = RewardParams::default();
        Self {
            learning_rate: params.learning_rate,
            discount_factor: params.discount_factor,
            exploration_rate: params.exploration_rate,
            exploration_decay: params.exploration_decay,
            min_exploration_rate: params.min_exploration_rate,
            loss_reward: rewards.loss,
            win_reward: rewards.win,
            cascade_reward: rewards.per_cascaded_cell,
            single_reveal_reward: rewards.single_reveal,
            seed: None,
        }
    }
}

impl AgentArg {
    fn params(&self) -> AgentParams {
        AgentParams {
            learning_rate: self.learning_rate,
            discount_factor: self.discount_factor,
            exploration_rate: self.exploration_rate,
            exploration_decay: self.exploration_decay,
            min_exploration_rate: self.min_exploration_rate,
        }
    }

    fn rewards(&self) -> RewardParams {
        RewardParams {
            loss: self.loss_reward,
            win: self.win_reward,
            per_cascaded_cell: self.cascade_reward,
            single_reveal: self.single_reveal_reward,
        }
    }

    pub(crate) fn build_agent(&self) -> anyhow::Result<QLearningAgent> {
        let params = self.params();
        let agent = match self.seed {
            Some(seed) => QLearningAgent::with_seed(params, seed),
            None => QLearningAgent::new(params),
        }
        .context("Invalid agent parameters")?;
        Ok(agent.with_rewards(self.rewards()))
    }
}

/// Builds a test-only agent; learning parameters do not matter for greedy play.
fn build_test_agent(seed: Option<u64>) -> anyhow::Result<QLearningAgent> {
    AgentArg {
        seed,
        ..AgentArg::default()
    }
    .build_agent()
}
