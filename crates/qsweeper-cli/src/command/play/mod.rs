use std::time::Duration;

use qsweeper_agent::{EvaluationReport, QLearningAgent};
use qsweeper_engine::{BoardConfig, BoardSeed};

use crate::{
    command::{BoardArg, play::app::PlayApp},
    tui::Tui,
};

mod app;
mod screens;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    board: BoardArg,
    /// Seed of the first game (32 hex digits) [default: random]
    #[arg(long)]
    seed: Option<BoardSeed>,
}

pub(crate) fn run_manual(arg: &PlayArg) -> anyhow::Result<()> {
    let config = arg.board.to_config()?;
    let mut app = PlayApp::manual(config, arg.seed);
    Tui::new().run(&mut app)?;
    Ok(())
}

/// Shows the agent's test games live.
///
/// Returns `None` if the user quit before every game was played.
pub(crate) fn run_watch(
    agent: QLearningAgent,
    config: BoardConfig,
    episodes: usize,
    delay: Duration,
) -> anyhow::Result<Option<EvaluationReport>> {
    let mut app = PlayApp::watch(agent, config, episodes, delay);
    Tui::new().run(&mut app)?;
    Ok(app.into_report())
}
