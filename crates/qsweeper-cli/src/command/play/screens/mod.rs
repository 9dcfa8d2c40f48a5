use std::time::Duration;

use crossterm::event::Event;
use qsweeper_agent::{EvaluationReport, QLearningAgent};
use qsweeper_engine::{BoardConfig, BoardSeed};
use ratatui::Frame;

use crate::command::play::screens::{manual::ManualPlayScreen, watch::WatchScreen};

mod manual;
mod watch;

#[derive(Debug)]
pub enum Screen {
    Manual(ManualPlayScreen),
    Watch(WatchScreen),
}

impl Screen {
    pub fn manual(config: BoardConfig, seed: Option<BoardSeed>) -> Self {
        Screen::Manual(ManualPlayScreen::new(config, seed))
    }

    pub fn watch(
        agent: QLearningAgent,
        config: BoardConfig,
        episodes: usize,
        delay: Duration,
    ) -> Self {
        Screen::Watch(WatchScreen::new(agent, config, episodes, delay))
    }

    pub fn needs_ticks(&self) -> bool {
        matches!(self, Screen::Watch(_))
    }

    pub fn should_exit(&self) -> bool {
        match self {
            Screen::Manual(screen) => screen.is_exiting(),
            Screen::Watch(screen) => screen.is_exiting(),
        }
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        match self {
            Screen::Manual(screen) => screen.draw(frame),
            Screen::Watch(screen) => screen.draw(frame),
        }
    }

    pub fn handle_event(&mut self, event: &Event) {
        match self {
            Screen::Manual(screen) => screen.handle_event(event),
            Screen::Watch(screen) => screen.handle_event(event),
        }
    }

    pub fn update(&mut self) {
        match self {
            Screen::Manual(_) => {}
            Screen::Watch(screen) => screen.update(),
        }
    }

    pub fn into_report(self) -> Option<EvaluationReport> {
        match self {
            Screen::Manual(_) => None,
            Screen::Watch(screen) => screen.into_report(),
        }
    }
}
