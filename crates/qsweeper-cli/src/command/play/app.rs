use std::time::Duration;

use crossterm::event::Event;
use qsweeper_agent::{EvaluationReport, QLearningAgent};
use qsweeper_engine::{BoardConfig, BoardSeed};
use ratatui::Frame;

use crate::{
    command::play::screens::Screen,
    tui::{App, Tui},
};

const TICK_RATE: f64 = 30.0;

#[derive(Debug)]
pub struct PlayApp {
    screen: Screen,
}

impl PlayApp {
    pub fn manual(config: BoardConfig, seed: Option<BoardSeed>) -> Self {
        Self {
            screen: Screen::manual(config, seed),
        }
    }

    pub fn watch(
        agent: QLearningAgent,
        config: BoardConfig,
        episodes: usize,
        delay: Duration,
    ) -> Self {
        Self {
            screen: Screen::watch(agent, config, episodes, delay),
        }
    }

    pub fn into_report(self) -> Option<EvaluationReport> {
        self.screen.into_report()
    }
}

impl App for PlayApp {
    fn init(&mut self, tui: &mut Tui) {
        // Manual play only changes on input.
        if self.screen.needs_ticks() {
            tui.set_tick_rate(TICK_RATE);
        }
    }

    fn should_exit(&self) -> bool {
        self.screen.should_exit()
    }

    fn handle_event(&mut self, event: &Event) {
        self.screen.handle_event(event);
    }

    fn draw(&self, frame: &mut Frame) {
        self.screen.draw(frame);
    }

    fn update(&mut self) {
        self.screen.update();
    }
}
