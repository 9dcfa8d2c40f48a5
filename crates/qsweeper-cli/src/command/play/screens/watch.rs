use std::{
    sync::mpsc::{self, TryRecvError},
    thread,
    time::Duration,
};

use crossterm::event::{Event, KeyCode};
use qsweeper_agent::{EpisodeOutcome, EvaluationReport, QLearningAgent, Visualizer};
use qsweeper_engine::{Board, BoardConfig, GameState};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout},
    style::{Color, Style},
    text::{Line, Text},
    widgets::Block,
};

use crate::ui::widgets::{Banner, BoardDisplay, StatsDisplay, color, style};

/// Update sent from the agent thread to the screen.
#[derive(Debug)]
enum AgentMessage {
    NewGame { episode: usize, board: Board },
    Moved(Board),
    GameOver(EpisodeOutcome),
    Finished(EvaluationReport),
}

/// Forwards board snapshots over a channel.
///
/// Sends never block; if the screen has gone away the snapshots are dropped.
#[derive(Debug)]
struct ChannelVisualizer {
    tx: mpsc::Sender<AgentMessage>,
    next_episode: usize,
}

impl Visualizer for ChannelVisualizer {
    fn show_board(&mut self, board: &Board) {
        let _ = self.tx.send(AgentMessage::NewGame {
            episode: self.next_episode,
            board: board.clone(),
        });
        self.next_episode += 1;
    }

    fn redraw(&mut self, board: &Board) {
        let _ = self.tx.send(AgentMessage::Moved(board.clone()));
    }

    fn episode_finished(&mut self, _episode: usize, outcome: &EpisodeOutcome) {
        let _ = self.tx.send(AgentMessage::GameOver(*outcome));
    }
}

fn agent_thread(
    mut agent: QLearningAgent,
    config: BoardConfig,
    episodes: usize,
    delay: Duration,
    tx: &mpsc::Sender<AgentMessage>,
) {
    let mut visualizer = ChannelVisualizer {
        tx: tx.clone(),
        next_episode: 0,
    };
    let delay = (!delay.is_zero()).then_some(delay);
    let report = agent.test(episodes, config, &mut visualizer, delay);
    let _ = tx.send(AgentMessage::Finished(report));
}

/// Live view of the agent's test games.
///
/// The agent plays on its own thread; this screen only drains snapshots on
/// every tick and draws the most recent one.
#[derive(Debug)]
pub struct WatchScreen {
    board: Option<Board>,
    episode: usize,
    episodes: usize,
    wins: usize,
    losses: usize,
    report: Option<EvaluationReport>,
    agent_stopped: bool,
    is_exiting: bool,
    rx: mpsc::Receiver<AgentMessage>,
}

impl WatchScreen {
    pub fn new(
        agent: QLearningAgent,
        config: BoardConfig,
        episodes: usize,
        delay: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || agent_thread(agent, config, episodes, delay, &tx));
        Self::with_receiver(rx, episodes)
    }

    fn with_receiver(rx: mpsc::Receiver<AgentMessage>, episodes: usize) -> Self {
        Self {
            board: None,
            episode: 0,
            episodes,
            wins: 0,
            losses: 0,
            report: None,
            agent_stopped: false,
            is_exiting: false,
            rx,
        }
    }

    pub fn is_exiting(&self) -> bool {
        self.is_exiting
    }

    pub fn into_report(self) -> Option<EvaluationReport> {
        self.report
    }

    pub fn handle_event(&mut self, event: &Event) {
        if let Some(event) = event.as_key_press_event()
            && matches!(event.code, KeyCode::Char('q') | KeyCode::Esc)
        {
            self.is_exiting = true;
        }
    }

    pub fn update(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(message) => self.apply(message),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.agent_stopped = self.report.is_none();
                    break;
                }
            }
        }
    }

    fn apply(&mut self, message: AgentMessage) {
        match message {
            AgentMessage::NewGame { episode, board } => {
                self.episode = episode + 1;
                self.board = Some(board);
            }
            AgentMessage::Moved(board) => self.board = Some(board),
            AgentMessage::GameOver(outcome) => match outcome.state {
                GameState::Win => self.wins += 1,
                GameState::Loss => self.losses += 1,
                GameState::InProgress => {}
            },
            AgentMessage::Finished(report) => self.report = Some(report),
        }
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        let state = self.board.as_ref().map(Board::state);
        let border_style = match state {
            None | Some(GameState::InProgress) => color::WHITE,
            Some(GameState::Win) => color::GREEN,
            Some(GameState::Loss) => color::RED,
        };

        let played = self.wins + self.losses;
        #[expect(clippy::cast_precision_loss)]
        let win_rate = if played == 0 {
            0.0
        } else {
            self.wins as f64 / played as f64 * 100.0
        };
        let stats = StatsDisplay::new()
            .row("GAME:", format!("{}/{}", self.episode, self.episodes))
            .empty_row()
            .row("WINS:", self.wins)
            .row("LOSSES:", self.losses)
            .row("WIN RATE:", format!("{win_rate:.1}%"))
            .block(
                Block::bordered()
                    .title(Line::from("AGENT").centered())
                    .border_style(border_style)
                    .style(style::DEFAULT),
            );

        let help_text = if self.report.is_some() {
            "All games played | q (Quit)"
        } else if self.agent_stopped {
            "Agent stopped unexpectedly | q (Quit)"
        } else {
            "Controls: q (Quit)"
        };
        let help_text = Text::from(help_text)
            .style(Style::default().fg(Color::DarkGray))
            .centered();

        let Some(board) = &self.board else {
            let [stats_area, help_area] = Layout::vertical([
                Constraint::Length(stats.height()),
                Constraint::Length(1),
            ])
            .areas(frame.area());
            let [stats_area] = Layout::horizontal([Constraint::Length(stats.width())])
                .flex(Flex::Center)
                .areas(stats_area);
            frame.render_widget(stats, stats_area);
            frame.render_widget(help_text, help_area);
            return;
        };

        let board_display = BoardDisplay::new(board)
            .show_mines(board.state().is_terminal())
            .block(
                Block::bordered()
                    .title(Line::from("BOARD").centered())
                    .border_style(border_style)
                    .style(style::DEFAULT),
            );

        let main_height = u16::max(board_display.height(), stats.height());
        let [main_area, help_area] =
            Layout::vertical([Constraint::Length(main_height), Constraint::Length(1)])
                .areas(frame.area());
        let [board_area, stats_area] = Layout::horizontal([
            Constraint::Length(board_display.width()),
            Constraint::Length(stats.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(main_area);

        let board_width = board_display.width();
        frame.render_widget(board_display, board_area);
        frame.render_widget(stats, stats_area);
        frame.render_widget(help_text, help_area);

        if self.report.is_some() {
            let style = Style::new().fg(color::BLACK).bg(color::YELLOW);
            frame.render_widget(Banner::new("FINISHED", style).min_width(board_width), board_area);
        }
    }
}
