use crossterm::event::{Event, KeyCode};
use qsweeper_engine::{Board, BoardConfig, BoardSeed, GameState};
use rand::Rng as _;
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout},
    style::{Color, Style},
    text::{Line, Text},
    widgets::Block,
};

use crate::ui::widgets::{Banner, BoardDisplay, StatsDisplay, color, style};

#[derive(Debug)]
pub struct ManualPlayScreen {
    config: BoardConfig,
    seed: BoardSeed,
    board: Board,
    cursor: (usize, usize),
    games: usize,
    wins: usize,
    is_exiting: bool,
}

impl ManualPlayScreen {
    pub fn new(config: BoardConfig, seed: Option<BoardSeed>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        Self {
            config,
            seed,
            board: Board::with_seed(config, seed),
            cursor: (config.height() / 2, config.width() / 2),
            games: 0,
            wins: 0,
            is_exiting: false,
        }
    }

    pub fn is_exiting(&self) -> bool {
        self.is_exiting
    }

    fn new_game(&mut self) {
        self.seed = rand::rng().random();
        self.board = Board::with_seed(self.config, self.seed);
    }

    fn move_cursor(&mut self, dr: isize, dc: isize) {
        let (row, col) = self.cursor;
        if let Some(pos) = self.board.offset(row, col, dr, dc) {
            self.cursor = pos;
        }
    }

    fn reveal(&mut self) {
        let (row, col) = self.cursor;
        let was_terminal = self.board.state().is_terminal();
        self.board.reveal(row, col);
        if !was_terminal && self.board.state().is_terminal() {
            self.games += 1;
            if self.board.state().is_win() {
                self.wins += 1;
            }
        }
    }

    pub fn handle_event(&mut self, event: &Event) {
        let Some(event) = event.as_key_press_event() else {
            return;
        };
        match event.code {
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(0, -1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(0, 1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1, 0),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1, 0),
            KeyCode::Char(' ') | KeyCode::Enter => self.reveal(),
            KeyCode::Char('f') => {
                let (row, col) = self.cursor;
                self.board.toggle_flag(row, col);
            }
            KeyCode::Char('n') => self.new_game(),
            KeyCode::Char('q') | KeyCode::Esc => self.is_exiting = true,
            _ => {}
        }
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        let state = self.board.state();
        let border_style = match state {
            GameState::InProgress => color::WHITE,
            GameState::Win => color::GREEN,
            GameState::Loss => color::RED,
        };
        let flags = self
            .board
            .positions()
            .filter(|&(row, col)| self.board.cell(row, col).is_flagged())
            .count();

        let (row, col) = self.cursor;
        let board = BoardDisplay::new(&self.board)
            .cursor(row, col)
            .show_mines(state.is_terminal())
            .block(
                Block::bordered()
                    .title(Line::from("MINESWEEPER").centered())
                    .border_style(border_style)
                    .style(style::DEFAULT),
            );
        let stats = StatsDisplay::new()
            .row("MINES:", self.board.mines())
            .row("FLAGS:", flags)
            .row(
                "OPENED:",
                format!("{}/{}", self.board.revealed_count(), self.config.safe_cells()),
            )
            .empty_row()
            .row("GAMES:", self.games)
            .row("WINS:", self.wins)
            .block(
                Block::bordered()
                    .title(Line::from("STATS").centered())
                    .border_style(border_style)
                    .style(style::DEFAULT),
            );

        let help_text = match state {
            GameState::InProgress => {
                "Controls: ←↓↑→/hjkl (Move) | Space (Reveal) | f (Flag) | n (New) | q (Quit)"
            }
            GameState::Win | GameState::Loss => "Controls: n (New game) | q (Quit)",
        };
        let help_text = Text::from(help_text)
            .style(Style::default().fg(Color::DarkGray))
            .centered();
        let seed_text = Text::from(format!("Seed: {}", self.seed))
            .style(Style::default().fg(Color::DarkGray))
            .centered();

        let main_height = u16::max(board.height(), stats.height());
        let [main_area, help_area, seed_area] = Layout::vertical([
            Constraint::Length(main_height),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());
        let [board_area, stats_area] = Layout::horizontal([
            Constraint::Length(board.width()),
            Constraint::Length(stats.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(main_area);

        let board_width = board.width();
        frame.render_widget(board, board_area);
        frame.render_widget(stats, stats_area);
        frame.render_widget(help_text, help_area);
        frame.render_widget(seed_text, seed_area);

        let banner = match state {
            GameState::InProgress => None,
            GameState::Win => Some(("YOU WIN!", Style::new().fg(color::BLACK).bg(color::GREEN))),
            GameState::Loss => Some(("GAME OVER", Style::new().fg(color::WHITE).bg(color::RED))),
        };
        if let Some((text, style)) = banner {
            frame.render_widget(Banner::new(text, style).min_width(board_width), board_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEvent, KeyModifiers};

    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn screen() -> ManualPlayScreen {
        let config = BoardConfig::new(5, 4, 3).unwrap();
        ManualPlayScreen::new(config, Some(BoardSeed::from_bytes([7; 16])))
    }

    #[test]
    fn test_cursor_starts_centered_and_stays_on_board() {
        let mut screen = screen();
        assert_eq!(screen.cursor, (2, 2));
        for _ in 0..10 {
            screen.handle_event(&key(KeyCode::Left));
            screen.handle_event(&key(KeyCode::Char('k')));
        }
        assert_eq!(screen.cursor, (0, 0));
        for _ in 0..10 {
            screen.handle_event(&key(KeyCode::Char('l')));
            screen.handle_event(&key(KeyCode::Down));
        }
        assert_eq!(screen.cursor, (3, 4));
    }

    #[test]
    fn test_first_reveal_is_safe() {
        let mut screen = screen();
        screen.handle_event(&key(KeyCode::Char(' ')));
        assert!(screen.board.cell(2, 2).is_revealed());
        assert!(!screen.board.state().is_loss());
    }

    #[test]
    fn test_flag_blocks_reveal() {
        let mut screen = screen();
        screen.handle_event(&key(KeyCode::Char('f')));
        assert!(screen.board.cell(2, 2).is_flagged());
        screen.handle_event(&key(KeyCode::Enter));
        assert!(!screen.board.cell(2, 2).is_revealed());
        screen.handle_event(&key(KeyCode::Char('f')));
        assert!(!screen.board.cell(2, 2).is_flagged());
    }

    #[test]
    fn test_finished_game_is_counted_once() {
        let mut screen = screen();
        'outer: for row in 0..4 {
            for col in 0..5 {
                screen.cursor = (row, col);
                screen.reveal();
                if screen.board.state().is_terminal() {
                    break 'outer;
                }
            }
        }
        assert!(screen.board.state().is_terminal());
        screen.reveal();
        assert_eq!(screen.games, 1);

        screen.handle_event(&key(KeyCode::Char('n')));
        assert!(screen.board.state().is_in_progress());
        assert_eq!(screen.board.revealed_count(), 0);
        assert_eq!(screen.games, 1);
    }

    #[test]
    fn test_quit() {
        let mut screen = screen();
        assert!(!screen.is_exiting());
        screen.handle_event(&key(KeyCode::Char('q')));
        assert!(screen.is_exiting());
    }
}
