use qsweeper_engine::Cell;
use ratatui::{
    prelude::{Buffer, Rect},
    style::{Modifier, Style},
    widgets::{Paragraph, Widget},
};

use crate::ui::widgets::style;

const DIGITS: [&str; 9] = ["0", "1", "2", "3", "4", "5", "6", "7", "8"];

/// A single board cell, drawn 3 columns wide.
#[derive(Debug, Clone, Copy)]
pub struct CellDisplay {
    style: Style,
    symbol: &'static str,
}

impl CellDisplay {
    pub const fn new(style: Style, symbol: &'static str) -> Self {
        Self { style, symbol }
    }

    pub const fn width() -> u16 {
        3
    }

    pub const fn height() -> u16 {
        1
    }

    /// Display for `cell`. With `show_mines`, hidden mines and wrong flags are exposed.
    pub fn from_cell(cell: &Cell, show_mines: bool) -> Self {
        if cell.is_revealed() {
            if cell.is_mine() {
                return Self::new(style::MINE, "*");
            }
            return match cell.adjacent_mines() {
                0 => Self::new(style::REVEALED, ""),
                n => Self::new(style::count(n), DIGITS[usize::from(n.min(8))]),
            };
        }
        match (cell.is_flagged(), show_mines, cell.is_mine()) {
            (true, true, false) => Self::new(style::WRONG_FLAG, "X"),
            (true, _, _) => Self::new(style::FLAG, "F"),
            (false, true, true) => Self::new(style::HIDDEN_MINE, "*"),
            (false, _, _) => Self::new(style::HIDDEN, ""),
        }
    }

    #[must_use]
    pub fn highlighted(self) -> Self {
        Self {
            style: self.style.add_modifier(Modifier::REVERSED),
            ..self
        }
    }
}

impl Widget for CellDisplay {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &CellDisplay {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        // Paragraph fills the whole area, not only the symbol's cells
        Paragraph::new(self.symbol)
            .style(self.style)
            .centered()
            .render(area, buf);
    }
}
