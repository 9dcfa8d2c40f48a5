use qsweeper_engine::Board;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::ui::widgets::CellDisplay;

#[derive(Debug)]
pub struct BoardDisplay<'a> {
    board: &'a Board,
    cursor: Option<(usize, usize)>,
    show_mines: bool,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self {
            board,
            cursor: None,
            show_mines: false,
            block: None,
        }
    }

    pub fn cursor(self, row: usize, col: usize) -> Self {
        Self {
            cursor: Some((row, col)),
            ..self
        }
    }

    pub fn show_mines(self, show_mines: bool) -> Self {
        Self { show_mines, ..self }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        let cols = u16::try_from(self.board.width()).unwrap_or(u16::MAX);
        cols.saturating_mul(CellDisplay::width())
            .saturating_add(super::block_horizontal_margin(self.block.as_ref()))
    }

    pub fn height(&self) -> u16 {
        let rows = u16::try_from(self.board.height()).unwrap_or(u16::MAX);
        rows.saturating_mul(CellDisplay::height())
            .saturating_add(super::block_vertical_margin(self.block.as_ref()))
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let vertical = Layout::vertical(
            (0..self.board.height()).map(|_| Constraint::Length(CellDisplay::height())),
        );
        let horizontal = Layout::horizontal(
            (0..self.board.width()).map(|_| Constraint::Length(CellDisplay::width())),
        )
        .flex(Flex::Center);

        for (row, row_area) in vertical.split(area).iter().enumerate() {
            for (col, cell_area) in horizontal.split(*row_area).iter().enumerate() {
                let display = CellDisplay::from_cell(self.board.cell(row, col), self.show_mines);
                let display = if self.cursor == Some((row, col)) {
                    display.highlighted()
                } else {
                    display
                };
                display.render(*cell_area, buf);
            }
        }
    }
}
