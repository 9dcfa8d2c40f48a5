use std::iter;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::ui::widgets::style;

#[derive(Debug)]
enum Row {
    Empty,
    LabelValue(&'static str, String),
}

/// Column of `LABEL: value` lines.
#[derive(Debug, Default)]
pub struct StatsDisplay<'a> {
    rows: Vec<Row>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> StatsDisplay<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row<V>(mut self, label: &'static str, value: V) -> Self
    where
        V: ToString,
    {
        self.rows.push(Row::LabelValue(label, value.to_string()));
        self
    }

    pub fn empty_row(mut self) -> Self {
        self.rows.push(Row::Empty);
        self
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        22 + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        u16::try_from(self.rows.len()).unwrap_or(u16::MAX)
            + super::block_vertical_margin(self.block.as_ref())
    }
}

impl Widget for StatsDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let style = style::DEFAULT;
        let row_areas =
            Layout::vertical((0..self.rows.len()).map(|_| Constraint::Length(1))).split(area);

        for (row, area) in iter::zip(&self.rows, row_areas.iter().copied()) {
            match row {
                Row::Empty => {}
                Row::LabelValue(label, value) => {
                    let [label_area, value_area] = area.layout(&Layout::horizontal([
                        Constraint::Fill(1),
                        Constraint::Fill(1),
                    ]));
                    Line::styled(*label, style)
                        .left_aligned()
                        .render(label_area, buf);
                    Line::styled(value.as_str(), style)
                        .right_aligned()
                        .render(value_area, buf);
                }
            }
        }
    }
}
