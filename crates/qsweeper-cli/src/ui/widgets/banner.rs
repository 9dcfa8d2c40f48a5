use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::Style,
    text::Text,
    widgets::{Block, Clear, Widget},
};

/// Three-line message box drawn centered over another widget.
#[derive(Debug)]
pub struct Banner<'a> {
    text: &'a str,
    style: Style,
    width: u16,
}

impl<'a> Banner<'a> {
    pub fn new(text: &'a str, style: Style) -> Self {
        Self {
            text,
            style,
            width: u16::try_from(text.len() + 4).unwrap_or(u16::MAX),
        }
    }

    /// Widens the banner, e.g. to cover the board it is drawn over.
    pub fn min_width(self, width: u16) -> Self {
        Self {
            width: u16::max(self.width, width),
            ..self
        }
    }
}

impl Widget for Banner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::new().style(self.style);
        let text = Text::styled(self.text, self.style).centered();
        let area = area.centered(Constraint::Length(self.width), Constraint::Length(3));
        let inner = block.inner(area);
        Clear.render(area, buf);
        block.render(area, buf);
        text.render(inner.centered_vertically(Constraint::Length(1)), buf);
    }
}
