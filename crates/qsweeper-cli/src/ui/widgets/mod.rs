use ratatui::{layout::Rect, widgets::Block as BlockWidget};

pub use self::{banner::*, board_display::*, cell_display::*, stats_display::*};

mod banner;
mod board_display;
mod cell_display;
mod stats_display;

pub mod color {
    use ratatui::style::Color;

    pub const BLACK: Color = Color::Rgb(0, 0, 0);
    pub const WHITE: Color = Color::Rgb(255, 255, 255);
    pub const GRAY: Color = Color::Rgb(127, 127, 127);
    pub const DARK_GRAY: Color = Color::Rgb(64, 64, 64);
    pub const RED: Color = Color::Rgb(255, 0, 0);
    pub const GREEN: Color = Color::Rgb(0, 255, 0);
    pub const YELLOW: Color = Color::Rgb(255, 255, 0);

    /// Foreground colors for revealed counts 1 to 8.
    pub const COUNTS: [Color; 8] = [
        Color::Rgb(64, 128, 255),
        Color::Rgb(0, 192, 0),
        Color::Rgb(255, 64, 64),
        Color::Rgb(160, 64, 255),
        Color::Rgb(192, 96, 0),
        Color::Rgb(0, 192, 192),
        Color::Rgb(255, 255, 255),
        Color::Rgb(192, 192, 192),
    ];
}

pub mod style {
    use ratatui::style::{Color, Style};

    use crate::ui::widgets::color;

    const fn fg_bg(fg: Color, bg: Color) -> Style {
        Style::new().fg(fg).bg(bg)
    }

    pub const DEFAULT: Style = fg_bg(color::WHITE, color::BLACK);
    pub const HIDDEN: Style = fg_bg(color::WHITE, color::GRAY);
    pub const FLAG: Style = fg_bg(color::RED, color::GRAY);
    pub const WRONG_FLAG: Style = fg_bg(color::YELLOW, color::GRAY);
    pub const HIDDEN_MINE: Style = fg_bg(color::BLACK, color::GRAY);
    pub const REVEALED: Style = fg_bg(color::WHITE, color::DARK_GRAY);
    pub const MINE: Style = fg_bg(color::WHITE, color::RED);

    /// Style of a revealed cell showing `count` (1 to 8) adjacent mines.
    pub fn count(count: u8) -> Style {
        let index = usize::from(count.clamp(1, 8) - 1);
        fg_bg(color::COUNTS[index], color::DARK_GRAY)
    }
}

fn block_vertical_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.height - inner_rect.height
}

fn block_horizontal_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.width - inner_rect.width
}
