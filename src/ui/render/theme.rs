use ratatui::style::{Color, Style};

pub(super) const UI_MARGIN: u16 = 1;
pub(super) const STATUS_HEIGHT: u16 = 9;
pub(super) const MESSAGES_HEIGHT: u16 = 10;
pub(super) const CHART_MIN_HEIGHT: u16 = 8;
pub(super) const BAR_WIDTH: u16 = 1;
pub(super) const BAR_GAP: u16 = 0;

pub(super) const PANEL_BORDER_RGB: (u8, u8, u8) = (0xe5, 0xe7, 0xeb);
pub(super) const PANEL_MUTED_RGB: (u8, u8, u8) = (0xd1, 0xd5, 0xdb);
pub(super) const ACCENT_RATE_RGB: (u8, u8, u8) = (0x60, 0xa5, 0xfa);
pub(super) const ACCENT_GREEN_RGB: (u8, u8, u8) = (0x22, 0xc5, 0x5e);
pub(super) const ACCENT_RED_RGB: (u8, u8, u8) = (0xef, 0x44, 0x44);

pub(super) const fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

pub(super) fn fg(color: (u8, u8, u8)) -> Style {
    Style::default().fg(rgb(color))
}
