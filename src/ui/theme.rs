//! Colour palette shared by every pane

use ratatui::style::Color;

pub struct Theme {
    /// Plain text and tape cells without a cursor
    pub fg: Color,
    pub primary: Color,
    pub secondary: Color,
    /// Line numbers, the tape index ruler, placeholders
    pub comment: Color,
    pub success: Color,
    pub error: Color,

    // Source highlighting
    pub keyword: Color,
    pub string: Color,
    pub number: Color,
    pub label: Color,

    pub border_focused: Color,
    pub border_normal: Color,
    /// Background behind the next instruction and the observed cell
    pub current_line_bg: Color,

    /// The cursor whose machine is on screen
    pub cursor: Color,
    /// Any other live cursor on the same tape
    pub other_cursor: Color,
}

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    primary: Color::Rgb(137, 180, 250),
    secondary: Color::Rgb(250, 179, 135),
    comment: Color::Rgb(108, 112, 134),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),

    keyword: Color::Rgb(137, 180, 250),
    string: Color::Rgb(250, 179, 135),
    number: Color::Rgb(245, 194, 231),
    label: Color::Rgb(249, 226, 175),

    border_focused: Color::Rgb(249, 226, 175),
    border_normal: Color::Rgb(108, 112, 134),
    current_line_bg: Color::Rgb(50, 50, 70),

    cursor: Color::Rgb(166, 227, 161),
    other_cursor: Color::Rgb(148, 226, 213),
};
