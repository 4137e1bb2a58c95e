//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`source`]: Source code display with syntax highlighting
//! - [`program`]: Compiled instructions of the running sequence, instruction pointer marked
//! - [`tape`]: Tape cells around the observed cursor, with every live cursor marked
//! - [`stack`]: Evaluation stack and the move in progress
//! - [`status`]: Status bar with keybindings and execution state
//!
//! Each pane module exports a primary `render_*` function. Panes draw from a
//! recorded [`Snapshot`](crate::snapshot::Snapshot), never from the live engine,
//! so stepping backward shows exactly what was there.

pub mod program;
pub mod source;
pub mod stack;
pub mod status;
pub mod tape;

pub use program::render_program_pane;
pub use source::render_source_pane;
pub use stack::render_stack_pane;
pub use status::{render_status_bar, StatusRenderData};
pub use tape::render_tape_pane;

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders},
};

/// Bordered, titled pane frame
pub(crate) fn pane_block(title: &str, is_focused: bool) -> Block<'_> {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Rows available inside a bordered pane, min 1
pub(crate) fn visible_height(area: Rect) -> usize {
    area.height.saturating_sub(2).max(1) as usize
}

/// Clamp a scroll offset so the last page stays full
pub(crate) fn clamp_scroll(offset: &mut usize, total: usize, visible: usize) {
    if total > visible {
        *offset = (*offset).min(total - visible);
    } else {
        *offset = 0;
    }
}

/// Offset that keeps `row` on screen, moving as little as possible
pub(crate) fn follow(offset: &mut usize, row: usize, visible: usize) {
    if row < *offset {
        *offset = row;
    } else if row >= *offset + visible {
        *offset = row + 1 - visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_scroll() {
        let mut offset = 50;
        clamp_scroll(&mut offset, 20, 5);
        assert_eq!(offset, 15);

        clamp_scroll(&mut offset, 3, 5);
        assert_eq!(offset, 0);
    }

    #[test]
    fn test_follow() {
        let mut offset = 0;
        follow(&mut offset, 7, 5);
        assert_eq!(offset, 3);
        follow(&mut offset, 4, 5);
        assert_eq!(offset, 3);
        follow(&mut offset, 1, 5);
        assert_eq!(offset, 1);
    }
}
