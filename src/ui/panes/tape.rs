//! Tape pane rendering
//!
//! Shows the window of cells that fits the pane, scrolled to keep the
//! observed cursor in view. Each cell is three columns wide:
//!
//! ```text
//!   0  1  2  3  4
//!   A  a  r  o  n
//!         ▲     △1
//! ```

use super::{follow, pane_block};
use crate::snapshot::CursorSnapshot;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const CELL_WIDTH: usize = 3;

/// What sits under one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    None,
    Observed,
    Other(usize),
}

fn marker_at(view: &CursorSnapshot, cell: usize) -> Marker {
    let mut marker = Marker::None;
    for (id, (&position, &alive)) in view.tape.pointers.iter().zip(&view.tape.alive).enumerate() {
        if !alive || position != cell {
            continue;
        }
        if id == view.identifier {
            return Marker::Observed;
        }
        if marker == Marker::None {
            marker = Marker::Other(id);
        }
    }
    marker
}

/// Render the tape around the observed cursor
pub fn render_tape_pane(
    frame: &mut Frame,
    area: Rect,
    view: &CursorSnapshot,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let position = view.position().unwrap_or(0);
    let title = format!(
        " Tape: cursor {} at {} of {} cells ",
        view.identifier,
        position,
        view.tape.memory.len()
    );
    let block = pane_block(&title, is_focused);

    let columns = (area.width.saturating_sub(2) as usize / CELL_WIDTH).max(1);
    follow(scroll_offset, position, columns);
    let start = (*scroll_offset).min(view.tape.memory.len().saturating_sub(1));
    let end = (start + columns).min(view.tape.memory.len());

    let mut ruler = Vec::new();
    let mut cells = Vec::new();
    let mut markers = Vec::new();

    for index in start..end {
        let marker = marker_at(view, index);
        let cell = view.tape.memory[index].as_str();

        ruler.push(Span::styled(
            format!("{:>3}", index % 1000),
            Style::default().fg(DEFAULT_THEME.comment),
        ));

        let cell_style = match marker {
            Marker::Observed => Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.cursor)
                .add_modifier(Modifier::BOLD),
            Marker::Other(_) => Style::default().fg(DEFAULT_THEME.other_cursor),
            Marker::None => Style::default().fg(DEFAULT_THEME.fg),
        };
        cells.push(Span::styled(format!(" {} ", cell), cell_style));

        let (text, style) = match marker {
            Marker::Observed => (
                " ▲ ".to_string(),
                Style::default()
                    .fg(DEFAULT_THEME.cursor)
                    .add_modifier(Modifier::BOLD),
            ),
            Marker::Other(id) => (
                format!(" △{:<1}", id % 10),
                Style::default().fg(DEFAULT_THEME.other_cursor),
            ),
            Marker::None => ("   ".to_string(), Style::default()),
        };
        markers.push(Span::styled(text, style));
    }

    let lines = vec![Line::from(ruler), Line::from(cells), Line::from(markers)];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::TapeSnapshot;

    fn view(identifier: usize, pointers: Vec<usize>, alive: Vec<bool>) -> CursorSnapshot {
        CursorSnapshot {
            identifier,
            tape: TapeSnapshot {
                memory: "abcd".chars().map(String::from).collect(),
                pointers,
                alive,
            },
            last: None,
        }
    }

    #[test]
    fn test_observed_cursor_wins_its_cell() {
        let v = view(1, vec![2, 2, 0], vec![true, true, true]);
        assert_eq!(marker_at(&v, 2), Marker::Observed);
        assert_eq!(marker_at(&v, 0), Marker::Other(2));
        assert_eq!(marker_at(&v, 3), Marker::None);
    }

    #[test]
    fn test_dead_cursors_are_hidden() {
        let v = view(0, vec![1, 3], vec![true, false]);
        assert_eq!(marker_at(&v, 3), Marker::None);
        assert_eq!(marker_at(&v, 1), Marker::Observed);
    }
}
