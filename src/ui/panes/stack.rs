//! Evaluation stack pane

use super::{clamp_scroll, pane_block, visible_height};
use crate::memory::value::Value;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

fn value_style(value: &Value) -> Style {
    match value {
        Value::Numeric(_) => Style::default().fg(DEFAULT_THEME.number),
        Value::Character(_) => Style::default().fg(DEFAULT_THEME.string),
        Value::Boolean(_) => Style::default().fg(DEFAULT_THEME.keyword),
    }
}

/// Render the stack, top first, plus the cells left on a move in progress
pub fn render_stack_pane(
    frame: &mut Frame,
    area: Rect,
    stack: &[Value],
    pending_move: usize,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Stack ", is_focused);
    let mut items = Vec::new();

    if pending_move > 0 {
        items.push(ListItem::new(Line::from(vec![
            Span::styled(
                "moving ",
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{} more cell(s)", pending_move),
                Style::default().fg(DEFAULT_THEME.fg),
            ),
        ])));
    }

    if stack.is_empty() {
        items.push(
            ListItem::new("(empty)").style(Style::default().fg(DEFAULT_THEME.comment)),
        );
    }

    for (depth, value) in stack.iter().rev().enumerate() {
        let marker = if depth == 0 { "top " } else { "    " };
        items.push(ListItem::new(Line::from(vec![
            Span::styled(marker, Style::default().fg(DEFAULT_THEME.comment)),
            Span::styled(value.to_string(), value_style(value)),
            Span::styled(
                format!("  : {}", value.value_type()),
                Style::default().fg(DEFAULT_THEME.comment),
            ),
        ])));
    }

    let visible = visible_height(area);
    clamp_scroll(scroll_offset, items.len(), visible);
    let items: Vec<ListItem> = items.into_iter().skip(*scroll_offset).take(visible).collect();

    frame.render_widget(List::new(items).block(block), area);
}
