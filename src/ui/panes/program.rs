//! Compiled program pane

use super::{follow, pane_block, visible_height};
use crate::compiler::disasm::listing;
use crate::compiler::instruction::Routine;
use crate::compiler::Instruction;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

/// Render the running sequence with the next instruction highlighted
pub fn render_program_pane(
    frame: &mut Frame,
    area: Rect,
    routine: &Routine,
    instructions: &[Instruction],
    instruction_pointer: Option<usize>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let title = format!(" Program: {} ", routine);
    let block = pane_block(&title, is_focused);

    if instruction_pointer.is_none() || instructions.is_empty() {
        let paragraph = Paragraph::new("(finished)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible = visible_height(area);
    if let Some(ip) = instruction_pointer {
        follow(scroll_offset, ip, visible);
    }

    let items: Vec<ListItem> = listing(instructions)
        .into_iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible)
        .map(|(idx, line)| {
            if Some(idx) == instruction_pointer {
                ListItem::new(format!("→{}", line)).style(
                    Style::default()
                        .bg(DEFAULT_THEME.current_line_bg)
                        .fg(DEFAULT_THEME.secondary)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ListItem::new(format!(" {}", line)).style(Style::default().fg(DEFAULT_THEME.fg))
            }
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
