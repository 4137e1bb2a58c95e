//! Source code pane rendering with syntax highlighting
//!
//! Highlighting comes from a character walk over each line rather than the
//! real lexer, so half-typed or malformed lines still render.

use super::{clamp_scroll, follow, pane_block, visible_height};
use crate::parser::token::Keyword;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

fn highlight_source_code(line: &str) -> Line<'_> {
    let mut spans = Vec::new();
    let mut current_word = String::new();

    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    let flush = |word: &mut String, spans: &mut Vec<Span<'_>>, next: Option<char>| {
        if !word.is_empty() {
            let style = word_style(word, next == Some(':'));
            spans.push(Span::styled(std::mem::take(word), style));
        }
    };

    while i < chars.len() {
        let c = chars[i];

        // Comment runs to end of line
        if c == '#' {
            flush(&mut current_word, &mut spans, None);
            let rest: String = chars[i..].iter().collect();
            spans.push(Span::styled(rest, Style::default().fg(DEFAULT_THEME.comment)));
            break;
        }

        // Character literal
        if c == '\'' && i + 2 < chars.len() && chars[i + 2] == '\'' {
            flush(&mut current_word, &mut spans, None);
            let literal: String = chars[i..i + 3].iter().collect();
            spans.push(Span::styled(literal, Style::default().fg(DEFAULT_THEME.string)));
            i += 3;
            continue;
        }

        if !c.is_alphanumeric() && c != '_' {
            flush(&mut current_word, &mut spans, Some(c));

            let style = match c {
                '{' | '}' | '(' | ')' => Style::default().fg(DEFAULT_THEME.primary),
                '^' => Style::default()
                    .fg(DEFAULT_THEME.keyword)
                    .add_modifier(Modifier::BOLD),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };
            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    flush(&mut current_word, &mut spans, None);
    Line::from(spans)
}

fn word_style(word: &str, is_label: bool) -> Style {
    if Keyword::ALL.iter().any(|k| k.text() == word) {
        return Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD);
    }
    if word.chars().all(|c| c.is_ascii_digit()) {
        return Style::default().fg(DEFAULT_THEME.number);
    }
    if is_label {
        return Style::default().fg(DEFAULT_THEME.label);
    }
    Style::default().fg(DEFAULT_THEME.fg)
}

/// Line number gutter, marked on the line about to run
fn gutter(number: usize, is_current: bool) -> Span<'static> {
    if is_current {
        Span::styled(
            format!("{:>4}▶", number),
            Style::default()
                .fg(DEFAULT_THEME.cursor)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            format!("{:4} ", number),
            Style::default().fg(DEFAULT_THEME.comment),
        )
    }
}

/// Render the source code pane, keeping `current_line` (1-based) in view when unfocused
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source_name: &str,
    source_code: &str,
    current_line: Option<usize>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let title = format!(" Source: {} ", source_name);
    let block = pane_block(&title, is_focused);

    let lines: Vec<&str> = source_code.lines().collect();
    let visible = visible_height(area);
    // Manual scrolling wins while the pane has focus
    if let (Some(line), false) = (current_line, is_focused) {
        follow(scroll_offset, line.saturating_sub(1), visible);
    }
    clamp_scroll(scroll_offset, lines.len(), visible);

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible)
        .map(|(idx, line)| {
            let is_current = current_line == Some(idx + 1);
            let mut spans = vec![gutter(idx + 1, is_current)];
            spans.extend(highlight_source_code(line).spans);
            let row = Line::from(spans);
            if is_current {
                row.style(Style::default().bg(DEFAULT_THEME.current_line_bg))
            } else {
                row
            }
        })
        .collect();

    frame.render_widget(Paragraph::new(visible_lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &str) -> Vec<String> {
        highlight_source_code(line)
            .spans
            .into_iter()
            .map(|s| s.content.into_owned())
            .collect()
    }

    #[test]
    fn test_highlight_splits_tokens() {
        assert_eq!(
            texts("write 'A'; # done"),
            vec!["write", " ", "'A'", ";", " ", "# done"]
        );
    }

    #[test]
    fn test_gutter_marks_current_line() {
        assert_eq!(gutter(7, true).content, "   7▶");
        assert_eq!(gutter(7, false).content, "   7 ");
        assert_eq!(gutter(7, true).style.fg, Some(DEFAULT_THEME.cursor));
    }

    #[test]
    fn test_label_and_keyword_styles() {
        let line = highlight_source_code("loop: { halt; }");
        assert_eq!(line.spans[0].content, "loop");
        assert_eq!(line.spans[0].style.fg, Some(DEFAULT_THEME.label));

        let line = highlight_source_code("halt;");
        assert_eq!(line.spans[0].style.fg, Some(DEFAULT_THEME.keyword));
    }
}
