//! Source pane rendering with syntax highlighting
//!
//! Displays the header text that produced the catalog, with keywords, built-in
//! type names, marker macros and numbers highlighted. When the last operation
//! failed at a known location, that line is marked in the error color.
//!
//! The pane uses a simple character-by-character scan to apply styles without
//! re-running the lexer.

use crate::interpreter::type_system;
use crate::parser::lexer::{INSTANCE_DATA_MARKER, REGISTER_MARKER, SEMANTIC_MARKER};
use crate::ui::panes::{border_style, clamp_scroll};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Highlight one line of C++ declaration source
fn highlight_source_line(line: &str) -> Line<'_> {
    let mut spans = Vec::new();
    let mut current_word = String::new();

    for (i, c) in line.char_indices() {
        let is_directive = c == '#' && line[..i].trim().is_empty();
        if is_directive || line[i..].starts_with("//") {
            if !current_word.is_empty() {
                spans.push(Span::styled(current_word.clone(), word_style(&current_word)));
                current_word.clear();
            }
            spans.push(Span::styled(
                line[i..].to_string(),
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            return Line::from(spans);
        }

        if c.is_alphanumeric() || c == '_' {
            current_word.push(c);
            continue;
        }

        if !current_word.is_empty() {
            spans.push(Span::styled(current_word.clone(), word_style(&current_word)));
            current_word.clear();
        }

        let style = match c {
            '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
            _ => Style::default().fg(DEFAULT_THEME.fg),
        };
        spans.push(Span::styled(c.to_string(), style));
    }

    if !current_word.is_empty() {
        let style = word_style(&current_word);
        spans.push(Span::styled(current_word, style));
    }

    Line::from(spans)
}

fn word_style(word: &str) -> Style {
    match word {
        "namespace" | "struct" | "class" | "using" | "alignas" | "public" | "private"
        | "protected" => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        SEMANTIC_MARKER | REGISTER_MARKER | INSTANCE_DATA_MARKER => {
            Style::default().fg(DEFAULT_THEME.semantic)
        }
        _ if word.starts_with(|c: char| c.is_ascii_digit()) => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ if type_system::builtin(word).is_some() => Style::default().fg(DEFAULT_THEME.type_name),
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Render the source pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source: &str,
    error_line: Option<usize>,
    is_focused: bool,
    scroll: &mut usize,
) {
    let block = Block::default()
        .title(" Source ")
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let lines: Vec<&str> = source.lines().collect();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    clamp_scroll(scroll, lines.len(), visible_height);

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(*scroll)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_error = error_line == Some(line_num);

            let num_style = if is_error {
                Style::default()
                    .fg(DEFAULT_THEME.error)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };

            let mut content = highlight_source_line(line);
            if is_error {
                let error_style = Style::default()
                    .bg(DEFAULT_THEME.error)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD);
                for span in &mut content.spans {
                    span.style = error_style;
                }
            }

            let mut spans = vec![Span::styled(format!("{:4} ", line_num), num_style)];
            spans.extend(content.spans);
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible_lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_comment_runs_to_end_of_line() {
        let line = highlight_source_line("float4 a; // color");
        let parts = texts(&line);
        assert_eq!(parts.last().map(String::as_str), Some("// color"));
        assert_eq!(parts[0], "float4");
    }

    #[test]
    fn test_preprocessor_line_is_dimmed() {
        let line = highlight_source_line("  #pragma once");
        assert_eq!(line.spans.last().unwrap().style.fg, Some(DEFAULT_THEME.comment));
    }
}
