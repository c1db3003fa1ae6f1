//! Generated output pane rendering

use crate::interpreter::catalog::OutputKind;
use crate::ui::panes::{border_style, clamp_scroll};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn output_line_style(line: &str) -> Style {
    let trimmed = line.trim_start();
    if trimmed.starts_with("//") {
        Style::default().fg(DEFAULT_THEME.comment)
    } else if trimmed.starts_with("struct") || trimmed.starts_with("cbuffer") {
        Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.fg)
    }
}

/// Render the generated text for `kind`, or a placeholder when generation failed
pub fn render_output_pane(
    frame: &mut Frame,
    area: Rect,
    kind: OutputKind,
    text: Option<&str>,
    is_focused: bool,
    scroll: &mut usize,
) {
    let block = Block::default()
        .title(format!(" Output ({}) ", kind))
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let Some(text) = text else {
        let paragraph = Paragraph::new("(generation failed, see status bar)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.error));
        frame.render_widget(paragraph, area);
        return;
    };

    let lines: Vec<&str> = text.lines().collect();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    clamp_scroll(scroll, lines.len(), visible_height);

    let visible: Vec<Line> = lines
        .iter()
        .skip(*scroll)
        .take(visible_height)
        .map(|line| Line::from(Span::styled(line.to_string(), output_line_style(line))))
        .collect();

    frame.render_widget(Paragraph::new(visible).block(block), area);
}
