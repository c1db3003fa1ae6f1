//! Catalog pane rendering
//!
//! Lists the aggregates declared for the selected output kind: one header
//! row per aggregate, then one row per field with its offset, size, dialect
//! type and semantic. Implicit padding is shown as its own dimmed row.

use crate::interpreter::catalog::{OutputKind, TypeMetaData};
use crate::ui::panes::{border_style, clamp_scroll};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

fn padding_row(bytes: u32) -> Line<'static> {
    Line::from(Span::styled(
        format!("        ({} bytes padding)", bytes),
        Style::default().fg(DEFAULT_THEME.padding),
    ))
}

/// Build the display rows for `types`
pub(crate) fn catalog_lines(kind: OutputKind, types: &[TypeMetaData]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for meta in types {
        let mut header = vec![
            Span::styled(
                meta.qualified_name.clone(),
                Style::default()
                    .fg(DEFAULT_THEME.type_name)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {} bytes", meta.size),
                Style::default().fg(DEFAULT_THEME.number),
            ),
        ];
        if let (Some(class), Some(slot)) = (kind.register_class(), meta.register) {
            header.push(Span::styled(
                format!("  register({}{})", class, slot),
                Style::default().fg(DEFAULT_THEME.semantic),
            ));
        }
        lines.push(Line::from(header));

        for field in &meta.fields {
            if field.padding_before > 0 {
                lines.push(padding_row(field.padding_before));
            }

            let mut spans = vec![
                Span::styled(
                    format!("  {:>4} ", field.offset),
                    Style::default().fg(DEFAULT_THEME.number),
                ),
                Span::styled(
                    format!("{:<9}", field.dialect_type),
                    Style::default().fg(DEFAULT_THEME.type_name),
                ),
                Span::styled(field.name.clone(), Style::default().fg(DEFAULT_THEME.fg)),
            ];
            if kind == OutputKind::VertexInput {
                spans.push(Span::styled(
                    format!(" : {}", field.semantic),
                    Style::default().fg(DEFAULT_THEME.semantic),
                ));
            }
            lines.push(Line::from(spans));
        }

        if meta.tail_padding > 0 {
            lines.push(padding_row(meta.tail_padding));
        }
    }

    lines
}

/// Render the catalog pane
pub fn render_catalog_pane(
    frame: &mut Frame,
    area: Rect,
    kind: OutputKind,
    types: &[TypeMetaData],
    is_focused: bool,
    scroll: &mut usize,
) {
    let block = Block::default()
        .title(format!(" Catalog ({}) ", kind))
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    if types.is_empty() {
        let paragraph = Paragraph::new("(no types)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let lines = catalog_lines(kind, types);
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    clamp_scroll(scroll, lines.len(), visible_height);

    let items: Vec<ListItem> = lines
        .into_iter()
        .skip(*scroll)
        .take(visible_height)
        .map(ListItem::new)
        .collect();

    let list = List::new(items).block(block.padding(Padding::new(1, 0, 0, 0)));
    frame.render_widget(list, area);
}
