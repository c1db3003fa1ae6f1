//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`source`]: Header source with syntax highlighting and an error-line marker
//! - [`catalog`]: Resolved aggregates with offsets, sizes, padding and semantics
//! - [`output`]: Generated shader text for the selected output kind
//! - [`status`]: Status bar with keybindings and session state
//!
//! Each pane module exports a primary `render_*` function. Scroll offsets are
//! owned by [`App`](crate::ui::app::App) and clamped by the pane on render.

pub mod catalog;
pub mod output;
pub mod source;
pub mod status;

pub use catalog::render_catalog_pane;
pub use output::render_output_pane;
pub use source::render_source_pane;
pub use status::render_status_bar;

use crate::ui::theme::DEFAULT_THEME;
use ratatui::style::{Modifier, Style};

pub(crate) fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    }
}

/// Clamp `offset` so the last page of `total` rows stays filled
pub(crate) fn clamp_scroll(offset: &mut usize, total: usize, visible_height: usize) {
    if total > visible_height {
        *offset = (*offset).min(total - visible_height);
    } else {
        *offset = 0;
    }
}
