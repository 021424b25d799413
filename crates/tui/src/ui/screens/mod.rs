pub mod dashboard;
pub mod login;
pub mod modals;
pub mod payments;
pub mod plot_detail;
pub mod plot_form;
pub mod plots;
pub mod receipts;
pub mod settings;
pub mod status;
pub mod tenants;

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, List, ListItem, ListState, Paragraph},
};

use crate::ui::theme::Theme;

/// A bordered list with the cursor row highlighted, or a centered note when
/// there is nothing to show.
fn render_selectable(
    frame: &mut Frame<'_>,
    area: Rect,
    block: Block<'_>,
    items: Vec<ListItem<'_>>,
    selected: usize,
    empty: &str,
    theme: &Theme,
) {
    if items.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::styled(empty, Style::default().fg(theme.dim)))
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
        return;
    }

    let mut list_state = ListState::default();
    list_state.select(Some(selected.min(items.len() - 1)));

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");

    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Cuts `text` to `width` characters, marking the cut with an ellipsis.
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        return format!("{text:<width$}");
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}
