use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::ListItem,
};

use engine::directory_rows;

use super::{fit, payments::render_search, render_selectable};
use crate::{
    app::AppState,
    ui::{
        components::{
            card::Card,
            money::{amount_text, tenant_status},
        },
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    let rows = state.tenant_rows();
    let total = directory_rows(&state.plots).len();
    let caption = format!("{} of {total} contacts", rows.len());
    render_search(frame, layout[0], &state.tenants.search, &caption, &theme);

    let items = rows
        .iter()
        .map(|contact| {
            ListItem::new(Line::from(vec![
                Span::styled(fit(contact.kind.label(), 10), Style::default().fg(theme.dim)),
                Span::styled(fit(&contact.name, 22), Style::default().fg(theme.text)),
                Span::styled(fit(&contact.phone, 15), Style::default().fg(theme.text_muted)),
                Span::raw(fit(&contact.plot_name, 18)),
                Span::styled(
                    fit(&contact.plot_location, 16),
                    Style::default().fg(theme.dim),
                ),
                Span::raw(fit(&amount_text(contact.amount), 12)),
                tenant_status(contact.status, &theme),
            ]))
        })
        .collect::<Vec<_>>();

    let empty = if !state.plots_loaded {
        "Loading contacts…"
    } else if total == 0 {
        "No caretakers or tenants on record."
    } else {
        "No contacts match the search."
    };
    render_selectable(
        frame,
        layout[1],
        Card::new("Tenants & caretakers", &theme).block(),
        items,
        state.tenants.cursor.selected,
        empty,
        &theme,
    );
}
