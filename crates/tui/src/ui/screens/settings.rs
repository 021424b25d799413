use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::{AppState, SettingsField},
    ui::{
        components::{card::Card, field::FieldRow},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Length(6),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .split(area);

    let settings = &state.settings;
    let focused = settings.focused();
    let rows = |fields: &[SettingsField]| {
        fields
            .iter()
            .map(|field| {
                let value = settings.value(*field);
                let row = FieldRow::new(field.label(), &value)
                    .focused(settings.editing && *field == focused);
                let row = if field.is_text() {
                    row
                } else {
                    row.hint("space to toggle")
                };
                row.line(&theme)
            })
            .collect::<Vec<_>>()
    };

    let title = if settings.is_dirty() {
        "MPESA Daraja (unsaved)"
    } else {
        "MPESA Daraja"
    };
    Card::new(title, &theme)
        .focused(settings.editing)
        .render_with(
            frame,
            layout[0],
            Paragraph::new(rows(&SettingsField::ALL[..5])),
        );
    Card::new("Notifications", &theme)
        .focused(settings.editing)
        .render_with(
            frame,
            layout[1],
            Paragraph::new(rows(&SettingsField::ALL[5..])),
        );

    let muted = Style::default().fg(theme.text_muted);
    let system = vec![
        Line::from(vec![
            Span::styled("Backend   ", muted),
            Span::raw(state.base_url.clone()),
        ]),
        Line::from(vec![
            Span::styled("Receipts  ", muted),
            Span::raw(format!(
                "{} · {} columns",
                state.receipt_options.business_name, state.receipt_options.columns
            )),
        ]),
    ];
    Card::new("System", &theme).render_with(frame, layout[2], Paragraph::new(system));
}
