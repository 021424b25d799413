use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Clear, Paragraph},
};

use crate::ui::{
    components::{card::Card, field::centered_box},
    theme::Theme,
};

/// Shown while the stored session is being checked.
pub fn render_checking(frame: &mut Frame<'_>, area: Rect) {
    let theme = Theme::default();
    let card_area = centered_box(36, 5, area);
    frame.render_widget(Clear, card_area);

    let lines = vec![
        Line::styled(
            "CollectPro",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Line::styled("Checking your session…", Style::default().fg(theme.text_muted)),
    ];
    Card::new("loading", &theme).render_with(
        frame,
        card_area,
        Paragraph::new(lines).alignment(Alignment::Center),
    );
}

pub fn render_not_found(frame: &mut Frame<'_>, area: Rect, path: &str) {
    let theme = Theme::default();
    let card_area = centered_box(48, 7, area);
    frame.render_widget(Clear, card_area);

    let lines = vec![
        Line::styled(
            "404",
            Style::default()
                .fg(theme.warning)
                .add_modifier(Modifier::BOLD),
        ),
        Line::styled(
            format!("Nothing lives at {path}"),
            Style::default().fg(theme.text),
        ),
        Line::raw(""),
        Line::styled(
            "Enter to go to the dashboard",
            Style::default().fg(theme.dim),
        ),
    ];
    Card::new("not found", &theme).render_with(
        frame,
        card_area,
        Paragraph::new(lines).alignment(Alignment::Center),
    );
}
