use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{app::AdminTab, ui::theme::Theme};

/// Tab bar of the admin panel, each tab prefixed by its number key.
pub fn render_tabs(frame: &mut Frame<'_>, area: Rect, active: AdminTab, theme: &Theme) {
    let mut spans = vec![Span::raw(" ")];

    for (i, tab) in AdminTab::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            format!("{} ", tab.shortcut()),
            Style::default().fg(theme.dim),
        ));

        let label = tab.label();
        if *tab == active {
            spans.push(Span::styled("[", Style::default().fg(theme.accent)));
            spans.push(Span::styled(
                label,
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled("]", Style::default().fg(theme.accent)));
        } else {
            spans.push(Span::styled(label, Style::default().fg(theme.text_muted)));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn tab_shortcuts(theme: &Theme) -> Vec<Span<'static>> {
    vec![
        Span::styled("1-5", Style::default().fg(theme.accent)),
        Span::raw(" tabs"),
    ]
}
