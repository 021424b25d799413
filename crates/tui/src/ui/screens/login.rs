use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::{AppState, LoginField},
    ui::{
        components::field::{FieldRow, centered_box},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let box_width = 52;
    let box_height = 7;
    let card_area = centered_box(box_width, box_height, area);

    frame.render_widget(Clear, card_area);

    let block = Block::default()
        .title(" CollectPro sign in ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));

    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .margin(1)
        .split(inner);

    let login = &state.login;
    let email = FieldRow::new("Email", &login.email).focused(login.focus == LoginField::Email);
    frame.render_widget(Paragraph::new(email.line(&theme)), rows[0]);

    let password = FieldRow::new("Password", &login.password)
        .focused(login.focus == LoginField::Password)
        .masked(true);
    frame.render_widget(Paragraph::new(password.line(&theme)), rows[2]);

    let below = Rect {
        x: card_area.x,
        y: card_area.y.saturating_add(card_area.height).saturating_add(1),
        width: card_area.width,
        height: 1,
    }
    .intersection(area);

    let (text, style) = match &login.message {
        Some(message) => (message.as_str(), Style::default().fg(theme.error)),
        None => (
            "Tab switch field · Enter sign in · Ctrl+C quit",
            Style::default().fg(theme.dim),
        ),
    };
    frame.render_widget(
        Paragraph::new(Span::styled(text, style)).alignment(Alignment::Center),
        below,
    );
}
