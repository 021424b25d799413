use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::{
    app::{ToastLevel, ToastState},
    ui::theme::Theme,
};

const MAX_WIDTH: u16 = 60;

pub fn render(frame: &mut Frame<'_>, area: Rect, toast: Option<&ToastState>) {
    let Some(toast) = toast else {
        return;
    };
    let theme = Theme::default();

    let longest = toast
        .title
        .as_deref()
        .map_or(0, |title| title.chars().count())
        .max(toast.message.chars().count());
    let width = u16::try_from(longest + 4)
        .unwrap_or(MAX_WIDTH)
        .min(MAX_WIDTH)
        .min(area.width);
    let inner_width = usize::from(width.saturating_sub(2)).max(1);
    let body_lines = toast.message.chars().count().div_ceil(inner_width).max(1);
    let title_lines = usize::from(toast.title.is_some());
    let height = u16::try_from(body_lines + title_lines + 2)
        .unwrap_or(u16::MAX)
        .min(area.height);
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + area.height.saturating_sub(height + 1),
        width,
        height,
    };

    let color = match toast.level {
        ToastLevel::Info => theme.text,
        ToastLevel::Success => theme.positive,
        ToastLevel::Warning => theme.warning,
        ToastLevel::Error => theme.error,
    };
    let style = Style::default().fg(color);

    let mut lines = Vec::new();
    if let Some(title) = &toast.title {
        lines.push(Line::from(Span::styled(
            title.as_str(),
            style.add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(Span::styled(toast.message.as_str(), style)));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(style);
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
        rect,
    );
}
