use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{ListItem, Paragraph},
};

use api_types::payment::Payment;
use engine::ReceiptStatus;

use super::{fit, render_selectable};
use crate::{
    app::{AppState, SearchInput},
    ui::{
        components::{
            card::Card,
            money::{amount_text, receipt_status, styled_amount},
        },
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(6),
        ])
        .split(area);

    let payments = &state.payments;
    let visible = payments.visible();
    let caption = format!("{} of {} payments", visible.len(), payments.items.len());
    render_search(frame, layout[0], &payments.search, &caption, &theme);

    let items = visible
        .iter()
        .map(|payment| ListItem::new(payment_line(payment, &theme)))
        .collect::<Vec<_>>();
    let empty = if !payments.loaded {
        "Loading payments…"
    } else if payments.items.is_empty() {
        "No payments recorded yet."
    } else {
        "No payments match the search."
    };
    render_selectable(
        frame,
        layout[1],
        Card::new("Payments", &theme).block(),
        items,
        payments.cursor.selected,
        empty,
        &theme,
    );

    render_selected(frame, layout[2], payments.selected(), &theme);
}

/// Search line shared by the payments and tenants pages.
pub(super) fn render_search(
    frame: &mut Frame<'_>,
    area: Rect,
    search: &SearchInput,
    caption: &str,
    theme: &Theme,
) {
    let cursor = if search.active { "│" } else { "" };
    let query_style = if search.active {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text)
    };
    let line = Line::from(vec![
        Span::styled("/ ", Style::default().fg(theme.dim)),
        Span::styled(format!("{}{cursor}", search.query), query_style),
        Span::styled(format!("   {caption}"), Style::default().fg(theme.dim)),
    ]);
    Card::new("Search", theme)
        .focused(search.active)
        .render_with(frame, area, Paragraph::new(line));
}

fn payment_line(payment: &Payment, theme: &Theme) -> Line<'static> {
    let status = ReceiptStatus::derive(&payment.statuses);
    let period = match (&payment.month, payment.year) {
        (Some(month), Some(year)) => format!("{month} {year}"),
        (Some(month), None) => month.clone(),
        _ => String::new(),
    };

    Line::from(vec![
        Span::styled(fit(&payment.id, 14), Style::default().fg(theme.dim)),
        Span::styled(
            fit(payment.name.as_deref().unwrap_or("-"), 22),
            Style::default().fg(theme.text),
        ),
        Span::styled(
            fit(payment.phone.as_deref().unwrap_or("-"), 14),
            Style::default().fg(theme.text_muted),
        ),
        Span::raw(fit(payment.plot_name.as_deref().unwrap_or("-"), 16)),
        Span::raw(fit(&amount_text(payment.amount.cash), 12)),
        Span::raw(fit(&amount_text(payment.amount.mpesa), 12)),
        Span::raw(fit(&period, 16)),
        receipt_status(status, theme),
    ])
}

fn render_selected(frame: &mut Frame<'_>, area: Rect, payment: Option<&Payment>, theme: &Theme) {
    let card = Card::new("Selected", theme);
    let Some(payment) = payment else {
        card.render_with(frame, area, Paragraph::new(""));
        return;
    };

    let muted = |text: &'static str| Span::styled(text, Style::default().fg(theme.text_muted));
    let less = payment.less.as_ref();
    let lines = vec![
        Line::from(vec![
            muted("Cash "),
            styled_amount(payment.amount.cash, theme),
            muted("   MPESA "),
            styled_amount(payment.amount.mpesa, theme),
            muted("   Total "),
            styled_amount(payment.amount.total, theme),
        ]),
        Line::from(vec![
            muted("Balance "),
            styled_amount(payment.balance, theme),
            muted("   Overpayment "),
            styled_amount(payment.overpayment(), theme),
            muted("   Less "),
            styled_amount(less.and_then(|less| less.amount), theme),
            Span::raw(
                less.and_then(|less| less.due_month.as_deref())
                    .map(|month| format!(" due {month}"))
                    .unwrap_or_default(),
            ),
        ]),
        Line::from(vec![
            muted("MPESA ref "),
            Span::raw(payment.mpesa_ref.clone().unwrap_or_else(|| "-".to_string())),
            muted("   Source "),
            Span::raw(payment.source.clone().unwrap_or_else(|| "-".to_string())),
            muted("   Time "),
            Span::raw(
                payment
                    .time
                    .clone()
                    .or_else(|| payment.created_at.map(|at| at.format("%d/%m/%Y %H:%M").to_string()))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]),
        Line::from(vec![
            muted("Status trail "),
            Span::raw(
                payment
                    .statuses
                    .iter()
                    .map(|entry| entry.state.as_str())
                    .collect::<Vec<_>>()
                    .join(" → "),
            ),
        ]),
    ];
    card.render_with(frame, area, Paragraph::new(lines));
}
