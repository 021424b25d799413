use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{ListItem, Paragraph},
};

use engine::{Align, Op, Receipt, ReceiptStatus, build_receipt};

use super::{fit, render_selectable};
use crate::{
    app::{AppState, ReceiptField},
    ui::{
        components::{card::Card, money::receipt_status},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    render_filter(frame, layout[0], state, &theme);

    let preview_width = u16::try_from(state.receipt_options.columns + 4).unwrap_or(u16::MAX);
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(preview_width)])
        .split(layout[1]);

    let receipts = &state.receipts;
    let visible = receipts.visible(&state.payments.items);
    let items = visible
        .iter()
        .map(|payment| {
            let period = payment.month.as_deref().unwrap_or("-");
            ListItem::new(Line::from(vec![
                Span::styled(fit(&payment.id, 14), Style::default().fg(theme.dim)),
                Span::raw(fit(payment.name.as_deref().unwrap_or("-"), 20)),
                Span::styled(
                    fit(payment.plot_name.as_deref().unwrap_or("-"), 16),
                    Style::default().fg(theme.text_muted),
                ),
                Span::raw(fit(period, 11)),
                receipt_status(ReceiptStatus::derive(&payment.statuses), &theme),
            ]))
        })
        .collect::<Vec<_>>();
    let empty = if receipts.filter.is_empty() {
        "No payments to print."
    } else {
        "No payments match the filter."
    };
    let title = format!("Receipts ({})", visible.len());
    render_selectable(
        frame,
        body[0],
        Card::new(&title, &theme).block(),
        items,
        receipts.cursor.selected,
        empty,
        &theme,
    );

    let receipt = visible
        .get(receipts.cursor.selected)
        .map(|payment| build_receipt(payment, &state.receipt_options));
    render_preview(frame, body[1], receipt.as_ref(), &theme);
}

fn render_filter(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let receipts = &state.receipts;
    let filter = &receipts.filter;
    let segment = |field: ReceiptField, label: &'static str, value: String| {
        let focused = receipts.editing && receipts.focus == field;
        let value_style = if focused {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        vec![
            Span::styled(format!("{label} "), Style::default().fg(theme.text_muted)),
            Span::styled(
                if focused { format!("‹{value}›") } else { value },
                value_style,
            ),
            Span::raw("   "),
        ]
    };

    let year = if receipts.year_input.is_empty() {
        "All".to_string()
    } else {
        receipts.year_input.clone()
    };
    let mut spans = segment(
        ReceiptField::Month,
        "Month",
        filter.month.clone().unwrap_or_else(|| "All".to_string()),
    );
    spans.extend(segment(ReceiptField::Year, "Year", year));
    spans.extend(segment(
        ReceiptField::Plot,
        "Plot",
        filter.plot.clone().unwrap_or_else(|| "All".to_string()),
    ));

    Card::new("Filter", theme)
        .focused(receipts.editing)
        .render_with(frame, area, Paragraph::new(Line::from(spans)));
}

/// Text rendition of the thermal layout.
fn preview_lines(receipt: &Receipt) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut centered = false;
    let mut bold = false;
    for op in &receipt.ops {
        match op {
            Op::Align(align) => centered = *align == Align::Center,
            Op::Bold(on) => bold = *on,
            Op::Size(..) | Op::Cut => {}
            Op::Line(text) => {
                let style = if bold {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let line = Line::styled(text.clone(), style);
                lines.push(if centered { line.centered() } else { line });
            }
            Op::Rule => lines.push(Line::raw("-".repeat(receipt.columns))),
            Op::Feed(count) => {
                lines.extend((0..*count).map(|_| Line::raw("")));
            }
            Op::Qr(url) => {
                lines.push(Line::raw("[QR]").centered());
                lines.push(Line::raw(url.clone()).centered());
            }
        }
    }
    lines
}

fn render_preview(frame: &mut Frame<'_>, area: Rect, receipt: Option<&Receipt>, theme: &Theme) {
    let card = Card::new("Preview", theme);
    match receipt {
        Some(receipt) => card.render_with(frame, area, Paragraph::new(preview_lines(receipt))),
        None => card.render_with(
            frame,
            area,
            Paragraph::new(Line::styled(
                "Select a payment",
                Style::default().fg(theme.dim),
            ))
            .alignment(Alignment::Center),
        ),
    }
}

#[cfg(test)]
mod tests {
    use api_types::payment::Payment;
    use engine::ReceiptOptions;

    use super::*;

    #[test]
    fn preview_keeps_every_printed_line() {
        let payment = Payment {
            id: "QK7T2".to_string(),
            name: Some("Grace Akinyi".to_string()),
            ..Payment::default()
        };
        let receipt = build_receipt(&payment, &ReceiptOptions::default());
        let text = preview_lines(&receipt)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");

        for value in receipt.values() {
            assert!(text.contains(value), "missing {value:?} in preview");
        }
        assert!(text.contains(&"-".repeat(receipt.columns)));
    }
}
