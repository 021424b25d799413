use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, ListItem, Paragraph, Wrap},
};

use engine::stk_contacts;

use super::{fit, render_selectable};
use crate::{
    app::{AppState, ConfirmAction, Modal, PaymentEditModal, PaymentField, StkField, StkModal},
    ui::{
        components::{
            card::Card,
            field::{FieldRow, centered_box},
            money::amount_text,
        },
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, modal: &Modal) {
    let theme = Theme::default();
    match modal {
        Modal::Stk(stk) => render_stk(frame, area, state, stk, &theme),
        Modal::PaymentEdit(edit) => render_payment_edit(frame, area, edit, &theme),
        Modal::Confirm(confirm) => render_confirm(frame, area, confirm, &theme),
    }
}

fn render_stk(frame: &mut Frame<'_>, area: Rect, state: &AppState, stk: &StkModal, theme: &Theme) {
    let box_area = centered_box(72, 18, area);
    frame.render_widget(Clear, box_area);
    let card = Card::new("STK push", theme).focused(true);
    let inner = card.inner(box_area);
    frame.render_widget(card.block(), box_area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let query = FieldRow::new("Search contacts", &stk.query)
        .focused(stk.focus == StkField::Contacts);
    frame.render_widget(Paragraph::new(query.line(theme)), layout[0]);

    let contacts = stk_contacts(&state.plots);
    let items = stk
        .matches(&contacts)
        .into_iter()
        .map(|contact| {
            ListItem::new(Line::from(vec![
                Span::styled(fit(contact.kind.label(), 10), Style::default().fg(theme.dim)),
                Span::raw(fit(&contact.name, 20)),
                Span::styled(fit(&contact.phone, 14), Style::default().fg(theme.text_muted)),
                Span::raw(fit(&contact.plot_name, 12)),
                Span::raw(amount_text(contact.amount)),
            ]))
        })
        .collect::<Vec<_>>();
    render_selectable(
        frame,
        layout[1],
        Block::default(),
        items,
        stk.cursor.selected,
        "No contacts match.",
        theme,
    );

    let phone = FieldRow::new("Phone", &stk.form.raw_phone)
        .focused(stk.focus == StkField::Phone)
        .invalid(!stk.form.raw_phone.is_empty() && !stk.form.phone_valid);
    let phone = if stk.form.phone_valid {
        phone.hint(&stk.form.phone)
    } else {
        phone
    };
    frame.render_widget(Paragraph::new(phone.line(theme)), layout[2]);

    let amount = FieldRow::new("Amount (KES)", &stk.form.amount)
        .focused(stk.focus == StkField::Amount);
    frame.render_widget(Paragraph::new(amount.line(theme)), layout[3]);
}

fn render_payment_edit(frame: &mut Frame<'_>, area: Rect, edit: &PaymentEditModal, theme: &Theme) {
    let box_area = centered_box(64, 10, area);
    frame.render_widget(Clear, box_area);
    let title = format!("Edit payment {}", edit.form.payment_id);
    let card = Card::new(&title, theme).focused(true);

    let form = &edit.form;
    let muted = Style::default().fg(theme.text_muted);
    let lines = vec![
        Line::from(vec![
            Span::styled("Plot  ", muted),
            Span::raw(form.plot_name.clone().unwrap_or_else(|| "-".to_string())),
            Span::styled("   MPESA  ", muted),
            Span::raw(amount_text(form.mpesa)),
        ]),
        Line::raw(""),
        FieldRow::new("Name", &form.name)
            .focused(edit.focus == PaymentField::Name)
            .line(theme),
        FieldRow::new("Phone", &form.phone)
            .focused(edit.focus == PaymentField::Phone)
            .invalid(!form.phone.is_empty() && !form.phone_valid)
            .line(theme),
        FieldRow::new("Add cash (KES)", &form.cash)
            .focused(edit.focus == PaymentField::Cash)
            .hint("added to the recorded cash")
            .line(theme),
        Line::raw(""),
        Line::styled("MPESA amounts cannot be edited.", Style::default().fg(theme.dim)),
    ];
    card.render_with(frame, box_area, Paragraph::new(lines));
}

fn render_confirm(frame: &mut Frame<'_>, area: Rect, confirm: &ConfirmAction, theme: &Theme) {
    let box_area = centered_box(56, 7, area);
    frame.render_widget(Clear, box_area);
    let destructive = matches!(
        confirm,
        ConfirmAction::DeletePayment { .. } | ConfirmAction::DeletePlot { .. }
    );
    let accent = if destructive { theme.error } else { theme.accent };

    let lines = vec![
        Line::raw(confirm.message()),
        Line::raw(""),
        Line::from(vec![
            Span::styled(
                "y",
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" yes   "),
            Span::styled("n", Style::default().fg(theme.accent)),
            Span::raw(" no"),
        ]),
    ];
    Card::new(confirm.title(), theme).focused(true).render_with(
        frame,
        box_area,
        Paragraph::new(lines).wrap(Wrap { trim: true }),
    );
}
