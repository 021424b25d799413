use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{ListItem, Paragraph},
};

use api_types::plot::{Plot, PlotType};
use engine::plot_standing;

use super::{fit, render_selectable};
use crate::{
    app::AppState,
    ui::{
        components::{
            card::Card,
            money::{amount_text, styled_balance, tenant_status},
        },
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let Some(plot) = &state.detail.plot else {
        Card::new("Plot", &theme).render_with(
            frame,
            area,
            Paragraph::new(Line::styled(
                "Loading plot…",
                Style::default().fg(theme.dim),
            ))
            .alignment(Alignment::Center),
        );
        return;
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(4)])
        .split(area);

    render_header(frame, layout[0], plot, &theme);
    render_tenants(frame, layout[1], state, plot, &theme);
}

fn label(text: &'static str, theme: &Theme) -> Span<'static> {
    Span::styled(format!("{text:<16}"), Style::default().fg(theme.text_muted))
}

fn render_header(frame: &mut Frame<'_>, area: Rect, plot: &Plot, theme: &Theme) {
    let standing = plot_standing(plot);
    let caretaker = match (&plot.caretaker_name, &plot.caretaker_phone) {
        (Some(name), Some(phone)) => format!("{name} ({phone})"),
        (Some(name), None) => name.clone(),
        (None, Some(phone)) => phone.clone(),
        (None, None) => "-".to_string(),
    };

    let mut lines = vec![
        Line::from(vec![
            label("Location", theme),
            Span::raw(if plot.location.is_empty() {
                "-".to_string()
            } else {
                plot.location.clone()
            }),
        ]),
        Line::from(vec![
            label("Type", theme),
            Span::raw(plot.plot_type.map_or("-", |kind| kind.label())),
        ]),
        Line::from(vec![label("Caretaker", theme), Span::raw(caretaker)]),
    ];

    if plot.plot_type == Some(PlotType::Lumpsum) {
        lines.push(Line::from(vec![
            label("MPESA number", theme),
            Span::raw(plot.mpesa_number.clone().unwrap_or_else(|| "-".to_string())),
        ]));
    } else {
        lines.push(Line::from(vec![
            label("Fee per tenant", theme),
            Span::raw(amount_text(plot.fee_per_tenant)),
        ]));
    }

    lines.push(Line::from(vec![
        label("Expected", theme),
        Span::styled(
            standing.expected.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled("Collected ", Style::default().fg(theme.text_muted)),
        Span::styled(
            standing.paid.to_string(),
            Style::default().fg(theme.positive),
        ),
        Span::raw("   "),
        Span::styled("Outstanding ", Style::default().fg(theme.text_muted)),
        styled_balance(standing.unpaid, theme),
    ]));

    Card::new(&plot.name, theme).render_with(frame, area, Paragraph::new(lines));
}

fn render_tenants(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    plot: &Plot,
    theme: &Theme,
) {
    let items = plot
        .tenants
        .iter()
        .map(|tenant| {
            let fee = tenant.fee.or(plot.fee_per_tenant);
            let paid_on = tenant
                .date_paid
                .as_deref()
                .or(tenant.mpesa_ref.as_deref())
                .unwrap_or("");
            ListItem::new(Line::from(vec![
                Span::styled(fit(&tenant.name, 24), Style::default().fg(theme.text)),
                Span::styled(fit(&tenant.phone, 16), Style::default().fg(theme.text_muted)),
                Span::raw(fit(&amount_text(fee), 14)),
                tenant_status(tenant.status, theme),
                Span::styled(format!("  {paid_on}"), Style::default().fg(theme.dim)),
            ]))
        })
        .collect::<Vec<_>>();

    let title = format!("Tenants ({})", plot.tenants.len());
    render_selectable(
        frame,
        area,
        Card::new(&title, theme).block(),
        items,
        state.detail.cursor.selected,
        "No tenants on this plot.",
        theme,
    );
}
