use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::ListItem,
};

use api_types::plot::Plot;
use engine::plot_standing;

use super::{fit, render_selectable};
use crate::{
    app::AppState,
    ui::{
        components::{
            card::{Card, StatCard},
            money::{rate_bar, styled_balance},
        },
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(5)])
        .split(area);

    render_summary(frame, layout[0], state, &theme);
    render_plots(frame, layout[1], state, &theme);
}

fn render_summary(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let summary = &state.summary;
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
        ])
        .split(area);

    StatCard::new("Expected", summary.total_expected.to_string(), theme)
        .caption(format!("{} plots · {} units", summary.plots, summary.units))
        .render(frame, cols[0]);
    StatCard::new("Collected", summary.total_paid.to_string(), theme)
        .value_style(Style::default().fg(theme.positive))
        .render(frame, cols[1]);
    StatCard::new("Outstanding", summary.total_unpaid.to_string(), theme)
        .value_style(Style::default().fg(if summary.total_unpaid.is_positive() {
            theme.error
        } else {
            theme.text
        }))
        .render(frame, cols[2]);
    StatCard::new(
        "Collection rate",
        format!("{}%", summary.collection_rate),
        theme,
    )
    .caption(rate_bar(summary.collection_rate, 12))
    .render(frame, cols[3]);
}

fn render_plots(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let block = Card::new("Plots", theme).block();
    let items = state
        .plots
        .iter()
        .map(|plot| ListItem::new(plot_line(plot, theme)))
        .collect::<Vec<_>>();

    let empty = if state.plots_loaded {
        "No plots registered yet."
    } else {
        "Loading plots…"
    };
    render_selectable(
        frame,
        area,
        block,
        items,
        state.dashboard.selected,
        empty,
        theme,
    );
}

fn plot_line(plot: &Plot, theme: &Theme) -> Line<'static> {
    let standing = plot_standing(plot);
    let kind = plot.plot_type.map_or("-", |kind| kind.label());

    Line::from(vec![
        Span::styled(fit(&plot.name, 22), Style::default().fg(theme.text)),
        Span::styled(fit(&plot.location, 18), Style::default().fg(theme.text_muted)),
        Span::styled(fit(kind, 11), Style::default().fg(theme.dim)),
        Span::raw(format!(
            "{:>3}/{:<3} paid  ",
            standing.paid_tenants, standing.tenants
        )),
        Span::raw(fit(&standing.expected.to_string(), 14)),
        styled_balance(standing.unpaid, theme),
    ])
}
