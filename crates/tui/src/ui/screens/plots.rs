use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::ListItem,
};

use super::{fit, render_selectable};
use crate::{
    app::AppState,
    ui::{
        components::{card::Card, money::amount_text},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let items = state
        .plots
        .iter()
        .map(|plot| {
            let kind = plot.plot_type.map_or("-", |kind| kind.label());
            let caretaker = plot.caretaker_name.as_deref().unwrap_or("-");
            let rate = if plot.lumpsum_expected.is_some() {
                format!("lumpsum {}", amount_text(plot.lumpsum_expected))
            } else {
                format!("{} / tenant", amount_text(plot.fee_per_tenant))
            };
            ListItem::new(Line::from(vec![
                Span::styled(fit(&plot.name, 22), Style::default().fg(theme.text)),
                Span::styled(fit(&plot.location, 18), Style::default().fg(theme.text_muted)),
                Span::styled(fit(kind, 11), Style::default().fg(theme.dim)),
                Span::raw(fit(caretaker, 20)),
                Span::raw(format!("{:>3} tenants  ", plot.tenants.len())),
                Span::raw(rate),
            ]))
        })
        .collect::<Vec<_>>();

    let empty = if state.plots_loaded {
        "No plots yet. Press n to register one."
    } else {
        "Loading plots…"
    };
    let title = format!("Plots ({})", state.plots.len());
    render_selectable(
        frame,
        area,
        Card::new(&title, &theme).block(),
        items,
        state.plots_admin.selected,
        empty,
        &theme,
    );
}
