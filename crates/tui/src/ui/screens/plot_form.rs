use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use engine::FormMode;

use crate::{
    app::{AppState, PlotField, PlotFormState},
    ui::{
        components::{card::Card, field::FieldRow},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let Some(form) = &state.plot_form else {
        Card::new("Plot", &theme).render_with(frame, area, Paragraph::new("Loading plot…"));
        return;
    };

    let title = match form.mode() {
        FormMode::Register => "Register plot".to_string(),
        FormMode::Edit => format!("Edit {}", form.form.name),
    };
    let card = Card::new(&title, &theme).focused(true);
    let inner = card.inner(area);
    frame.render_widget(card.block(), area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let lines = field_lines(form, &theme);
    let height = usize::from(layout[0].height);
    let offset = form
        .focus
        .saturating_sub(height.saturating_sub(1))
        .min(lines.len().saturating_sub(height));
    let visible = lines.into_iter().skip(offset).take(height).collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(visible), layout[0]);

    let tenants = form.form.tenants.len();
    let footer = if form.form.plot_type.is_none() {
        "Choose a plot type with ←/→ to continue.".to_string()
    } else if tenants > 0 {
        format!("{tenants} tenant rows")
    } else {
        String::new()
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            footer,
            Style::default().fg(theme.dim),
        ))),
        layout[1],
    );
}

fn field_lines(form: &PlotFormState, theme: &Theme) -> Vec<Line<'static>> {
    let focused = form.focused();
    form.fields()
        .into_iter()
        .map(|field| {
            let label = field.label();
            let value = form.value(field);
            let invalid = !form.is_valid(field) && !value.is_empty();
            let row = FieldRow::new(&label, &value)
                .focused(field == focused)
                .invalid(invalid);
            let row = match field {
                PlotField::PlotType => row.hint("←/→ to change"),
                PlotField::CaretakerPhone | PlotField::MpesaNumber | PlotField::TenantPhone(_)
                    if invalid =>
                {
                    row.hint("use 07XXXXXXXX or 2547XXXXXXXX")
                }
                PlotField::LumpsumExpected | PlotField::FeePerTenant => {
                    row.hint("KES")
                }
                _ => row,
            };
            row.line(theme)
        })
        .collect()
}
