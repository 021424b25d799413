pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use engine::{AdminPage, Route};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AppState, Modal};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let area = frame.area();
    if state.is_checking() {
        screens::status::render_checking(frame, area);
    } else {
        match &state.route {
            Route::Login => screens::login::render(frame, area, state),
            Route::NotFound(path) => screens::status::render_not_found(frame, area, path),
            _ => render_shell(frame, area, state),
        }
    }
    components::toast::render(frame, area, state.toast.as_ref());
}

fn render_shell(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let tab = state.admin_tab();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(if tab.is_some() { 2 } else { 0 }),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    if let Some(tab) = tab {
        components::tabs::render_tabs(frame, layout[1], tab, &theme);
    }

    let content = layout[2];
    match &state.route {
        Route::Dashboard => screens::dashboard::render(frame, content, state),
        Route::PlotDetail(_) => screens::plot_detail::render(frame, content, state),
        Route::Admin(page) => match page {
            AdminPage::Payments => screens::payments::render(frame, content, state),
            AdminPage::Plots => screens::plots::render(frame, content, state),
            AdminPage::RegisterPlot | AdminPage::EditPlot(_) => {
                screens::plot_form::render(frame, content, state);
            }
            AdminPage::Tenants => screens::tenants::render(frame, content, state),
            AdminPage::Receipts => screens::receipts::render(frame, content, state),
            AdminPage::Settings => screens::settings::render(frame, content, state),
        },
        Route::Login | Route::NotFound(_) => {}
    }

    render_bottom_bar(frame, layout[3], state, &theme);
    if let Some(modal) = &state.modal {
        screens::modals::render(frame, area, state, modal);
    }
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let user = state.auth.user();
    let email = user.map_or("-", |user| user.email.as_str());
    let role = user
        .and_then(|user| user.role.as_ref())
        .map_or_else(|| "no role".to_string(), ToString::to_string);
    let sync = state
        .connection
        .last_sync
        .map_or_else(|| "-".to_string(), |dt| dt.format("%H:%M:%S").to_string());
    let (status, status_style) = if state.connection.online {
        ("OK", Style::default().fg(theme.positive))
    } else {
        ("OFFLINE", Style::default().fg(theme.error))
    };

    let line = Line::from(vec![
        Span::styled("CollectPro", Style::default().fg(theme.accent)),
        Span::raw("  "),
        Span::styled("User", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {email}  ")),
        Span::styled("Role", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {role}  ")),
        Span::styled("Sync", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {sync}  ")),
        Span::styled(status, status_style),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let separator = || Span::styled("  │  ", Style::default().fg(theme.border));
    let mut parts = Vec::new();

    if !state.is_editing() {
        if state.can_administer() {
            parts.extend(hints(&[("d", "dashboard"), ("a", "admin")], theme));
        } else {
            parts.extend(hints(&[("d", "dashboard")], theme));
        }
        if state.admin_tab().is_some() {
            parts.push(separator());
            parts.extend(components::tabs::tab_shortcuts(theme));
        }
    }

    let context = context_hints(state, theme);
    if !context.is_empty() {
        if !parts.is_empty() {
            parts.push(separator());
        }
        parts.extend(context);
    }

    if !state.is_editing() {
        parts.push(separator());
        parts.extend(hints(&[("o", "sign out"), ("q", "quit")], theme));
    }

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

fn hints(pairs: &[(&'static str, &'static str)], theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (i, (key, label)) in pairs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(*key, Style::default().fg(theme.accent)));
        spans.push(Span::raw(format!(" {label}")));
    }
    spans
}

/// Keyboard hints for the current route and mode.
fn context_hints(state: &AppState, theme: &Theme) -> Vec<Span<'static>> {
    if let Some(modal) = &state.modal {
        return match modal {
            Modal::Confirm(_) => hints(&[("y", "confirm"), ("n", "cancel")], theme),
            Modal::Stk(_) | Modal::PaymentEdit(_) => hints(
                &[("Tab", "next"), ("Enter", "send"), ("Esc", "cancel")],
                theme,
            ),
        };
    }

    match &state.route {
        Route::Dashboard => hints(&[("↑↓", "select"), ("Enter", "open"), ("r", "refresh")], theme),
        Route::PlotDetail(_) if state.can_administer() => {
            hints(&[("b", "back"), ("s", "STK push"), ("r", "refresh")], theme)
        }
        Route::PlotDetail(_) => hints(&[("b", "back"), ("r", "refresh")], theme),
        Route::Admin(AdminPage::Payments) if state.payments.search.active => {
            hints(&[("Enter", "done"), ("Esc", "clear")], theme)
        }
        Route::Admin(AdminPage::Payments) => hints(
            &[
                ("/", "search"),
                ("e", "edit"),
                ("x", "delete"),
                ("p", "print"),
                ("s", "STK"),
                ("c", "CSV"),
            ],
            theme,
        ),
        Route::Admin(AdminPage::Plots) => hints(
            &[
                ("n", "register"),
                ("e", "edit"),
                ("x", "delete"),
                ("Enter", "open"),
                ("s", "STK"),
            ],
            theme,
        ),
        Route::Admin(AdminPage::RegisterPlot | AdminPage::EditPlot(_)) => hints(
            &[
                ("Tab", "next"),
                ("←→", "type"),
                ("^N", "add tenant"),
                ("^D", "remove tenant"),
                ("Enter", "save"),
                ("Esc", "back"),
            ],
            theme,
        ),
        Route::Admin(AdminPage::Tenants) if state.tenants.search.active => {
            hints(&[("Enter", "done"), ("Esc", "clear")], theme)
        }
        Route::Admin(AdminPage::Tenants) => hints(
            &[("/", "search"), ("s", "STK"), ("Enter", "open plot")],
            theme,
        ),
        Route::Admin(AdminPage::Receipts) if state.receipts.editing => hints(
            &[("Tab", "next"), ("←→", "change"), ("Enter", "done")],
            theme,
        ),
        Route::Admin(AdminPage::Receipts) => {
            hints(&[("f", "filter"), ("c", "clear"), ("p", "print")], theme)
        }
        Route::Admin(AdminPage::Settings) if state.settings.editing => hints(
            &[
                ("Tab", "next"),
                ("Space", "toggle"),
                ("Enter", "save"),
                ("Esc", "discard"),
            ],
            theme,
        ),
        Route::Admin(AdminPage::Settings) => hints(&[("e", "edit")], theme),
        Route::Login | Route::NotFound(_) => Vec::new(),
    }
}
