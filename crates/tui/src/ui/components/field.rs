use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
};

use crate::ui::theme::Theme;

/// Label column width for form rows.
const LABEL_WIDTH: u16 = 22;

pub struct FieldRow<'a> {
    pub label: &'a str,
    pub value: &'a str,
    pub focused: bool,
    pub masked: bool,
    /// Drawn in the error color, e.g. a phone the normalizer rejected.
    pub invalid: bool,
    pub hint: Option<&'a str>,
}

impl<'a> FieldRow<'a> {
    pub fn new(label: &'a str, value: &'a str) -> Self {
        Self {
            label,
            value,
            focused: false,
            masked: false,
            invalid: false,
            hint: None,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn masked(mut self, masked: bool) -> Self {
        self.masked = masked;
        self
    }

    pub fn invalid(mut self, invalid: bool) -> Self {
        self.invalid = invalid;
        self
    }

    pub fn hint(mut self, hint: &'a str) -> Self {
        self.hint = Some(hint);
        self
    }

    pub fn line(&self, theme: &Theme) -> Line<'static> {
        let cursor = if self.focused { "│" } else { "" };
        let shown = if self.masked {
            mask(self.value)
        } else {
            self.value.to_string()
        };
        let value_style = if self.invalid {
            Style::default().fg(theme.error)
        } else if self.focused {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.text)
        };
        let label_style = if self.focused {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.text_muted)
        };

        let mut spans = vec![
            Span::styled(
                format!("{:<width$}", self.label, width = usize::from(LABEL_WIDTH)),
                label_style,
            ),
            Span::styled(format!("{shown}{cursor}"), value_style),
        ];
        if let Some(hint) = self.hint {
            spans.push(Span::styled(
                format!("  {hint}"),
                Style::default().fg(theme.dim),
            ));
        }
        Line::from(spans)
    }
}

/// Bullets, one per character.
pub fn mask(value: &str) -> String {
    "•".repeat(value.chars().count())
}

/// Centers a fixed-size box inside `area`.
pub fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height.min(area.height)),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width.min(area.width)),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}
