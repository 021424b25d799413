use api_types::{
    Shillings,
    plot::TenantStatus,
};
use engine::ReceiptStatus;
use ratatui::{
    style::{Modifier, Style},
    text::Span,
};

use crate::ui::theme::Theme;

/// `KES 1,250`, or a dash when the backend sent nothing.
#[must_use]
pub fn amount_text(amount: Option<Shillings>) -> String {
    amount.map_or_else(|| "-".to_string(), |value| value.to_string())
}

#[must_use]
pub fn styled_amount(amount: Option<Shillings>, theme: &Theme) -> Span<'static> {
    let color = match amount {
        Some(value) if value.is_positive() => theme.text,
        _ => theme.dim,
    };
    Span::styled(amount_text(amount), Style::default().fg(color))
}

/// Outstanding amounts read red, settled ones green.
#[must_use]
pub fn styled_balance(amount: Shillings, theme: &Theme) -> Span<'static> {
    let color = if amount.is_positive() {
        theme.error
    } else {
        theme.positive
    };
    Span::styled(
        amount.to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

#[must_use]
pub fn tenant_status(status: Option<TenantStatus>, theme: &Theme) -> Span<'static> {
    let (label, color) = match status {
        Some(TenantStatus::Paid) => ("Paid", theme.positive),
        Some(TenantStatus::Pending) => ("Pending", theme.warning),
        Some(TenantStatus::Unpaid) => ("Unpaid", theme.error),
        None => ("-", theme.dim),
    };
    Span::styled(label, Style::default().fg(color))
}

#[must_use]
pub fn receipt_status(status: ReceiptStatus, theme: &Theme) -> Span<'static> {
    let color = match status {
        ReceiptStatus::Complete => theme.positive,
        ReceiptStatus::Incomplete => theme.warning,
        ReceiptStatus::Unrecognized => theme.dim,
    };
    Span::styled(status.label(), Style::default().fg(color))
}

/// Fixed-width text bar for the collection rate; rates above 100 fill it.
#[must_use]
pub fn rate_bar(rate: u32, width: usize) -> String {
    let filled = (usize::try_from(rate).unwrap_or(usize::MAX).min(100) * width) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_amounts_show_a_dash() {
        assert_eq!(amount_text(None), "-");
        assert_eq!(amount_text(Some(Shillings::new(1250))), "KES 1,250");
    }

    #[test]
    fn rate_bar_is_clamped_to_its_width() {
        assert_eq!(rate_bar(0, 4), "░░░░");
        assert_eq!(rate_bar(50, 4), "██░░");
        assert_eq!(rate_bar(135, 4), "████");
    }
}
