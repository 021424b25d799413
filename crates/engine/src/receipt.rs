//! Receipt layout.
//!
//! A payment is turned into an ordered list of [`Op`]s once; the thermal
//! printer encoder ([`crate::escpos`]) and the HTML print document
//! ([`crate::html`]) both walk that same list, so they always carry the same
//! values in the same order.

use api_types::{Shillings, payment::Payment};
use chrono_tz::Tz;

use crate::ReceiptStatus;

/// 58 mm paper fits 32 characters of the default font.
pub const DEFAULT_COLUMNS: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    Align(Align),
    Bold(bool),
    /// Width and height multipliers (1..=8).
    Size(u8, u8),
    /// One printed line, without the trailing newline.
    Line(String),
    /// Dashed separator spanning the full width.
    Rule,
    Feed(u8),
    Qr(String),
    Cut,
}

#[derive(Clone, Debug)]
pub struct ReceiptOptions {
    pub business_name: String,
    /// Verification page; the payment id is appended as `?id=`.
    pub verify_url: String,
    pub footer: Vec<String>,
    pub columns: usize,
    pub timezone: Tz,
}

impl Default for ReceiptOptions {
    fn default() -> Self {
        Self {
            business_name: "JAWU".to_string(),
            verify_url: "https://jobawu.vercel.app/valid-receipt".to_string(),
            footer: vec!["Jobawu General Merchants".to_string()],
            columns: DEFAULT_COLUMNS,
            timezone: chrono_tz::Africa::Nairobi,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Receipt {
    pub payment_id: String,
    pub columns: usize,
    pub ops: Vec<Op>,
}

impl Receipt {
    /// Every literal value on the receipt, in print order.
    pub fn values(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Line(text) | Op::Qr(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn verify_url(&self) -> Option<&str> {
        self.ops.iter().find_map(|op| match op {
            Op::Qr(url) => Some(url.as_str()),
            _ => None,
        })
    }
}

struct Layout {
    columns: usize,
    ops: Vec<Op>,
}

impl Layout {
    fn push(&mut self, op: Op) -> &mut Self {
        self.ops.push(op);
        self
    }

    fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Op::Line(text.into()))
    }

    fn field(&mut self, label: &str, value: &str) -> &mut Self {
        self.line(format!("{label}: {value}"))
    }

    /// Label on the left, amount flush right.
    fn amount(&mut self, label: &str, value: Shillings) -> &mut Self {
        let left = format!("{label}:");
        let right = value.to_string();
        let used = left.chars().count() + right.chars().count();
        let gap = self.columns.saturating_sub(used).max(1);
        self.line(format!("{left}{}{right}", " ".repeat(gap)))
    }
}

/// Builds the receipt layout for one payment.
///
/// The total is `amount.total` when the backend supplies it and the cash
/// value otherwise; nothing is summed here.
pub fn build_receipt(payment: &Payment, options: &ReceiptOptions) -> Receipt {
    let mut layout = Layout {
        columns: options.columns.max(16),
        ops: Vec::new(),
    };
    let status = ReceiptStatus::derive(&payment.statuses);
    let amounts = &payment.amount;
    let or_dash = |value: Option<&str>| {
        value
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or("-")
            .to_string()
    };

    // header
    layout
        .push(Op::Align(Align::Center))
        .push(Op::Bold(true))
        .push(Op::Size(2, 2))
        .line(options.business_name.clone())
        .push(Op::Size(1, 1))
        .push(Op::Bold(false))
        .line("PAYMENT RECEIPT")
        .line(format!("Status: {}", status.label()))
        .push(Op::Feed(1));

    // customer
    layout
        .push(Op::Align(Align::Left))
        .push(Op::Rule)
        .field("Name", &or_dash(payment.name.as_deref()))
        .field("Phone", &or_dash(payment.phone.as_deref()));
    if let Some(plot) = payment.plot_name.as_deref().filter(|p| !p.trim().is_empty()) {
        layout.field("Plot", plot.trim());
    }
    layout
        .field("Month Paid", &or_dash(payment.month.as_deref()))
        .push(Op::Rule);

    // breakdown
    layout
        .push(Op::Bold(true))
        .line("Amount Breakdown")
        .push(Op::Bold(false))
        .amount("Cash", amounts.cash.unwrap_or_default())
        .amount("Mpesa", amounts.mpesa.unwrap_or_default());
    match (payment.overpayment(), payment.balance) {
        (Some(over), _) if over.is_positive() => layout.amount("Overpayment", over),
        (_, Some(balance)) if !balance.is_zero() => layout.amount("Balance", balance),
        (over, _) => layout.amount("Overpayment", over.unwrap_or_default()),
    };
    layout.push(Op::Rule);

    // total
    let total = amounts.total.or(amounts.cash).unwrap_or_default();
    layout
        .push(Op::Bold(true))
        .amount("Total", total)
        .push(Op::Bold(false))
        .push(Op::Rule);

    // due / cleared
    let due = payment
        .less
        .as_ref()
        .and_then(|less| less.amount.filter(|amount| amount.is_positive()).map(|a| (a, less)));
    match due {
        Some((amount, less)) => {
            layout
                .amount("Less", amount)
                .field("Due Month", &or_dash(less.due_month.as_deref()));
        }
        None => {
            layout
                .push(Op::Align(Align::Center))
                .push(Op::Bold(true))
                .line("CLEARED")
                .push(Op::Bold(false))
                .push(Op::Align(Align::Left));
        }
    }
    layout.push(Op::Rule);

    // meta
    let local = payment
        .created_at
        .map(|at| at.with_timezone(&options.timezone));
    let date = local
        .map(|at| at.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string());
    let time = payment
        .time
        .as_deref()
        .map(str::trim)
        .filter(|time| !time.is_empty())
        .map(str::to_string)
        .or_else(|| local.map(|at| at.format("%H:%M").to_string()))
        .unwrap_or_else(|| "-".to_string());
    layout
        .field("Payment ID", &payment.id)
        .field("Date", &date)
        .field("Time", &time)
        .push(Op::Rule)
        .push(Op::Feed(1));

    // verification
    layout
        .push(Op::Align(Align::Center))
        .push(Op::Qr(verify_link(&options.verify_url, &payment.id)))
        .line("Scan to verify receipt")
        .push(Op::Feed(1));

    // footer
    for line in &options.footer {
        layout.line(line.clone());
    }
    layout.push(Op::Feed(2)).push(Op::Cut);

    Receipt {
        payment_id: payment.id.clone(),
        columns: layout.columns,
        ops: layout.ops,
    }
}

fn verify_link(base: &str, payment_id: &str) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}id={}", encode_component(payment_id))
}

fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use api_types::payment::{LessRecord, PaymentAmount, StatusEntry};
    use chrono::{TimeZone, Utc};

    use super::*;

    fn payment() -> Payment {
        Payment {
            id: "PAY123".to_string(),
            name: Some("Alice Wanjiru".to_string()),
            phone: Some("254711111111".to_string()),
            plot_name: Some("Hunters Ridge".to_string()),
            month: Some("September".to_string()),
            amount: PaymentAmount {
                cash: Some(Shillings::new(500)),
                mpesa: Some(Shillings::new(300)),
                overpayment: None,
                total: None,
            },
            statuses: vec![StatusEntry {
                state: "complete".to_string(),
            }],
            created_at: Utc.with_ymd_and_hms(2025, 9, 15, 7, 30, 0).single(),
            ..Payment::default()
        }
    }

    fn has_line(receipt: &Receipt, wanted: &str) -> bool {
        receipt.values().iter().any(|value| *value == wanted)
    }

    #[test]
    fn blocks_come_in_fixed_order() {
        let receipt = build_receipt(&payment(), &ReceiptOptions::default());
        let values = receipt.values();
        let index = |needle: &str| {
            values
                .iter()
                .position(|value| value.starts_with(needle))
                .unwrap_or_else(|| panic!("missing {needle}"))
        };

        let order = [
            index("JAWU"),
            index("PAYMENT RECEIPT"),
            index("Status: COMPLETE"),
            index("Name: Alice Wanjiru"),
            index("Phone: 254711111111"),
            index("Plot: Hunters Ridge"),
            index("Month Paid: September"),
            index("Amount Breakdown"),
            index("Cash:"),
            index("Mpesa:"),
            index("Total:"),
            index("CLEARED"),
            index("Payment ID: PAY123"),
            index("Date: 15/09/2025"),
            index("https://jobawu.vercel.app/valid-receipt?id=PAY123"),
            index("Scan to verify receipt"),
            index("Jobawu General Merchants"),
        ];
        assert!(order.windows(2).all(|pair| pair[0] < pair[1]), "{values:?}");
    }

    #[test]
    fn total_is_never_summed() {
        let receipt = build_receipt(&payment(), &ReceiptOptions::default());
        let total = receipt
            .values()
            .into_iter()
            .find(|value| value.starts_with("Total:"))
            .unwrap();
        assert!(total.ends_with("KES 500"), "{total}");
        assert!(!total.contains("800"));
    }

    #[test]
    fn explicit_total_is_used_as_given() {
        let mut payment = payment();
        payment.amount.total = Some(Shillings::new(750));
        let receipt = build_receipt(&payment, &ReceiptOptions::default());
        assert!(receipt.values().iter().any(|v| v.starts_with("Total:") && v.ends_with("KES 750")));
    }

    #[test]
    fn amount_lines_fill_the_paper_width() {
        let receipt = build_receipt(&payment(), &ReceiptOptions::default());
        let cash = receipt
            .values()
            .into_iter()
            .find(|value| value.starts_with("Cash:"))
            .unwrap();
        assert_eq!(cash.chars().count(), DEFAULT_COLUMNS);
    }

    #[test]
    fn due_block_replaces_cleared() {
        let mut payment = payment();
        payment.less = Some(LessRecord {
            amount: Some(Shillings::new(200)),
            due_month: Some("October".to_string()),
        });
        let receipt = build_receipt(&payment, &ReceiptOptions::default());
        assert!(!has_line(&receipt, "CLEARED"));
        assert!(has_line(&receipt, "Due Month: October"));
        assert!(receipt.values().iter().any(|v| v.starts_with("Less:") && v.ends_with("KES 200")));
    }

    #[test]
    fn zero_less_counts_as_cleared() {
        let mut payment = payment();
        payment.less = Some(LessRecord {
            amount: Some(Shillings::ZERO),
            due_month: Some("October".to_string()),
        });
        assert!(has_line(
            &build_receipt(&payment, &ReceiptOptions::default()),
            "CLEARED"
        ));
    }

    #[test]
    fn balance_shown_only_without_overpayment() {
        let mut payment = payment();
        payment.balance = Some(Shillings::new(100));
        let receipt = build_receipt(&payment, &ReceiptOptions::default());
        assert!(receipt.values().iter().any(|v| v.starts_with("Balance:")));

        payment.overpayment = Some(Shillings::new(40));
        let receipt = build_receipt(&payment, &ReceiptOptions::default());
        assert!(receipt.values().iter().any(|v| v.starts_with("Overpayment:")));
        assert!(!receipt.values().iter().any(|v| v.starts_with("Balance:")));
    }

    #[test]
    fn time_prefers_backend_value_and_falls_back_to_timezone() {
        let receipt = build_receipt(&payment(), &ReceiptOptions::default());
        // 07:30 UTC is 10:30 in Nairobi.
        assert!(has_line(&receipt, "Time: 10:30"));

        let mut payment = payment();
        payment.time = Some("9:05 AM".to_string());
        assert!(has_line(
            &build_receipt(&payment, &ReceiptOptions::default()),
            "Time: 9:05 AM"
        ));
    }

    #[test]
    fn missing_values_print_as_dash() {
        let payment = Payment {
            id: "X".to_string(),
            ..Payment::default()
        };
        let receipt = build_receipt(&payment, &ReceiptOptions::default());
        assert!(has_line(&receipt, "Name: -"));
        assert!(has_line(&receipt, "Date: -"));
        assert!(has_line(&receipt, "Status: UNRECOGNIZED"));
    }

    #[test]
    fn verify_link_escapes_the_id() {
        assert_eq!(
            verify_link("https://x.test/valid", "a b/c"),
            "https://x.test/valid?id=a%20b%2Fc"
        );
        assert_eq!(
            verify_link("https://x.test/valid?src=qr", "id1"),
            "https://x.test/valid?src=qr&id=id1"
        );
    }
}
