use api_types::payment::Payment;
use chrono::Datelike;

use crate::Contact;

pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn contains(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|value| value.to_lowercase().contains(needle))
}

/// Payments whose id, phone, payer name or source contains `query`.
pub fn filter_payments<'a>(payments: &'a [Payment], query: &str) -> Vec<&'a Payment> {
    let needle = query.trim().to_lowercase();
    payments
        .iter()
        .filter(|payment| {
            needle.is_empty()
                || contains(Some(&payment.id), &needle)
                || contains(payment.phone.as_deref(), &needle)
                || contains(payment.name.as_deref(), &needle)
                || contains(payment.source.as_deref(), &needle)
        })
        .collect()
}

/// Contacts whose name, phone or plot name contains `query`.
pub fn filter_contacts<'a>(contacts: &'a [Contact], query: &str) -> Vec<&'a Contact> {
    let needle = query.trim().to_lowercase();
    contacts
        .iter()
        .filter(|contact| {
            needle.is_empty()
                || contains(Some(&contact.name), &needle)
                || contains(Some(&contact.phone), &needle)
                || contains(Some(&contact.plot_name), &needle)
        })
        .collect()
}

/// Receipts page filter. `None` means "all".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReceiptFilter {
    pub month: Option<String>,
    pub year: Option<u32>,
    pub plot: Option<String>,
}

impl ReceiptFilter {
    pub fn is_empty(&self) -> bool {
        self.month.is_none() && self.year.is_none() && self.plot.is_none()
    }

    pub fn matches(&self, payment: &Payment) -> bool {
        let month_ok = self.month.as_deref().is_none_or(|month| {
            payment
                .month
                .as_deref()
                .is_some_and(|paid| paid.trim().eq_ignore_ascii_case(month.trim()))
        });

        let year_ok = self.year.is_none_or(|year| {
            payment
                .year
                .or_else(|| payment.created_at.and_then(|at| u32::try_from(at.year()).ok()))
                == Some(year)
        });

        let plot_ok = self.plot.as_deref().is_none_or(|plot| {
            payment.plot_name.as_deref().is_some_and(|name| name.eq_ignore_ascii_case(plot))
                || payment.plot_id.as_deref() == Some(plot)
        });

        month_ok && year_ok && plot_ok
    }

    pub fn apply<'a>(&self, payments: &'a [Payment]) -> Vec<&'a Payment> {
        payments.iter().filter(|p| self.matches(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::ContactKind;

    fn payment(id: &str, name: &str, month: &str, year: Option<u32>) -> Payment {
        Payment {
            id: id.to_string(),
            name: Some(name.to_string()),
            phone: Some("254711111111".to_string()),
            source: Some("mpesa".to_string()),
            plot_name: Some("Hunters Ridge".to_string()),
            plot_id: Some("p1".to_string()),
            month: Some(month.to_string()),
            year,
            ..Payment::default()
        }
    }

    #[test]
    fn payment_search_is_case_insensitive_over_four_fields() {
        let payments = vec![
            payment("ABC1", "Alice", "September", Some(2025)),
            payment("XYZ2", "Brian", "August", Some(2025)),
        ];
        assert_eq!(filter_payments(&payments, "alice").len(), 1);
        assert_eq!(filter_payments(&payments, "xyz").len(), 1);
        assert_eq!(filter_payments(&payments, "MPESA").len(), 2);
        assert_eq!(filter_payments(&payments, "0711").len(), 0);
        assert_eq!(filter_payments(&payments, "  ").len(), 2);
    }

    #[test]
    fn contact_search_covers_plot_name() {
        let contacts = vec![Contact {
            kind: ContactKind::Tenant,
            name: "Alice".to_string(),
            phone: "254711111111".to_string(),
            amount: None,
            status: None,
            plot_id: "p1".to_string(),
            plot_name: "Hunters Ridge".to_string(),
            plot_location: String::new(),
        }];
        assert_eq!(filter_contacts(&contacts, "hunters").len(), 1);
        assert_eq!(filter_contacts(&contacts, "2547").len(), 1);
        assert!(filter_contacts(&contacts, "green").is_empty());
    }

    #[test]
    fn receipt_filter_combines_criteria() {
        let mut dated = payment("C3", "Carol", "August", None);
        dated.created_at = Utc.with_ymd_and_hms(2024, 8, 2, 9, 0, 0).single();
        let payments = vec![
            payment("A1", "Alice", "September", Some(2025)),
            payment("B2", "Brian", "august", Some(2025)),
            dated,
        ];

        assert_eq!(ReceiptFilter::default().apply(&payments).len(), 3);

        let august = ReceiptFilter {
            month: Some("August".to_string()),
            ..ReceiptFilter::default()
        };
        assert_eq!(august.apply(&payments).len(), 2);

        let august_2024 = ReceiptFilter {
            year: Some(2024),
            ..august
        };
        let hits = august_2024.apply(&payments);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "C3");

        let other_plot = ReceiptFilter {
            plot: Some("Green Court".to_string()),
            ..ReceiptFilter::default()
        };
        assert!(other_plot.apply(&payments).is_empty());
    }
}
