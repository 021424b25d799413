use std::io::Write;

use api_types::payment::Payment;
use serde::Serialize;

use crate::ResultEngine;

#[derive(Serialize)]
struct PaymentRow<'a> {
    id: &'a str,
    name: &'a str,
    phone: &'a str,
    month: &'a str,
    cash: i64,
    mpesa: i64,
    overpayment: i64,
    balance: i64,
    status: &'a str,
    source: &'a str,
    time: String,
}

impl<'a> From<&'a Payment> for PaymentRow<'a> {
    fn from(payment: &'a Payment) -> Self {
        let value = |amount: Option<api_types::Shillings>| amount.unwrap_or_default().value();
        Self {
            id: &payment.id,
            name: payment.name.as_deref().unwrap_or_default(),
            phone: payment.phone.as_deref().unwrap_or_default(),
            month: payment.month.as_deref().unwrap_or_default(),
            cash: value(payment.amount.cash),
            mpesa: value(payment.amount.mpesa),
            overpayment: value(payment.overpayment()),
            balance: value(payment.balance),
            status: payment.status.map(|s| s.as_str()).unwrap_or_default(),
            source: payment.source.as_deref().unwrap_or_default(),
            time: payment
                .created_at
                .map(|at| at.to_rfc3339())
                .or_else(|| payment.time.clone())
                .unwrap_or_default(),
        }
    }
}

/// Writes one CSV row per payment, header first.
pub fn write_payments_csv<W: Write>(payments: &[Payment], writer: W) -> ResultEngine<()> {
    let mut csv = csv::Writer::from_writer(writer);
    if payments.is_empty() {
        csv.write_record([
            "id",
            "name",
            "phone",
            "month",
            "cash",
            "mpesa",
            "overpayment",
            "balance",
            "status",
            "source",
            "time",
        ])?;
    }
    for payment in payments {
        csv.serialize(PaymentRow::from(payment))?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use api_types::{
        Shillings,
        payment::{PaymentAmount, PaymentStatus},
    };

    use super::*;

    #[test]
    fn writes_header_and_rows() {
        let payments = vec![Payment {
            id: "x1".to_string(),
            name: Some("Wanjiru, A.".to_string()),
            phone: Some("254711111111".to_string()),
            month: Some("September".to_string()),
            amount: PaymentAmount {
                cash: Some(Shillings::new(500)),
                mpesa: Some(Shillings::new(300)),
                overpayment: Some(Shillings::new(20)),
                total: None,
            },
            status: Some(PaymentStatus::Completed),
            source: Some("mpesa".to_string()),
            time: Some("10:30".to_string()),
            ..Payment::default()
        }];
        let mut out = Vec::new();
        write_payments_csv(&payments, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("id,name,phone,month,cash,mpesa,overpayment,balance,status,source,time")
        );
        assert_eq!(
            lines.next(),
            Some("x1,\"Wanjiru, A.\",254711111111,September,500,300,20,0,completed,mpesa,10:30")
        );
    }

    #[test]
    fn empty_export_still_has_header() {
        let mut out = Vec::new();
        write_payments_csv(&[], &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("id,name,phone"));
    }
}
