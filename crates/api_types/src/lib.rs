use serde::{Deserialize, Serialize};

pub mod money;
pub mod time;

pub use money::Shillings;

/// Generic `{success, message}` / `{error}` body returned by the backend for
/// write operations (delete, update, STK push).
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Ack {
    /// A 2xx response can still carry `success: false`.
    pub fn is_rejected(&self) -> bool {
        self.success == Some(false)
    }

    /// Best human-readable message carried by the body, if any.
    pub fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|text| !text.trim().is_empty())
    }
}

pub mod plot {
    use super::*;
    use crate::money::{lenient, lenient_count};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum PlotType {
        Lumpsum,
        Individual,
    }

    impl PlotType {
        pub fn label(self) -> &'static str {
            match self {
                Self::Lumpsum => "Lumpsum",
                Self::Individual => "Individual",
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum TenantStatus {
        Paid,
        Unpaid,
        Pending,
    }

    impl TenantStatus {
        pub fn label(self) -> &'static str {
            match self {
                Self::Paid => "Paid",
                Self::Unpaid => "Unpaid",
                Self::Pending => "Pending",
            }
        }
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Tenant {
        #[serde(default)]
        pub id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub plot_id: Option<String>,
        #[serde(default)]
        pub name: String,
        #[serde(default)]
        pub phone: String,
        /// Monthly fee. Registration payloads call this `amount`.
        #[serde(
            default,
            alias = "amount",
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        pub fee: Option<Shillings>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub status: Option<TenantStatus>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub date_paid: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub mpesa_ref: Option<String>,
    }

    #[derive(Clone, Debug, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Plot {
        #[serde(default)]
        pub id: String,
        #[serde(default)]
        pub name: String,
        #[serde(default)]
        pub location: String,
        #[serde(default, alias = "type")]
        pub plot_type: Option<PlotType>,
        #[serde(default)]
        pub caretaker_name: Option<String>,
        #[serde(default)]
        pub caretaker_phone: Option<String>,
        #[serde(default, deserialize_with = "lenient_count")]
        pub units: Option<u32>,
        #[serde(default, deserialize_with = "lenient")]
        pub lumpsum_expected: Option<Shillings>,
        #[serde(default)]
        pub mpesa_number: Option<String>,
        #[serde(default, deserialize_with = "lenient")]
        pub fee_per_tenant: Option<Shillings>,
        #[serde(default)]
        pub tenants: Vec<Tenant>,
        /// Aggregates, present only when the backend computes them.
        #[serde(default, deserialize_with = "lenient")]
        pub total_expected: Option<Shillings>,
        #[serde(default, deserialize_with = "lenient")]
        pub total_paid: Option<Shillings>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct PlotsResponse {
        #[serde(default)]
        pub plots: Vec<Plot>,
    }

    #[derive(Debug, Deserialize)]
    pub struct PlotResponse {
        pub plot: Plot,
    }

    /// A tenant row as sent by the register/edit forms.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TenantDraft {
        pub id: String,
        pub name: String,
        pub phone: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub amount: Option<Shillings>,
    }

    /// Body of `POST /api/plots/registerplot` and `PUT /api/plots/:id`.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PlotPayload {
        pub plot_type: PlotType,
        pub name: String,
        pub location: String,
        pub caretaker_name: String,
        pub caretaker_phone: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub units: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub lumpsum_expected: Option<Shillings>,
        pub mpesa_number: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub fee_per_tenant: Option<Shillings>,
        /// Always empty for lumpsum plots.
        pub tenants: Vec<TenantDraft>,
    }
}

pub mod payment {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::{
        money::{lenient, lenient_count},
        time::lenient_timestamp,
    };

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum PaymentStatus {
        Completed,
        Pending,
        Incomplete,
        #[serde(other)]
        Unknown,
    }

    impl PaymentStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Completed => "completed",
                Self::Pending => "pending",
                Self::Incomplete => "incomplete",
                Self::Unknown => "unknown",
            }
        }
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct PaymentAmount {
        #[serde(default, deserialize_with = "lenient")]
        pub cash: Option<Shillings>,
        #[serde(default, deserialize_with = "lenient")]
        pub mpesa: Option<Shillings>,
        #[serde(default, deserialize_with = "lenient")]
        pub overpayment: Option<Shillings>,
        /// Explicit total, when the backend supplies one. Never derived.
        #[serde(default, deserialize_with = "lenient")]
        pub total: Option<Shillings>,
    }

    /// One entry of the status trail attached to a payment.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct StatusEntry {
        #[serde(default)]
        pub state: String,
    }

    /// Outstanding amount still due after this payment.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LessRecord {
        #[serde(default, deserialize_with = "lenient")]
        pub amount: Option<Shillings>,
        #[serde(default)]
        pub due_month: Option<String>,
    }

    #[derive(Clone, Debug, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payment {
        #[serde(default)]
        pub id: String,
        #[serde(default)]
        pub plot_id: Option<String>,
        #[serde(default)]
        pub plot_name: Option<String>,
        #[serde(default)]
        pub tenant_id: Option<String>,
        #[serde(default)]
        pub name: Option<String>,
        #[serde(default)]
        pub phone: Option<String>,
        #[serde(default)]
        pub amount: PaymentAmount,
        #[serde(default, deserialize_with = "lenient")]
        pub balance: Option<Shillings>,
        #[serde(default, deserialize_with = "lenient")]
        pub overpayment: Option<Shillings>,
        #[serde(default)]
        pub status: Option<PaymentStatus>,
        #[serde(default)]
        pub statuses: Vec<StatusEntry>,
        #[serde(default)]
        pub less: Option<LessRecord>,
        #[serde(default)]
        pub month: Option<String>,
        #[serde(default, deserialize_with = "lenient_count")]
        pub year: Option<u32>,
        #[serde(default)]
        pub source: Option<String>,
        #[serde(default)]
        pub mpesa_ref: Option<String>,
        /// Display time as formatted by the backend.
        #[serde(default)]
        pub time: Option<String>,
        #[serde(default, deserialize_with = "lenient_timestamp")]
        pub created_at: Option<DateTime<Utc>>,
    }

    impl Payment {
        /// Top-level overpayment wins over the nested one.
        pub fn overpayment(&self) -> Option<Shillings> {
            self.overpayment.or(self.amount.overpayment)
        }
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct PaymentsResponse {
        #[serde(default)]
        pub success: Option<bool>,
        #[serde(default)]
        pub message: Option<String>,
        #[serde(default)]
        pub payments: Vec<Payment>,
    }

    #[derive(Debug, Deserialize)]
    pub struct PaymentResponse {
        pub payment: Payment,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CashTopUp {
        pub cash: Shillings,
    }

    /// Body of `PUT /api/payments/:id`. MPESA amounts are not editable.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PaymentUpdate {
        pub name: String,
        pub phone: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub amount: Option<CashTopUp>,
    }
}

pub mod stk {
    use super::*;

    /// Body of `POST /api/stk`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct StkPush {
        /// Normalized `254XXXXXXXXX` number.
        pub phone: String,
        pub amount: Shillings,
    }
}

#[cfg(test)]
mod tests {
    use super::{payment::*, plot::*, *};

    #[test]
    fn plot_accepts_form_echoed_strings() {
        let plot: Plot = serde_json::from_str(
            r#"{
                "id": "p1",
                "name": "Hunters Ridge",
                "location": "Kileleshwa",
                "plotType": "individual",
                "units": "12",
                "feePerTenant": "250",
                "lumpsumExpected": "",
                "tenants": [{"id": "t1", "name": "Alice", "phone": "254711111111", "amount": "250"}]
            }"#,
        )
        .unwrap();
        assert_eq!(plot.plot_type, Some(PlotType::Individual));
        assert_eq!(plot.units, Some(12));
        assert_eq!(plot.fee_per_tenant, Some(Shillings::new(250)));
        assert_eq!(plot.lumpsum_expected, None);
        assert_eq!(plot.tenants[0].fee, Some(Shillings::new(250)));
    }

    #[test]
    fn payment_tolerates_missing_fields_and_unknown_status() {
        let payment: Payment =
            serde_json::from_str(r#"{"id": "x1", "status": "reversed"}"#).unwrap();
        assert_eq!(payment.status, Some(PaymentStatus::Unknown));
        assert!(payment.statuses.is_empty());
        assert_eq!(payment.amount.cash, None);
    }

    #[test]
    fn top_level_overpayment_wins() {
        let payment: Payment = serde_json::from_str(
            r#"{"id": "x1", "overpayment": 50, "amount": {"cash": 300, "overpayment": 20}}"#,
        )
        .unwrap();
        assert_eq!(payment.overpayment(), Some(Shillings::new(50)));
    }

    #[test]
    fn ack_rejection_and_text() {
        let ack: Ack = serde_json::from_str(r#"{"success": false, "message": "nope"}"#).unwrap();
        assert!(ack.is_rejected());
        assert_eq!(ack.text(), Some("nope"));

        let ack: Ack = serde_json::from_str(r#"{"error": "bad phone"}"#).unwrap();
        assert!(!ack.is_rejected());
        assert_eq!(ack.text(), Some("bad phone"));
    }

    #[test]
    fn payment_update_omits_absent_cash() {
        let body = serde_json::to_value(PaymentUpdate {
            name: "Alice".to_string(),
            phone: "254711111111".to_string(),
            amount: None,
        })
        .unwrap();
        assert!(body.get("amount").is_none());
    }
}
