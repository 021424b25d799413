//! Form state and submit-time validation.
//!
//! Fields are kept as the text the user typed; phone fields are normalized on
//! every keystroke. `validate` runs the checks in the order the messages
//! should surface and produces the request body.

use api_types::{
    Shillings,
    payment::{CashTopUp, Payment, PaymentUpdate},
    plot::{Plot, PlotPayload, PlotType, TenantDraft},
    stk::StkPush,
};
use thiserror::Error;
use uuid::Uuid;

use crate::{Contact, is_complete_kenyan_phone, normalize_kenyan_mobile};

pub const DEFAULT_TENANT_AMOUNT: &str = "250";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("Please select a plot type")]
    MissingPlotType,
    #[error("Add at least one tenant")]
    NoTenants,
    #[error("Caretaker phone number must be complete (254XXXXXXXXX)")]
    IncompleteCaretakerPhone,
    #[error("Each tenant must have a payment amount")]
    MissingTenantAmount,
    #[error("MPESA phone number must be complete (254XXXXXXXXX)")]
    IncompleteMpesaNumber,
    #[error("All tenant phone numbers must be complete (254XXXXXXXXX)")]
    IncompleteTenantPhone,
    #[error("{0} must be a whole number")]
    InvalidNumber(&'static str),
    #[error("{0} is not a valid amount")]
    InvalidAmount(&'static str),
    #[error("Phone number and amount are required")]
    MissingStkFields,
    #[error("Use 07XXXXXXXX or 01XXXXXXXX format")]
    InvalidPhone,
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,
}

impl FormError {
    /// Short heading for the warning toast.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Required(_) | Self::MissingStkFields | Self::MissingPlotType => {
                "Missing Information"
            }
            Self::InvalidPhone => "Invalid Phone Number",
            _ => "Check the form",
        }
    }
}

fn parse_amount(raw: &str, field: &'static str) -> Result<Option<Shillings>, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let amount = trimmed
        .parse::<Shillings>()
        .map_err(|_| FormError::InvalidAmount(field))?;
    if amount.is_positive() {
        Ok(Some(amount))
    } else {
        Err(FormError::NonPositiveAmount)
    }
}

fn required(raw: &str, field: &'static str) -> Result<String, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FormError::Required(field));
    }
    Ok(trimmed.to_string())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormMode {
    Register,
    Edit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TenantRow {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub phone_valid: bool,
    pub amount: String,
}

impl TenantRow {
    pub fn set_phone(&mut self, raw: &str) {
        let normalized = normalize_kenyan_mobile(raw);
        self.phone = normalized.value;
        self.phone_valid = normalized.is_valid;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlotForm {
    pub mode: FormMode,
    pub plot_type: Option<PlotType>,
    pub name: String,
    pub location: String,
    pub caretaker_name: String,
    pub caretaker_phone: String,
    pub caretaker_phone_valid: bool,
    pub units: String,
    pub lumpsum_expected: String,
    pub mpesa_number: String,
    pub mpesa_number_valid: bool,
    pub fee_per_tenant: String,
    pub tenants: Vec<TenantRow>,
}

impl PlotForm {
    pub fn register() -> Self {
        Self {
            mode: FormMode::Register,
            plot_type: None,
            name: String::new(),
            location: String::new(),
            caretaker_name: String::new(),
            caretaker_phone: String::new(),
            caretaker_phone_valid: true,
            units: String::new(),
            lumpsum_expected: String::new(),
            mpesa_number: String::new(),
            mpesa_number_valid: true,
            fee_per_tenant: DEFAULT_TENANT_AMOUNT.to_string(),
            tenants: Vec::new(),
        }
    }

    /// Prefills the form from a stored plot.
    pub fn edit(plot: &Plot) -> Self {
        let text = |value: Option<&String>| value.cloned().unwrap_or_default();
        let amount = |value: Option<Shillings>| {
            value.map(|a| a.value().to_string()).unwrap_or_default()
        };
        Self {
            mode: FormMode::Edit,
            plot_type: plot.plot_type,
            name: plot.name.clone(),
            location: plot.location.clone(),
            caretaker_name: text(plot.caretaker_name.as_ref()),
            caretaker_phone: text(plot.caretaker_phone.as_ref()),
            caretaker_phone_valid: true,
            units: plot.units.map(|u| u.to_string()).unwrap_or_default(),
            lumpsum_expected: amount(plot.lumpsum_expected),
            mpesa_number: text(plot.mpesa_number.as_ref()),
            mpesa_number_valid: true,
            fee_per_tenant: plot
                .fee_per_tenant
                .map(|fee| fee.value().to_string())
                .unwrap_or_else(|| DEFAULT_TENANT_AMOUNT.to_string()),
            tenants: plot
                .tenants
                .iter()
                .map(|tenant| TenantRow {
                    id: tenant.id.clone(),
                    name: tenant.name.clone(),
                    phone: tenant.phone.clone(),
                    phone_valid: true,
                    amount: amount(tenant.fee),
                })
                .collect(),
        }
    }

    pub fn set_caretaker_phone(&mut self, raw: &str) {
        let normalized = normalize_kenyan_mobile(raw);
        self.caretaker_phone = normalized.value;
        self.caretaker_phone_valid = normalized.is_valid;
    }

    pub fn set_mpesa_number(&mut self, raw: &str) {
        let normalized = normalize_kenyan_mobile(raw);
        self.mpesa_number = normalized.value;
        self.mpesa_number_valid = normalized.is_valid;
    }

    pub fn add_tenant(&mut self) -> &mut TenantRow {
        self.tenants.push(TenantRow {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            phone: String::new(),
            phone_valid: true,
            amount: DEFAULT_TENANT_AMOUNT.to_string(),
        });
        let last = self.tenants.len() - 1;
        &mut self.tenants[last]
    }

    pub fn remove_tenant(&mut self, id: &str) {
        self.tenants.retain(|tenant| tenant.id != id);
    }

    pub fn validate(&self) -> Result<PlotPayload, FormError> {
        let name = required(&self.name, "Plot name")?;
        let location = required(&self.location, "Location")?;
        let plot_type = self.plot_type.ok_or(FormError::MissingPlotType)?;
        let individual = plot_type == PlotType::Individual;
        let lumpsum = plot_type == PlotType::Lumpsum;

        if self.mode == FormMode::Register && individual && self.tenants.is_empty() {
            return Err(FormError::NoTenants);
        }

        let caretaker_phone = self.caretaker_phone.trim();
        if !caretaker_phone.is_empty() && !is_complete_kenyan_phone(caretaker_phone) {
            return Err(FormError::IncompleteCaretakerPhone);
        }

        if individual && self.tenants.iter().any(|t| t.amount.trim().is_empty()) {
            return Err(FormError::MissingTenantAmount);
        }

        let mpesa_number = self.mpesa_number.trim();
        let mpesa_checked = match self.mode {
            FormMode::Register => lumpsum,
            FormMode::Edit => lumpsum && !mpesa_number.is_empty(),
        };
        if mpesa_checked && !is_complete_kenyan_phone(mpesa_number) {
            return Err(FormError::IncompleteMpesaNumber);
        }

        if individual
            && self
                .tenants
                .iter()
                .any(|t| !is_complete_kenyan_phone(t.phone.trim()))
        {
            return Err(FormError::IncompleteTenantPhone);
        }

        let units = match self.units.trim() {
            "" if lumpsum => return Err(FormError::Required("Units")),
            "" => None,
            raw => Some(
                raw.parse::<u32>()
                    .map_err(|_| FormError::InvalidNumber("Units"))?,
            ),
        };
        let lumpsum_expected = parse_amount(&self.lumpsum_expected, "Expected amount")?;
        if lumpsum && lumpsum_expected.is_none() {
            return Err(FormError::Required("Expected amount"));
        }
        let fee_per_tenant = if individual {
            parse_amount(&self.fee_per_tenant, "Fee per tenant")?
        } else {
            None
        };

        let tenants = if individual {
            self.tenants
                .iter()
                .map(|row| {
                    Ok(TenantDraft {
                        id: row.id.clone(),
                        name: row.name.trim().to_string(),
                        phone: row.phone.trim().to_string(),
                        amount: parse_amount(&row.amount, "Tenant amount")?,
                    })
                })
                .collect::<Result<Vec<_>, FormError>>()?
        } else {
            Vec::new()
        };

        Ok(PlotPayload {
            plot_type,
            name,
            location,
            caretaker_name: self.caretaker_name.trim().to_string(),
            caretaker_phone: caretaker_phone.to_string(),
            units,
            lumpsum_expected: if lumpsum { lumpsum_expected } else { None },
            mpesa_number: mpesa_number.to_string(),
            fee_per_tenant,
            tenants,
        })
    }
}

/// STK push dialog state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StkForm {
    pub raw_phone: String,
    pub phone: String,
    pub phone_valid: bool,
    pub amount: String,
}

impl Default for StkForm {
    fn default() -> Self {
        Self {
            raw_phone: String::new(),
            phone: String::new(),
            phone_valid: true,
            amount: String::new(),
        }
    }
}

impl StkForm {
    pub fn set_phone(&mut self, raw: &str) {
        let normalized = normalize_kenyan_mobile(raw);
        self.raw_phone = raw.to_string();
        self.phone = normalized.value;
        self.phone_valid = normalized.is_valid;
    }

    /// Fills phone and amount from a picked contact. A contact without an
    /// amount keeps whatever was typed.
    pub fn select(&mut self, contact: &Contact) {
        self.set_phone(&contact.phone);
        if let Some(amount) = contact.amount {
            self.amount = amount.value().to_string();
        }
    }

    pub fn validate(&self) -> Result<StkPush, FormError> {
        if self.raw_phone.trim().is_empty() || self.amount.trim().is_empty() {
            return Err(FormError::MissingStkFields);
        }
        if !self.phone_valid || !is_complete_kenyan_phone(&self.phone) {
            return Err(FormError::InvalidPhone);
        }
        let amount =
            parse_amount(&self.amount, "Amount")?.ok_or(FormError::MissingStkFields)?;
        Ok(StkPush {
            phone: self.phone.clone(),
            amount,
        })
    }
}

/// Payment edit dialog. MPESA amount and plot are read-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentEditForm {
    pub payment_id: String,
    pub name: String,
    pub phone: String,
    pub phone_valid: bool,
    /// Cash to add on top of what is recorded. Empty leaves cash untouched.
    pub cash: String,
    pub mpesa: Option<Shillings>,
    pub plot_name: Option<String>,
}

impl PaymentEditForm {
    pub fn from_payment(payment: &Payment) -> Self {
        Self {
            payment_id: payment.id.clone(),
            name: payment.name.clone().unwrap_or_default(),
            phone: payment.phone.clone().unwrap_or_default(),
            phone_valid: true,
            cash: String::new(),
            mpesa: payment.amount.mpesa,
            plot_name: payment.plot_name.clone(),
        }
    }

    pub fn set_phone(&mut self, raw: &str) {
        let normalized = normalize_kenyan_mobile(raw);
        self.phone = normalized.value;
        self.phone_valid = normalized.is_valid;
    }

    pub fn validate(&self) -> Result<PaymentUpdate, FormError> {
        let phone = self.phone.trim();
        if !self.phone_valid || (!phone.is_empty() && !is_complete_kenyan_phone(phone)) {
            return Err(FormError::InvalidPhone);
        }
        let amount = parse_amount(&self.cash, "Cash")?.map(|cash| CashTopUp { cash });
        Ok(PaymentUpdate {
            name: self.name.trim().to_string(),
            phone: phone.to_string(),
            amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use api_types::plot::Tenant;

    use super::*;
    use crate::ContactKind;

    fn individual_form() -> PlotForm {
        let mut form = PlotForm::register();
        form.name = "Hunters Ridge".to_string();
        form.location = "Kileleshwa".to_string();
        form.plot_type = Some(PlotType::Individual);
        let row = form.add_tenant();
        row.name = "Alice".to_string();
        row.set_phone("0711111111");
        form
    }

    fn lumpsum_form() -> PlotForm {
        let mut form = PlotForm::register();
        form.name = "Green Court".to_string();
        form.location = "Westlands".to_string();
        form.plot_type = Some(PlotType::Lumpsum);
        form.units = "12".to_string();
        form.lumpsum_expected = "5,000".to_string();
        form.set_mpesa_number("0733333333");
        form
    }

    #[test]
    fn new_tenant_rows_default_to_250() {
        let mut form = PlotForm::register();
        let id = form.add_tenant().id.clone();
        assert_eq!(form.tenants[0].amount, "250");
        assert!(!id.is_empty());
        form.remove_tenant(&id);
        assert!(form.tenants.is_empty());
    }

    #[test]
    fn register_checks_surface_in_order() {
        let mut form = PlotForm::register();
        assert_eq!(form.validate().unwrap_err(), FormError::Required("Plot name"));
        form.name = "X".to_string();
        form.location = "Y".to_string();
        assert_eq!(form.validate().unwrap_err(), FormError::MissingPlotType);
        form.plot_type = Some(PlotType::Individual);
        assert_eq!(form.validate().unwrap_err(), FormError::NoTenants);

        let mut form = individual_form();
        form.caretaker_phone = "25471".to_string();
        assert_eq!(form.validate().unwrap_err(), FormError::IncompleteCaretakerPhone);
        form.caretaker_phone.clear();
        form.tenants[0].amount.clear();
        assert_eq!(form.validate().unwrap_err(), FormError::MissingTenantAmount);
        form.tenants[0].amount = "250".to_string();
        form.tenants[0].set_phone("07111");
        assert_eq!(form.validate().unwrap_err(), FormError::IncompleteTenantPhone);
    }

    #[test]
    fn individual_payload_carries_tenants() {
        let payload = individual_form().validate().unwrap();
        assert_eq!(payload.plot_type, PlotType::Individual);
        assert_eq!(payload.tenants.len(), 1);
        assert_eq!(payload.tenants[0].phone, "254711111111");
        assert_eq!(payload.tenants[0].amount, Some(Shillings::new(250)));
        assert_eq!(payload.fee_per_tenant, Some(Shillings::new(250)));
        assert_eq!(payload.lumpsum_expected, None);
    }

    #[test]
    fn lumpsum_requires_complete_mpesa_on_register_only() {
        let mut form = lumpsum_form();
        let payload = form.validate().unwrap();
        assert!(payload.tenants.is_empty());
        assert_eq!(payload.lumpsum_expected, Some(Shillings::new(5000)));
        assert_eq!(payload.units, Some(12));

        form.mpesa_number.clear();
        assert_eq!(form.validate().unwrap_err(), FormError::IncompleteMpesaNumber);

        form.mode = FormMode::Edit;
        assert!(form.validate().is_ok());
        form.mpesa_number = "2547".to_string();
        assert_eq!(form.validate().unwrap_err(), FormError::IncompleteMpesaNumber);
    }

    #[test]
    fn lumpsum_drops_typed_tenants() {
        let mut form = lumpsum_form();
        form.add_tenant();
        assert!(form.validate().unwrap().tenants.is_empty());
    }

    #[test]
    fn edit_allows_zero_tenants_and_prefills() {
        let plot = Plot {
            id: "p1".to_string(),
            name: "Hunters Ridge".to_string(),
            location: "Kileleshwa".to_string(),
            plot_type: Some(PlotType::Individual),
            fee_per_tenant: None,
            tenants: vec![Tenant {
                id: "t1".to_string(),
                name: "Alice".to_string(),
                phone: "254711111111".to_string(),
                fee: Some(Shillings::new(300)),
                ..Tenant::default()
            }],
            ..Plot::default()
        };
        let mut form = PlotForm::edit(&plot);
        assert_eq!(form.fee_per_tenant, "250");
        assert_eq!(form.tenants[0].amount, "300");
        form.tenants.clear();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn stk_form_messages() {
        let mut form = StkForm::default();
        assert_eq!(form.validate().unwrap_err(), FormError::MissingStkFields);
        assert_eq!(form.validate().unwrap_err().title(), "Missing Information");

        form.set_phone("9999");
        form.amount = "100".to_string();
        let err = form.validate().unwrap_err();
        assert_eq!(err.to_string(), "Use 07XXXXXXXX or 01XXXXXXXX format");
        assert_eq!(err.title(), "Invalid Phone Number");

        form.set_phone("0712 345 678");
        let push = form.validate().unwrap();
        assert_eq!(push.phone, "254712345678");
        assert_eq!(push.amount, Shillings::new(100));

        form.amount = "0".to_string();
        assert_eq!(form.validate().unwrap_err(), FormError::NonPositiveAmount);
    }

    #[test]
    fn partial_stk_phone_is_rejected_at_submit() {
        let mut form = StkForm::default();
        form.set_phone("07123");
        form.amount = "100".to_string();
        assert_eq!(form.validate().unwrap_err(), FormError::InvalidPhone);
    }

    #[test]
    fn selecting_contact_fills_phone_and_amount() {
        let mut form = StkForm::default();
        form.select(&Contact {
            kind: ContactKind::Tenant,
            name: "Alice".to_string(),
            phone: "0711111111".to_string(),
            amount: Some(Shillings::new(250)),
            status: None,
            plot_id: "p1".to_string(),
            plot_name: "Hunters Ridge".to_string(),
            plot_location: String::new(),
        });
        assert_eq!(form.phone, "254711111111");
        assert_eq!(form.amount, "250");
    }

    #[test]
    fn payment_edit_builds_update() {
        let payment = Payment {
            id: "x1".to_string(),
            name: Some("Alice".to_string()),
            phone: Some("254711111111".to_string()),
            ..Payment::default()
        };
        let mut form = PaymentEditForm::from_payment(&payment);
        let update = form.validate().unwrap();
        assert!(update.amount.is_none());

        form.cash = "200".to_string();
        form.set_phone("0722222222");
        let update = form.validate().unwrap();
        assert_eq!(update.phone, "254722222222");
        assert_eq!(update.amount.map(|a| a.cash), Some(Shillings::new(200)));

        form.set_phone("123");
        assert_eq!(form.validate().unwrap_err(), FormError::InvalidPhone);
    }
}
