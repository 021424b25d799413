//! Editing state for the admin forms and modal dialogs.
//!
//! The engine forms hold field text and validate it; these wrappers add the
//! focus handling a keyboard UI needs.

use api_types::{
    payment::{Payment, PaymentUpdate},
    plot::{Plot, PlotPayload, PlotType},
};
use engine::{
    Contact, FormMode, MONTHS, PaymentEditForm, PlotForm, ReceiptFilter, StkForm, filter_contacts,
};

use super::state::ListCursor;
use crate::local_state::Settings;

/// One keystroke applied to the focused text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Push(char),
    Pop,
}

impl Edit {
    fn apply(self, value: &mut String) {
        match self {
            Self::Push(ch) => value.push(ch),
            Self::Pop => {
                value.pop();
            }
        }
    }

    fn applied(self, value: &str) -> String {
        let mut next = value.to_string();
        self.apply(&mut next);
        next
    }

    /// Like [`Edit::apply`] but drops anything that is not a digit.
    fn apply_digits(self, value: &mut String) {
        if let Self::Push(ch) = self
            && !ch.is_ascii_digit()
        {
            return;
        }
        self.apply(value);
    }
}

fn step(focus: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (focus + 1) % len
    } else {
        (focus + len - 1) % len
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotField {
    PlotType,
    Name,
    Location,
    CaretakerName,
    CaretakerPhone,
    Units,
    LumpsumExpected,
    MpesaNumber,
    FeePerTenant,
    TenantName(usize),
    TenantPhone(usize),
    TenantAmount(usize),
}

impl PlotField {
    pub fn label(self) -> String {
        match self {
            Self::PlotType => "Plot type".to_string(),
            Self::Name => "Plot name".to_string(),
            Self::Location => "Location".to_string(),
            Self::CaretakerName => "Caretaker name".to_string(),
            Self::CaretakerPhone => "Caretaker phone".to_string(),
            Self::Units => "Units".to_string(),
            Self::LumpsumExpected => "Expected amount".to_string(),
            Self::MpesaNumber => "MPESA number".to_string(),
            Self::FeePerTenant => "Fee per tenant".to_string(),
            Self::TenantName(n) => format!("Tenant {} name", n + 1),
            Self::TenantPhone(n) => format!("Tenant {} phone", n + 1),
            Self::TenantAmount(n) => format!("Tenant {} amount", n + 1),
        }
    }

    pub fn tenant_index(self) -> Option<usize> {
        match self {
            Self::TenantName(n) | Self::TenantPhone(n) | Self::TenantAmount(n) => Some(n),
            _ => None,
        }
    }
}

/// Register or edit page for a plot.
#[derive(Debug, Clone)]
pub struct PlotFormState {
    pub form: PlotForm,
    /// Set when editing an existing plot.
    pub plot_id: Option<String>,
    pub focus: usize,
}

impl PlotFormState {
    pub fn register() -> Self {
        Self {
            form: PlotForm::register(),
            plot_id: None,
            focus: 0,
        }
    }

    pub fn edit(plot: &Plot) -> Self {
        Self {
            form: PlotForm::edit(plot),
            plot_id: Some(plot.id.clone()),
            focus: 0,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.form.mode
    }

    /// Fields shown for the selected plot type, in tab order.
    pub fn fields(&self) -> Vec<PlotField> {
        let mut fields = vec![
            PlotField::PlotType,
            PlotField::Name,
            PlotField::Location,
            PlotField::CaretakerName,
            PlotField::CaretakerPhone,
            PlotField::Units,
        ];
        match self.form.plot_type {
            Some(PlotType::Lumpsum) => {
                fields.push(PlotField::LumpsumExpected);
                fields.push(PlotField::MpesaNumber);
            }
            Some(PlotType::Individual) => {
                fields.push(PlotField::FeePerTenant);
                for n in 0..self.form.tenants.len() {
                    fields.push(PlotField::TenantName(n));
                    fields.push(PlotField::TenantPhone(n));
                    fields.push(PlotField::TenantAmount(n));
                }
            }
            None => {}
        }
        fields
    }

    pub fn focused(&self) -> PlotField {
        let fields = self.fields();
        fields
            .get(self.focus.min(fields.len().saturating_sub(1)))
            .copied()
            .unwrap_or(PlotField::PlotType)
    }

    pub fn next_field(&mut self) {
        self.focus = step(self.focus, self.fields().len(), true);
    }

    pub fn prev_field(&mut self) {
        self.focus = step(self.focus, self.fields().len(), false);
    }

    pub fn cycle_type(&mut self) {
        self.form.plot_type = Some(match self.form.plot_type {
            None | Some(PlotType::Lumpsum) => PlotType::Individual,
            Some(PlotType::Individual) => PlotType::Lumpsum,
        });
    }

    pub fn edit_focused(&mut self, edit: Edit) {
        let field = self.focused();
        if field == PlotField::PlotType {
            if let Edit::Push(' ') = edit {
                self.cycle_type();
            }
            return;
        }
        let form = &mut self.form;
        match field {
            PlotField::PlotType => {}
            PlotField::Name => edit.apply(&mut form.name),
            PlotField::Location => edit.apply(&mut form.location),
            PlotField::CaretakerName => edit.apply(&mut form.caretaker_name),
            PlotField::CaretakerPhone => {
                let raw = edit.applied(&form.caretaker_phone);
                form.set_caretaker_phone(&raw);
            }
            PlotField::Units => edit.apply_digits(&mut form.units),
            PlotField::LumpsumExpected => edit.apply_digits(&mut form.lumpsum_expected),
            PlotField::MpesaNumber => {
                let raw = edit.applied(&form.mpesa_number);
                form.set_mpesa_number(&raw);
            }
            PlotField::FeePerTenant => edit.apply_digits(&mut form.fee_per_tenant),
            PlotField::TenantName(n) => {
                if let Some(row) = form.tenants.get_mut(n) {
                    edit.apply(&mut row.name);
                }
            }
            PlotField::TenantPhone(n) => {
                if let Some(row) = form.tenants.get_mut(n) {
                    let raw = edit.applied(&row.phone);
                    row.set_phone(&raw);
                }
            }
            PlotField::TenantAmount(n) => {
                if let Some(row) = form.tenants.get_mut(n) {
                    edit.apply_digits(&mut row.amount);
                }
            }
        }
    }

    /// Adds a tenant row and focuses its name. Only individual plots list tenants.
    pub fn add_tenant(&mut self) {
        if self.form.plot_type != Some(PlotType::Individual) {
            return;
        }
        self.form.add_tenant();
        let index = self.form.tenants.len() - 1;
        if let Some(position) = self
            .fields()
            .iter()
            .position(|field| *field == PlotField::TenantName(index))
        {
            self.focus = position;
        }
    }

    pub fn remove_focused_tenant(&mut self) {
        let Some(index) = self.focused().tenant_index() else {
            return;
        };
        if let Some(id) = self.form.tenants.get(index).map(|row| row.id.clone()) {
            self.form.remove_tenant(&id);
        }
        self.focus = self.focus.min(self.fields().len().saturating_sub(1));
    }

    pub fn value(&self, field: PlotField) -> String {
        let form = &self.form;
        let tenant = |n: usize| form.tenants.get(n);
        match field {
            PlotField::PlotType => form
                .plot_type
                .map(|kind| kind.label().to_string())
                .unwrap_or_else(|| "Select".to_string()),
            PlotField::Name => form.name.clone(),
            PlotField::Location => form.location.clone(),
            PlotField::CaretakerName => form.caretaker_name.clone(),
            PlotField::CaretakerPhone => form.caretaker_phone.clone(),
            PlotField::Units => form.units.clone(),
            PlotField::LumpsumExpected => form.lumpsum_expected.clone(),
            PlotField::MpesaNumber => form.mpesa_number.clone(),
            PlotField::FeePerTenant => form.fee_per_tenant.clone(),
            PlotField::TenantName(n) => tenant(n).map(|t| t.name.clone()).unwrap_or_default(),
            PlotField::TenantPhone(n) => tenant(n).map(|t| t.phone.clone()).unwrap_or_default(),
            PlotField::TenantAmount(n) => tenant(n).map(|t| t.amount.clone()).unwrap_or_default(),
        }
    }

    /// Phone fields carry the normalizer's verdict; everything else is valid.
    pub fn is_valid(&self, field: PlotField) -> bool {
        match field {
            PlotField::CaretakerPhone => self.form.caretaker_phone_valid,
            PlotField::MpesaNumber => self.form.mpesa_number_valid,
            PlotField::TenantPhone(n) => self
                .form
                .tenants
                .get(n)
                .is_none_or(|tenant| tenant.phone_valid),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StkField {
    Contacts,
    Phone,
    Amount,
}

/// STK push dialog with its contact picker.
#[derive(Debug, Clone)]
pub struct StkModal {
    pub form: StkForm,
    pub query: String,
    pub focus: StkField,
    pub cursor: ListCursor,
}

impl StkModal {
    pub fn new() -> Self {
        Self {
            form: StkForm::default(),
            query: String::new(),
            focus: StkField::Contacts,
            cursor: ListCursor::default(),
        }
    }

    pub fn for_contact(contact: &Contact) -> Self {
        let mut modal = Self::new();
        modal.form.select(contact);
        modal.focus = StkField::Amount;
        modal
    }

    pub fn matches<'a>(&self, contacts: &'a [Contact]) -> Vec<&'a Contact> {
        filter_contacts(contacts, &self.query)
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            StkField::Contacts => StkField::Phone,
            StkField::Phone => StkField::Amount,
            StkField::Amount => StkField::Contacts,
        };
    }

    pub fn edit_focused(&mut self, edit: Edit) {
        match self.focus {
            StkField::Contacts => {
                edit.apply(&mut self.query);
                self.cursor.reset();
            }
            StkField::Phone => {
                let raw = edit.applied(&self.form.raw_phone);
                self.form.set_phone(&raw);
            }
            StkField::Amount => edit.apply_digits(&mut self.form.amount),
        }
    }

    /// Fills the form from the highlighted contact. Returns false when the
    /// picker has nothing under the cursor.
    pub fn pick(&mut self, contacts: &[Contact]) -> bool {
        let picked = self.matches(contacts).get(self.cursor.selected).copied().cloned();
        match picked {
            Some(contact) => {
                self.form.select(&contact);
                self.focus = StkField::Amount;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentField {
    Name,
    Phone,
    Cash,
}

#[derive(Debug, Clone)]
pub struct PaymentEditModal {
    pub form: PaymentEditForm,
    pub focus: PaymentField,
}

impl PaymentEditModal {
    pub fn new(payment: &Payment) -> Self {
        Self {
            form: PaymentEditForm::from_payment(payment),
            focus: PaymentField::Name,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            PaymentField::Name => PaymentField::Phone,
            PaymentField::Phone => PaymentField::Cash,
            PaymentField::Cash => PaymentField::Name,
        };
    }

    pub fn edit_focused(&mut self, edit: Edit) {
        match self.focus {
            PaymentField::Name => edit.apply(&mut self.form.name),
            PaymentField::Phone => {
                let raw = edit.applied(&self.form.phone);
                self.form.set_phone(&raw);
            }
            PaymentField::Cash => edit.apply_digits(&mut self.form.cash),
        }
    }
}

/// Actions that wait for a yes/no answer.
#[derive(Debug, Clone)]
pub enum ConfirmAction {
    DeletePayment {
        id: String,
        label: String,
    },
    DeletePlot {
        id: String,
        name: String,
    },
    UpdatePayment {
        update: PaymentUpdate,
        /// Reopened when the answer is no.
        edit: PaymentEditModal,
    },
    UpdatePlot {
        id: String,
        payload: PlotPayload,
    },
}

impl ConfirmAction {
    pub fn title(&self) -> &'static str {
        match self {
            Self::DeletePayment { .. } => "Delete payment",
            Self::DeletePlot { .. } => "Delete plot",
            Self::UpdatePayment { .. } => "Save payment",
            Self::UpdatePlot { .. } => "Save plot",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::DeletePayment { label, .. } => {
                format!("Delete payment {label}? This cannot be undone.")
            }
            Self::DeletePlot { name, .. } => {
                format!("Delete plot {name} and its tenants? This cannot be undone.")
            }
            Self::UpdatePayment { update, .. } => match &update.amount {
                Some(top_up) => format!(
                    "Save changes for {} and add {} cash?",
                    update.name, top_up.cash
                ),
                None => format!("Save changes for {}?", update.name),
            },
            Self::UpdatePlot { payload, .. } => format!("Save changes to {}?", payload.name),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Modal {
    Stk(StkModal),
    PaymentEdit(PaymentEditModal),
    Confirm(ConfirmAction),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptField {
    #[default]
    Month,
    Year,
    Plot,
}

#[derive(Debug, Default)]
pub struct ReceiptsState {
    pub filter: ReceiptFilter,
    pub year_input: String,
    pub editing: bool,
    pub focus: ReceiptField,
    pub cursor: ListCursor,
}

impl ReceiptsState {
    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            ReceiptField::Month => ReceiptField::Year,
            ReceiptField::Year => ReceiptField::Plot,
            ReceiptField::Plot => ReceiptField::Month,
        };
    }

    /// All → January … December → All.
    pub fn cycle_month(&mut self, forward: bool) {
        let current = self
            .filter
            .month
            .as_deref()
            .and_then(|month| MONTHS.iter().position(|m| *m == month));
        let slots = MONTHS.len() + 1;
        let index = current.map_or(0, |i| i + 1);
        let next = step(index, slots, forward);
        self.filter.month = next.checked_sub(1).map(|i| MONTHS[i].to_string());
        self.cursor.reset();
    }

    pub fn cycle_plot(&mut self, plots: &[Plot], forward: bool) {
        let current = self
            .filter
            .plot
            .as_deref()
            .and_then(|name| plots.iter().position(|plot| plot.name == name));
        let index = current.map_or(0, |i| i + 1);
        let next = step(index, plots.len() + 1, forward);
        self.filter.plot = next
            .checked_sub(1)
            .and_then(|i| plots.get(i))
            .map(|plot| plot.name.clone());
        self.cursor.reset();
    }

    pub fn edit_year(&mut self, edit: Edit) {
        if matches!(edit, Edit::Push(_)) && self.year_input.len() >= 4 {
            return;
        }
        edit.apply_digits(&mut self.year_input);
        self.filter.year = self.year_input.parse().ok();
        self.cursor.reset();
    }

    pub fn cycle_focused(&mut self, plots: &[Plot], forward: bool) {
        match self.focus {
            ReceiptField::Month => self.cycle_month(forward),
            ReceiptField::Plot => self.cycle_plot(plots, forward),
            ReceiptField::Year => {}
        }
    }

    pub fn clear(&mut self) {
        self.filter = ReceiptFilter::default();
        self.year_input.clear();
        self.cursor.reset();
    }

    pub fn visible<'a>(&self, payments: &'a [Payment]) -> Vec<&'a Payment> {
        self.filter.apply(payments)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    ConsumerKey,
    ConsumerSecret,
    Passkey,
    Shortcode,
    Environment,
    EmailAlerts,
    SmsAlerts,
    PaymentNotifications,
    MonthlyReports,
}

impl SettingsField {
    pub const ALL: [Self; 9] = [
        Self::ConsumerKey,
        Self::ConsumerSecret,
        Self::Passkey,
        Self::Shortcode,
        Self::Environment,
        Self::EmailAlerts,
        Self::SmsAlerts,
        Self::PaymentNotifications,
        Self::MonthlyReports,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::ConsumerKey => "Consumer key",
            Self::ConsumerSecret => "Consumer secret",
            Self::Passkey => "Passkey",
            Self::Shortcode => "Shortcode",
            Self::Environment => "Environment",
            Self::EmailAlerts => "Email alerts",
            Self::SmsAlerts => "SMS alerts",
            Self::PaymentNotifications => "Payment notifications",
            Self::MonthlyReports => "Monthly reports",
        }
    }

    pub fn is_text(self) -> bool {
        matches!(
            self,
            Self::ConsumerKey | Self::ConsumerSecret | Self::Passkey | Self::Shortcode
        )
    }

    fn is_secret(self) -> bool {
        matches!(self, Self::ConsumerSecret | Self::Passkey)
    }
}

#[derive(Debug)]
pub struct SettingsState {
    pub saved: Settings,
    pub draft: Settings,
    pub editing: bool,
    pub focus: usize,
}

impl SettingsState {
    pub fn new(settings: Settings) -> Self {
        Self {
            draft: settings.clone(),
            saved: settings,
            editing: false,
            focus: 0,
        }
    }

    pub fn focused(&self) -> SettingsField {
        SettingsField::ALL[self.focus.min(SettingsField::ALL.len() - 1)]
    }

    pub fn next_field(&mut self) {
        self.focus = step(self.focus, SettingsField::ALL.len(), true);
    }

    pub fn prev_field(&mut self) {
        self.focus = step(self.focus, SettingsField::ALL.len(), false);
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.saved
    }

    pub fn cancel(&mut self) {
        self.draft = self.saved.clone();
        self.editing = false;
    }

    /// Accepts the draft as the saved settings.
    pub fn commit(&mut self) -> Settings {
        self.saved = self.draft.clone();
        self.editing = false;
        self.saved.clone()
    }

    pub fn edit_focused(&mut self, edit: Edit) {
        let field = self.focused();
        if !field.is_text() {
            if let Edit::Push(' ') = edit {
                self.toggle_focused();
            }
            return;
        }
        let daraja = &mut self.draft.daraja;
        match field {
            SettingsField::ConsumerKey => edit.apply(&mut daraja.consumer_key),
            SettingsField::ConsumerSecret => edit.apply(&mut daraja.consumer_secret),
            SettingsField::Passkey => edit.apply(&mut daraja.passkey),
            SettingsField::Shortcode => edit.apply_digits(&mut daraja.shortcode),
            _ => {}
        }
    }

    pub fn toggle_focused(&mut self) {
        let field = self.focused();
        let draft = &mut self.draft;
        let notifications = &mut draft.notifications;
        match field {
            SettingsField::Environment => {
                draft.daraja.environment = draft.daraja.environment.toggled();
            }
            SettingsField::EmailAlerts => notifications.email_alerts ^= true,
            SettingsField::SmsAlerts => notifications.sms_alerts ^= true,
            SettingsField::PaymentNotifications => notifications.payment_notifications ^= true,
            SettingsField::MonthlyReports => notifications.monthly_reports ^= true,
            _ => {}
        }
    }

    pub fn value(&self, field: SettingsField) -> String {
        let settings = if self.editing { &self.draft } else { &self.saved };
        let daraja = &settings.daraja;
        let notifications = &settings.notifications;
        let flag = |on: bool| if on { "On" } else { "Off" }.to_string();
        let text = match field {
            SettingsField::ConsumerKey => &daraja.consumer_key,
            SettingsField::ConsumerSecret => &daraja.consumer_secret,
            SettingsField::Passkey => &daraja.passkey,
            SettingsField::Shortcode => &daraja.shortcode,
            SettingsField::Environment => return daraja.environment.label().to_string(),
            SettingsField::EmailAlerts => return flag(notifications.email_alerts),
            SettingsField::SmsAlerts => return flag(notifications.sms_alerts),
            SettingsField::PaymentNotifications => {
                return flag(notifications.payment_notifications);
            }
            SettingsField::MonthlyReports => return flag(notifications.monthly_reports),
        };
        if field.is_secret() {
            "•".repeat(text.chars().count())
        } else {
            text.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use engine::{ContactKind, FormError};

    use super::*;
    use crate::local_state::DarajaEnvironment;

    fn type_into(state: &mut PlotFormState, text: &str) {
        for ch in text.chars() {
            state.edit_focused(Edit::Push(ch));
        }
    }

    fn focus(state: &mut PlotFormState, field: PlotField) {
        state.focus = state
            .fields()
            .iter()
            .position(|f| *f == field)
            .unwrap();
    }

    #[test]
    fn plot_fields_follow_the_type() {
        let mut state = PlotFormState::register();
        assert_eq!(state.fields().len(), 6);

        state.cycle_type();
        assert!(state.fields().contains(&PlotField::FeePerTenant));
        assert!(!state.fields().contains(&PlotField::MpesaNumber));

        state.cycle_type();
        assert!(state.fields().contains(&PlotField::MpesaNumber));
        assert!(!state.fields().contains(&PlotField::FeePerTenant));
    }

    #[test]
    fn typing_a_phone_normalizes_it() {
        let mut state = PlotFormState::register();
        focus(&mut state, PlotField::CaretakerPhone);
        type_into(&mut state, "0712 345 678");
        assert_eq!(state.value(PlotField::CaretakerPhone), "254712345678");
        assert!(state.is_valid(PlotField::CaretakerPhone));

        state.edit_focused(Edit::Pop);
        assert_eq!(state.value(PlotField::CaretakerPhone), "25471234567");
        assert!(!state.is_valid(PlotField::CaretakerPhone));
    }

    #[test]
    fn tenant_rows_can_be_added_and_removed() {
        let mut state = PlotFormState::register();
        state.add_tenant();
        assert!(state.form.tenants.is_empty(), "lumpsum and untyped plots list no tenants");

        state.cycle_type();
        state.add_tenant();
        assert_eq!(state.focused(), PlotField::TenantName(0));
        type_into(&mut state, "Alice");
        state.next_field();
        type_into(&mut state, "0711111111");
        state.next_field();
        assert_eq!(state.value(PlotField::TenantAmount(0)), "250");
        type_into(&mut state, "x");
        assert_eq!(state.value(PlotField::TenantAmount(0)), "250");

        state.add_tenant();
        assert_eq!(state.focused(), PlotField::TenantName(1));
        state.remove_focused_tenant();
        assert_eq!(state.form.tenants.len(), 1);
        assert_eq!(state.form.tenants[0].name, "Alice");
        assert!(state.focus < state.fields().len());
    }

    #[test]
    fn filled_register_form_validates() {
        let mut state = PlotFormState::register();
        focus(&mut state, PlotField::Name);
        type_into(&mut state, "Hunters Ridge");
        state.next_field();
        type_into(&mut state, "Kileleshwa");
        assert_eq!(state.form.validate().unwrap_err(), FormError::MissingPlotType);

        state.cycle_type();
        state.cycle_type();
        focus(&mut state, PlotField::Units);
        type_into(&mut state, "12");
        focus(&mut state, PlotField::LumpsumExpected);
        type_into(&mut state, "3000");
        focus(&mut state, PlotField::MpesaNumber);
        type_into(&mut state, "0722000000");

        let payload = state.form.validate().unwrap();
        assert_eq!(payload.plot_type, PlotType::Lumpsum);
        assert_eq!(payload.mpesa_number, "254722000000");
        assert_eq!(payload.units, Some(12));
    }

    fn contact(name: &str, phone: &str, amount: i64) -> Contact {
        Contact {
            kind: ContactKind::Tenant,
            name: name.to_string(),
            phone: phone.to_string(),
            amount: Some(api_types::Shillings::new(amount)),
            status: None,
            plot_id: "p1".to_string(),
            plot_name: "Hunters Ridge".to_string(),
            plot_location: "Kileleshwa".to_string(),
        }
    }

    #[test]
    fn stk_picker_fills_the_form() {
        let contacts = vec![
            contact("Alice", "254711111111", 250),
            contact("Brian", "254722222222", 300),
        ];
        let mut modal = StkModal::new();
        for ch in "bri".chars() {
            modal.edit_focused(Edit::Push(ch));
        }
        assert_eq!(modal.matches(&contacts).len(), 1);
        assert!(modal.pick(&contacts));
        assert_eq!(modal.focus, StkField::Amount);

        let push = modal.form.validate().unwrap();
        assert_eq!(push.phone, "254722222222");
        assert_eq!(push.amount, api_types::Shillings::new(300));

        modal.query = "nobody".to_string();
        assert!(!modal.pick(&contacts));
    }

    #[test]
    fn payment_edit_only_takes_digits_for_cash() {
        let payment = Payment {
            id: "QJ7K2".to_string(),
            name: Some("Alice".to_string()),
            phone: Some("254711111111".to_string()),
            ..Payment::default()
        };
        let mut modal = PaymentEditModal::new(&payment);
        modal.next_field();
        modal.next_field();
        for ch in "1a5".chars() {
            modal.edit_focused(Edit::Push(ch));
        }
        assert_eq!(modal.form.cash, "15");

        let update = modal.form.validate().unwrap();
        let confirm = ConfirmAction::UpdatePayment {
            update,
            edit: modal,
        };
        assert_eq!(confirm.message(), "Save changes for Alice and add KES 15 cash?");
    }

    #[test]
    fn receipt_month_cycles_through_all() {
        let mut receipts = ReceiptsState::default();
        receipts.cycle_month(true);
        assert_eq!(receipts.filter.month.as_deref(), Some("January"));
        receipts.cycle_month(false);
        assert_eq!(receipts.filter.month, None);
        receipts.cycle_month(false);
        assert_eq!(receipts.filter.month.as_deref(), Some("December"));
    }

    #[test]
    fn receipt_year_and_plot_filters() {
        let plots: Vec<Plot> = vec![
            Plot {
                id: "p1".to_string(),
                name: "Hunters Ridge".to_string(),
                ..Plot::default()
            },
            Plot {
                id: "p2".to_string(),
                name: "Green Court".to_string(),
                ..Plot::default()
            },
        ];
        let mut receipts = ReceiptsState::default();
        receipts.focus = ReceiptField::Plot;
        receipts.cycle_focused(&plots, true);
        receipts.cycle_focused(&plots, true);
        assert_eq!(receipts.filter.plot.as_deref(), Some("Green Court"));
        receipts.cycle_focused(&plots, true);
        assert_eq!(receipts.filter.plot, None);

        for ch in "20251".chars() {
            receipts.edit_year(Edit::Push(ch));
        }
        assert_eq!(receipts.year_input, "2025");
        assert_eq!(receipts.filter.year, Some(2025));

        receipts.clear();
        assert!(receipts.filter.is_empty());
    }

    #[test]
    fn settings_draft_is_kept_apart_until_commit() {
        let mut settings = SettingsState::new(Settings::default());
        settings.editing = true;
        settings.focus = 1;
        for ch in "s3cr".chars() {
            settings.edit_focused(Edit::Push(ch));
        }
        assert_eq!(settings.value(SettingsField::ConsumerSecret), "••••");
        assert!(settings.is_dirty());

        settings.focus = 4;
        settings.toggle_focused();
        assert_eq!(settings.draft.daraja.environment, DarajaEnvironment::Production);

        settings.cancel();
        assert!(!settings.is_dirty());
        assert_eq!(settings.saved.daraja.consumer_secret, "");

        settings.editing = true;
        settings.focus = 6;
        settings.edit_focused(Edit::Push(' '));
        let saved = settings.commit();
        assert!(saved.notifications.sms_alerts);
        assert!(!settings.editing);
    }
}
