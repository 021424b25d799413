use api_types::{payment::Payment, plot::Plot};
use chrono::{DateTime, Local};
use engine::{
    AdminPage, AuthState, Contact, GuardState, MonthlySummary, ReceiptOptions, Route,
    directory_rows, filter_contacts, filter_payments, summarize,
};

use super::forms::{Modal, PlotFormState, ReceiptsState, SettingsState};
use crate::local_state::Settings;

/// Ticks a toast stays on screen (200 ms each).
const TOAST_TICKS: u16 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminTab {
    Payments,
    Plots,
    Tenants,
    Receipts,
    Settings,
}

impl AdminTab {
    pub const ALL: [Self; 5] = [
        Self::Payments,
        Self::Plots,
        Self::Tenants,
        Self::Receipts,
        Self::Settings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Payments => "Payments",
            Self::Plots => "Plots",
            Self::Tenants => "Tenants",
            Self::Receipts => "Receipts",
            Self::Settings => "Settings",
        }
    }

    pub fn shortcut(self) -> char {
        match self {
            Self::Payments => '1',
            Self::Plots => '2',
            Self::Tenants => '3',
            Self::Receipts => '4',
            Self::Settings => '5',
        }
    }

    pub fn from_shortcut(ch: char) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.shortcut() == ch)
    }

    pub fn page(self) -> AdminPage {
        match self {
            Self::Payments => AdminPage::Payments,
            Self::Plots => AdminPage::Plots,
            Self::Tenants => AdminPage::Tenants,
            Self::Receipts => AdminPage::Receipts,
            Self::Settings => AdminPage::Settings,
        }
    }

    /// Plot register/edit pages live under the plots tab.
    pub fn of(page: &AdminPage) -> Self {
        match page {
            AdminPage::Payments => Self::Payments,
            AdminPage::Plots | AdminPage::RegisterPlot | AdminPage::EditPlot(_) => Self::Plots,
            AdminPage::Tenants => Self::Tenants,
            AdminPage::Receipts => Self::Receipts,
            AdminPage::Settings => Self::Settings,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

#[derive(Debug)]
pub struct LoginState {
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    pub message: Option<String>,
}

impl LoginState {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            password: String::new(),
            focus: if email.is_empty() {
                LoginField::Email
            } else {
                LoginField::Password
            },
            message: None,
        }
    }

    pub fn advance_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub fn active_field_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub title: Option<String>,
    pub message: String,
    pub level: ToastLevel,
    pub ticks_left: u16,
}

#[derive(Debug, Clone, Copy)]
pub struct ConnectionState {
    /// Outcome of the last backend request.
    pub online: bool,
    pub last_sync: Option<DateTime<Local>>,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self {
            online: true,
            last_sync: None,
        }
    }
}

/// Selection over a list whose length can change underneath it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListCursor {
    pub selected: usize,
}

impl ListCursor {
    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    pub fn reset(&mut self) {
        self.selected = 0;
    }
}

/// A query line that captures keystrokes while active.
#[derive(Debug, Default, Clone)]
pub struct SearchInput {
    pub query: String,
    pub active: bool,
}

#[derive(Debug, Default)]
pub struct PaymentsState {
    pub items: Vec<Payment>,
    pub loaded: bool,
    pub search: SearchInput,
    pub cursor: ListCursor,
}

impl PaymentsState {
    pub fn visible(&self) -> Vec<&Payment> {
        filter_payments(&self.items, &self.search.query)
    }

    pub fn selected(&self) -> Option<&Payment> {
        self.visible().get(self.cursor.selected).copied()
    }

    pub fn set_items(&mut self, items: Vec<Payment>) {
        self.items = items;
        self.loaded = true;
        let len = self.visible().len();
        self.cursor.clamp(len);
    }

    pub fn remove(&mut self, id: &str) {
        self.items.retain(|payment| payment.id != id);
        let len = self.visible().len();
        self.cursor.clamp(len);
    }
}

#[derive(Debug, Default)]
pub struct PlotDetailState {
    pub plot: Option<Plot>,
    pub cursor: ListCursor,
}

#[derive(Debug, Default)]
pub struct TenantsState {
    pub search: SearchInput,
    pub cursor: ListCursor,
}

#[derive(Debug)]
pub struct AppState {
    pub route: Route,
    pub auth: AuthState,
    /// Where a guarded redirect to the login screen came from.
    pub return_to: Option<Route>,
    pub login: LoginState,
    pub connection: ConnectionState,
    pub busy: bool,
    pub toast: Option<ToastState>,
    pub plots: Vec<Plot>,
    pub plots_loaded: bool,
    pub summary: MonthlySummary,
    pub dashboard: ListCursor,
    pub detail: PlotDetailState,
    pub payments: PaymentsState,
    pub plots_admin: ListCursor,
    pub plot_form: Option<PlotFormState>,
    pub tenants: TenantsState,
    pub receipts: ReceiptsState,
    pub settings: SettingsState,
    pub modal: Option<Modal>,
    pub receipt_options: ReceiptOptions,
    pub base_url: String,
}

impl AppState {
    pub fn new(email: &str, base_url: &str, settings: Settings) -> Self {
        Self {
            route: Route::Dashboard,
            auth: AuthState::Checking,
            return_to: None,
            login: LoginState::new(email),
            connection: ConnectionState::default(),
            busy: false,
            toast: None,
            plots: Vec::new(),
            plots_loaded: false,
            summary: MonthlySummary::default(),
            dashboard: ListCursor::default(),
            detail: PlotDetailState::default(),
            payments: PaymentsState::default(),
            plots_admin: ListCursor::default(),
            plot_form: None,
            tenants: TenantsState::default(),
            receipts: ReceiptsState::default(),
            settings: SettingsState::new(settings),
            modal: None,
            receipt_options: ReceiptOptions::default(),
            base_url: base_url.to_string(),
        }
    }

    /// True while the stored session is still being checked for a guarded route.
    pub fn is_checking(&self) -> bool {
        GuardState::resolve(&self.auth) == GuardState::CheckingAuth
            && !matches!(self.route, Route::NotFound(_))
    }

    pub fn admin_tab(&self) -> Option<AdminTab> {
        match &self.route {
            Route::Admin(page) => Some(AdminTab::of(page)),
            _ => None,
        }
    }

    pub fn can_administer(&self) -> bool {
        GuardState::resolve(&self.auth) == GuardState::Authorized
    }

    /// True when keystrokes go to a text field rather than to shortcuts.
    pub fn is_editing(&self) -> bool {
        if self.modal.is_some() {
            return true;
        }
        match &self.route {
            Route::Login => true,
            Route::Admin(AdminPage::RegisterPlot | AdminPage::EditPlot(_)) => {
                self.plot_form.is_some()
            }
            Route::Admin(AdminPage::Payments) => self.payments.search.active,
            Route::Admin(AdminPage::Tenants) => self.tenants.search.active,
            Route::Admin(AdminPage::Receipts) => self.receipts.editing,
            Route::Admin(AdminPage::Settings) => self.settings.editing,
            _ => false,
        }
    }

    pub fn set_plots(&mut self, plots: Vec<Plot>) {
        self.summary = summarize(&plots);
        self.plots = plots;
        self.plots_loaded = true;
        let len = self.plots.len();
        self.dashboard.clamp(len);
        self.plots_admin.clamp(len);
    }

    pub fn remove_plot(&mut self, id: &str) {
        let remaining = self
            .plots
            .drain(..)
            .filter(|plot| plot.id != id)
            .collect::<Vec<_>>();
        self.set_plots(remaining);
    }

    pub fn plot_by_id(&self, id: &str) -> Option<&Plot> {
        self.plots.iter().find(|plot| plot.id == id)
    }

    /// Contacts on the tenants page after the search query.
    pub fn tenant_rows(&self) -> Vec<Contact> {
        let rows = directory_rows(&self.plots);
        filter_contacts(&rows, &self.tenants.search.query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn mark_online(&mut self) {
        self.connection.online = true;
        self.connection.last_sync = Some(Local::now());
    }

    pub fn mark_offline(&mut self) {
        self.connection.online = false;
    }

    pub fn notify(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(ToastState {
            title: None,
            message: message.into(),
            level,
            ticks_left: TOAST_TICKS,
        });
    }

    pub fn notify_titled(
        &mut self,
        level: ToastLevel,
        title: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.toast = Some(ToastState {
            title: Some(title.into()),
            message: message.into(),
            level,
            ticks_left: TOAST_TICKS,
        });
    }

    pub fn tick(&mut self) {
        if let Some(toast) = self.toast.as_mut() {
            toast.ticks_left = toast.ticks_left.saturating_sub(1);
            if toast.ticks_left == 0 {
                self.toast = None;
            }
        }
    }

    /// Drops everything fetched for the previous user.
    pub fn clear_session_data(&mut self) {
        self.plots.clear();
        self.plots_loaded = false;
        self.summary = MonthlySummary::default();
        self.detail = PlotDetailState::default();
        self.payments = PaymentsState::default();
        self.plot_form = None;
        self.modal = None;
        self.dashboard.reset();
        self.plots_admin.reset();
    }
}

#[cfg(test)]
mod tests {
    use api_types::Shillings;
    use engine::{Role, SignedInUser};

    use super::*;

    fn state() -> AppState {
        AppState::new("", "http://127.0.0.1:5000", Settings::default())
    }

    fn payment(id: &str, name: &str) -> Payment {
        Payment {
            id: id.to_string(),
            name: Some(name.to_string()),
            ..Payment::default()
        }
    }

    fn plot(id: &str, fee: i64, tenants: usize) -> Plot {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": format!("Plot {id}"),
            "plotType": "individual",
            "feePerTenant": fee,
            "tenants": (0..tenants)
                .map(|n| serde_json::json!({
                    "id": format!("{id}-t{n}"),
                    "name": format!("Tenant {n}"),
                    "phone": format!("25471100000{n}"),
                    "status": if n == 0 { "paid" } else { "unpaid" }
                }))
                .collect::<Vec<_>>()
        }))
        .unwrap()
    }

    #[test]
    fn cursor_stays_inside_the_list() {
        let mut cursor = ListCursor::default();
        cursor.select_prev();
        assert_eq!(cursor.selected, 0);
        cursor.select_next(2);
        cursor.select_next(2);
        assert_eq!(cursor.selected, 1);
        cursor.clamp(1);
        assert_eq!(cursor.selected, 0);
        cursor.select_next(0);
        assert_eq!(cursor.selected, 0);
    }

    #[test]
    fn selected_payment_follows_the_search() {
        let mut state = state();
        state.payments.set_items(vec![
            payment("QA1", "Alice Wanjiru"),
            payment("QB2", "Brian Otieno"),
            payment("QC3", "Alice Njeri"),
        ]);
        state.payments.search.query = "alice".to_string();
        state.payments.cursor.select_next(state.payments.visible().len());

        let selected = state.payments.selected().map(|p| p.id.clone());
        assert_eq!(selected.as_deref(), Some("QC3"));

        state.payments.remove("QC3");
        assert_eq!(state.payments.cursor.selected, 0);
        assert_eq!(
            state.payments.selected().map(|p| p.id.as_str()),
            Some("QA1")
        );
    }

    #[test]
    fn plots_refresh_the_summary() {
        let mut state = state();
        state.set_plots(vec![plot("p1", 250, 2), plot("p2", 300, 1)]);
        assert_eq!(state.summary.plots, 2);
        assert_eq!(state.summary.total_expected, Shillings::new(800));

        state.plots_admin.selected = 1;
        state.remove_plot("p2");
        assert_eq!(state.summary.plots, 1);
        assert_eq!(state.plots_admin.selected, 0);
        assert!(state.plot_by_id("p2").is_none());
    }

    #[test]
    fn tenant_rows_are_searchable() {
        let mut state = state();
        state.set_plots(vec![plot("p1", 250, 3)]);
        assert_eq!(state.tenant_rows().len(), 3);

        state.tenants.search.query = "tenant 2".to_string();
        let rows = state.tenant_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].phone, "254711000002");
    }

    #[test]
    fn checking_covers_guarded_routes_only() {
        let mut state = state();
        assert!(state.is_checking());

        state.route = Route::NotFound("/nowhere".to_string());
        assert!(!state.is_checking());

        state.route = Route::Dashboard;
        state.auth = AuthState::SignedIn(SignedInUser {
            uid: "u1".to_string(),
            email: "ops@jobawu.test".to_string(),
            role: Some(Role::Manager),
        });
        assert!(!state.is_checking());
        assert!(state.can_administer());
    }

    #[test]
    fn shortcuts_are_suspended_while_typing() {
        let mut state = state();
        state.route = Route::Login;
        assert!(state.is_editing());

        state.route = Route::Admin(AdminPage::Payments);
        assert!(!state.is_editing());
        state.payments.search.active = true;
        assert!(state.is_editing());

        state.route = Route::Dashboard;
        assert!(!state.is_editing());
    }

    #[test]
    fn toasts_expire_after_their_ticks() {
        let mut state = state();
        state.notify(ToastLevel::Success, "Saved");
        for _ in 0..TOAST_TICKS - 1 {
            state.tick();
        }
        assert!(state.toast.is_some());
        state.tick();
        assert!(state.toast.is_none());
    }

    #[test]
    fn admin_tabs_round_trip_through_pages() {
        for tab in AdminTab::ALL {
            assert_eq!(AdminTab::of(&tab.page()), tab);
            assert_eq!(AdminTab::from_shortcut(tab.shortcut()), Some(tab));
        }
        assert_eq!(
            AdminTab::of(&AdminPage::EditPlot("p1".to_string())),
            AdminTab::Plots
        );
        assert_eq!(AdminTab::from_shortcut('9'), None);
    }
}
