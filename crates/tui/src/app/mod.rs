mod forms;
mod state;

use std::{fs::File, path::PathBuf, time::Duration};

use api_types::payment::Payment;
use chrono::Local;
use collect_client::{
    AuthError, AuthSubscription, Client, ClientError, FirebaseAuth, PrintOutcome, Printer,
    SessionContext,
};
use crossterm::event::{self, Event, KeyEvent};
use engine::{
    Access, AdminPage, AuthState, Decision, FormError, FormMode, Route, decide,
    directory_rows, post_login_target, stk_contacts, write_payments_csv,
};

use crate::{
    config::AppConfig,
    error::{AppError, Result},
    local_state::LocalState,
    ui::{self, keymap::AppAction},
};

pub use forms::{
    ConfirmAction, Edit, Modal, PaymentEditModal, PaymentField, PlotField, PlotFormState,
    ReceiptField, SettingsField, StkField, StkModal,
};
pub use state::{
    AdminTab, AppState, ListCursor, LoginField, PlotDetailState, SearchInput, ToastLevel,
    ToastState,
};

pub struct App {
    config: AppConfig,
    client: Client,
    session: SessionContext,
    subscription: AuthSubscription,
    printer: Printer,
    local: LocalState,
    pub state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::new(&config.base_url)?;
        let session = SessionContext::new(FirebaseAuth::new(config.firebase()));
        let subscription = session.subscribe();
        let local = LocalState::load(&config.state_path)?;
        let mut state = AppState::new(&config.email, &config.base_url, local.settings.clone());
        state.receipt_options = config.receipt_options()?;
        let printer = config.printer();

        Ok(Self {
            config,
            client,
            session,
            subscription,
            printer,
            local,
            state,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        self.subscription.unsubscribe();
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);

        self.draw(terminal)?;
        self.restore_session().await;

        while !self.should_quit {
            self.sync_auth().await;
            self.draw(terminal)?;

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key).await?,
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            } else {
                self.state.tick();
            }
        }

        Ok(())
    }

    fn draw(&self, terminal: &mut ui::Terminal) -> Result<()> {
        terminal
            .draw(|frame| ui::render(frame, &self.state))
            .map_err(|err| AppError::Terminal(err.to_string()))?;
        Ok(())
    }

    /// Keys typed while a request was in flight are dropped so they cannot
    /// fire the same action again.
    fn discard_pending_input(&self) -> Result<()> {
        while event::poll(Duration::ZERO)? {
            let _ = event::read()?;
        }
        Ok(())
    }

    // Session

    async fn restore_session(&mut self) {
        let stored = self.local.refresh_token.clone();
        let restored = self.session.restore(stored.as_deref()).await;
        if matches!(restored, AuthState::SignedOut) && stored.is_some() {
            self.local.refresh_token = None;
            self.save_local();
        }
        if restored.user().is_some() {
            self.persist_refresh_token().await;
        }
    }

    /// Applies auth changes published by the session and re-checks the route.
    async fn sync_auth(&mut self) {
        let Some(auth) = self.subscription.poll() else {
            return;
        };
        if auth == self.state.auth {
            return;
        }
        let signed_out = matches!(auth, AuthState::SignedOut);
        if signed_out && self.state.auth.user().is_some() {
            self.state.clear_session_data();
            self.state
                .notify_titled(ToastLevel::Warning, "Signed out", "Please sign in again.");
        }
        self.state.auth = auth;
        let route = self.state.route.clone();
        self.navigate(route).await;
    }

    async fn persist_refresh_token(&mut self) {
        let current = self.session.refresh_token().await;
        if current != self.local.refresh_token {
            self.local.refresh_token = current;
            self.save_local();
        }
    }

    fn save_local(&mut self) -> bool {
        match self.local.save(&self.config.state_path) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(path = %self.config.state_path, "failed to save local state: {err}");
                self.state
                    .notify_titled(ToastLevel::Error, "Could not save", err.to_string());
                false
            }
        }
    }

    async fn attempt_login(&mut self) {
        let email = self.state.login.email.trim().to_string();
        let password = self.state.login.password.clone();
        if email.is_empty() || password.is_empty() {
            self.state.login.message = Some("Enter your email and password.".to_string());
            return;
        }

        self.state.busy = true;
        match self.session.sign_in(&email, &password).await {
            Ok(user) => {
                self.state.login.password.clear();
                self.state.login.message = None;
                self.state.auth = AuthState::SignedIn(user);
                self.persist_refresh_token().await;
                let target = post_login_target(self.state.return_to.take().as_ref());
                self.navigate(target).await;
            }
            Err(err) => {
                tracing::warn!(%email, "sign-in failed: {err}");
                if matches!(err, AuthError::Transport(_)) {
                    self.state.mark_offline();
                }
                self.state.login.message = Some(auth_message(&err));
            }
        }
    }

    async fn sign_out(&mut self) {
        self.session.sign_out().await;
        self.local.refresh_token = None;
        self.save_local();
        self.state.auth = AuthState::SignedOut;
        self.state.clear_session_data();
        self.state.return_to = None;
        self.state.route = Route::Login;
        self.state.notify(ToastLevel::Info, "Signed out");
    }

    /// A fresh ID token, or the reported failure.
    async fn authorized(&mut self) -> Option<String> {
        match self.session.id_token().await {
            Ok(token) => {
                self.persist_refresh_token().await;
                Some(token)
            }
            Err(err) => {
                self.report("Session", err.into()).await;
                None
            }
        }
    }

    async fn report(&mut self, action: &str, err: ClientError) {
        tracing::warn!(action, "request failed: {err}");
        if err.is_offline() {
            self.state.mark_offline();
        } else {
            self.state.connection.online = true;
        }

        match &err {
            ClientError::Unauthorized
            | ClientError::Auth(AuthError::SignedOut | AuthError::TokenExpired) => {
                self.session.sign_out().await;
                self.local.refresh_token = None;
                self.save_local();
                self.state.notify_titled(
                    ToastLevel::Warning,
                    "Session expired",
                    "Please sign in again.",
                );
            }
            ClientError::Forbidden | ClientError::Auth(AuthError::PermissionDenied) => {
                self.state.notify_titled(
                    ToastLevel::Error,
                    "Permission denied",
                    client_message(&err),
                );
            }
            _ => {
                self.state
                    .notify_titled(ToastLevel::Error, action, client_message(&err));
            }
        }
    }

    // Navigation

    async fn navigate(&mut self, route: Route) {
        match decide(&route, &self.state.auth) {
            Decision::Wait => self.state.route = route,
            Decision::Allow => {
                self.state.route = route;
                self.enter_route().await;
            }
            Decision::Redirect { to, return_to } => {
                if route.access() == Access::AdminOnly && to == Route::Dashboard {
                    self.state.notify_titled(
                        ToastLevel::Warning,
                        "Access denied",
                        "Your account cannot open the admin panel.",
                    );
                }
                if return_to.is_some() {
                    self.state.return_to = return_to;
                }
                tracing::debug!(from = %route, to = %to, "redirected");
                self.state.route = to;
                self.enter_route().await;
            }
        }
    }

    /// Loads what the current route shows.
    async fn enter_route(&mut self) {
        self.state.modal = None;
        match self.state.route.clone() {
            Route::Login => {
                self.state.login.password.clear();
            }
            Route::Dashboard => self.ensure_plots().await,
            Route::PlotDetail(id) => self.load_plot_detail(&id).await,
            Route::Admin(page) => match page {
                AdminPage::Payments => self.ensure_payments().await,
                AdminPage::Receipts => {
                    self.ensure_payments().await;
                    self.ensure_plots().await;
                }
                AdminPage::Plots | AdminPage::Tenants => self.ensure_plots().await,
                AdminPage::RegisterPlot => {
                    let registering = self
                        .state
                        .plot_form
                        .as_ref()
                        .is_some_and(|form| form.mode() == FormMode::Register);
                    if !registering {
                        self.state.plot_form = Some(PlotFormState::register());
                    }
                }
                AdminPage::EditPlot(id) => self.open_plot_editor(&id).await,
                AdminPage::Settings => {}
            },
            Route::NotFound(_) => {}
        }
    }

    async fn refresh_route(&mut self) {
        match self.state.route.clone() {
            Route::Dashboard | Route::Admin(AdminPage::Plots | AdminPage::Tenants) => {
                self.load_plots().await;
            }
            Route::PlotDetail(id) => self.load_plot_detail(&id).await,
            Route::Admin(AdminPage::Payments | AdminPage::Receipts) => {
                self.load_payments().await;
            }
            _ => {}
        }
    }

    // Loading

    async fn ensure_plots(&mut self) {
        if !self.state.plots_loaded {
            self.load_plots().await;
        }
    }

    async fn ensure_payments(&mut self) {
        if !self.state.payments.loaded {
            self.load_payments().await;
        }
    }

    async fn load_plots(&mut self) {
        let Some(token) = self.authorized().await else {
            return;
        };
        match self.client.plots(&token).await {
            Ok(plots) => {
                tracing::debug!(count = plots.len(), "plots loaded");
                self.state.mark_online();
                self.state.set_plots(plots);
            }
            Err(err) => self.report("Loading plots failed", err).await,
        }
    }

    async fn load_payments(&mut self) {
        let Some(token) = self.authorized().await else {
            return;
        };
        match self.client.payments(&token).await {
            Ok(payments) => {
                tracing::debug!(count = payments.len(), "payments loaded");
                self.state.mark_online();
                self.state.payments.set_items(payments);
            }
            Err(err) => self.report("Loading payments failed", err).await,
        }
    }

    async fn load_plot_detail(&mut self, id: &str) {
        if self.state.detail.plot.as_ref().is_none_or(|plot| plot.id != id) {
            self.state.detail = PlotDetailState {
                plot: self.state.plot_by_id(id).cloned(),
                ..PlotDetailState::default()
            };
        }
        let Some(token) = self.authorized().await else {
            return;
        };
        match self.client.plot(&token, id).await {
            Ok(plot) => {
                self.state.mark_online();
                let len = plot.tenants.len();
                self.state.detail.plot = Some(plot);
                self.state.detail.cursor.clamp(len);
            }
            Err(err) => self.report("Loading plot failed", err).await,
        }
    }

    async fn open_plot_editor(&mut self, id: &str) {
        let editing = self
            .state
            .plot_form
            .as_ref()
            .is_some_and(|form| form.plot_id.as_deref() == Some(id));
        if editing {
            return;
        }
        let Some(token) = self.authorized().await else {
            self.state.route = Route::Admin(AdminPage::Plots);
            return;
        };
        match self.client.plot(&token, id).await {
            Ok(plot) => {
                self.state.mark_online();
                self.state.plot_form = Some(PlotFormState::edit(&plot));
            }
            Err(err) => {
                self.report("Loading plot failed", err).await;
                self.state.route = Route::Admin(AdminPage::Plots);
                self.ensure_plots().await;
            }
        }
    }

    // Keys

    async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let action = ui::keymap::map_key(key);
        if action == AppAction::Quit {
            self.should_quit = true;
            return Ok(());
        }

        if self.state.is_checking() {
            if action == AppAction::Input('q') {
                self.should_quit = true;
            }
        } else if self.state.modal.is_some() {
            self.handle_modal_key(action).await;
        } else {
            match self.state.route.clone() {
                Route::Login => self.handle_login_key(action).await,
                Route::Dashboard => self.handle_dashboard_key(action).await,
                Route::PlotDetail(_) => self.handle_detail_key(action).await,
                Route::Admin(page) => self.handle_admin_key(action, page).await,
                Route::NotFound(_) => match action {
                    AppAction::Input(ch) => {
                        self.handle_shortcut(ch).await;
                    }
                    AppAction::Submit | AppAction::Cancel => {
                        self.navigate(Route::Dashboard).await;
                    }
                    _ => {}
                },
            }
        }

        if self.state.busy {
            self.state.busy = false;
            self.discard_pending_input()?;
        }
        Ok(())
    }

    /// Shortcuts shared by every signed-in screen. Returns false when the key
    /// means nothing here.
    async fn handle_shortcut(&mut self, ch: char) -> bool {
        match ch {
            'q' => self.should_quit = true,
            'd' => self.navigate(Route::Dashboard).await,
            'a' => self.navigate(Route::Admin(AdminPage::Payments)).await,
            'r' => self.refresh_route().await,
            'o' => self.sign_out().await,
            _ => {
                let Some(tab) = AdminTab::from_shortcut(ch) else {
                    return false;
                };
                if self.state.admin_tab().is_some() {
                    self.state.plot_form = None;
                    self.navigate(Route::Admin(tab.page())).await;
                } else {
                    return false;
                }
            }
        }
        true
    }

    async fn handle_login_key(&mut self, action: AppAction) {
        let login = &mut self.state.login;
        match action {
            AppAction::NextField | AppAction::PrevField | AppAction::Up | AppAction::Down => {
                login.advance_focus();
            }
            AppAction::Submit => {
                if login.focus == LoginField::Email && login.password.is_empty() {
                    login.advance_focus();
                } else {
                    self.attempt_login().await;
                }
            }
            AppAction::Backspace => {
                login.active_field_mut().pop();
            }
            AppAction::Input(ch) => {
                login.active_field_mut().push(ch);
                login.message = None;
            }
            AppAction::Cancel => {
                login.password.clear();
                login.message = None;
            }
            _ => {}
        }
    }

    async fn handle_dashboard_key(&mut self, action: AppAction) {
        let len = self.state.plots.len();
        match action {
            AppAction::Up => self.state.dashboard.select_prev(),
            AppAction::Down => self.state.dashboard.select_next(len),
            AppAction::Submit => {
                if let Some(plot) = self.state.plots.get(self.state.dashboard.selected) {
                    let route = Route::PlotDetail(plot.id.clone());
                    self.navigate(route).await;
                }
            }
            AppAction::Input(ch) => {
                self.handle_shortcut(ch).await;
            }
            _ => {}
        }
    }

    async fn handle_detail_key(&mut self, action: AppAction) {
        let len = self
            .state
            .detail
            .plot
            .as_ref()
            .map_or(0, |plot| plot.tenants.len());
        match action {
            AppAction::Up => self.state.detail.cursor.select_prev(),
            AppAction::Down => self.state.detail.cursor.select_next(len),
            AppAction::Cancel | AppAction::Input('b') => {
                self.navigate(Route::Dashboard).await;
            }
            AppAction::Input('s') => self.open_stk_for_tenant(),
            AppAction::Input(ch) => {
                self.handle_shortcut(ch).await;
            }
            _ => {}
        }
    }

    async fn handle_admin_key(&mut self, action: AppAction, page: AdminPage) {
        match page {
            AdminPage::Payments => self.handle_payments_key(action).await,
            AdminPage::Plots => self.handle_plots_key(action).await,
            AdminPage::RegisterPlot | AdminPage::EditPlot(_) => {
                self.handle_plot_form_key(action).await;
            }
            AdminPage::Tenants => self.handle_tenants_key(action).await,
            AdminPage::Receipts => self.handle_receipts_key(action).await,
            AdminPage::Settings => self.handle_settings_key(action).await,
        }
    }

    async fn handle_payments_key(&mut self, action: AppAction) {
        let payments = &mut self.state.payments;
        if payments.search.active {
            edit_search(&mut payments.search, &mut payments.cursor, action);
            return;
        }

        let len = payments.visible().len();
        match action {
            AppAction::Up => payments.cursor.select_prev(),
            AppAction::Down => payments.cursor.select_next(len),
            AppAction::Cancel => {
                payments.search.query.clear();
                payments.cursor.reset();
            }
            AppAction::Input('/') => payments.search.active = true,
            AppAction::Submit | AppAction::Input('e') => {
                if let Some(payment) = payments.selected() {
                    self.state.modal = Some(Modal::PaymentEdit(PaymentEditModal::new(payment)));
                }
            }
            AppAction::Input('x') => {
                if let Some(payment) = payments.selected() {
                    let label = match payment.name.as_deref() {
                        Some(name) if !name.trim().is_empty() => {
                            format!("{} ({name})", payment.id)
                        }
                        _ => payment.id.clone(),
                    };
                    self.state.modal = Some(Modal::Confirm(ConfirmAction::DeletePayment {
                        id: payment.id.clone(),
                        label,
                    }));
                }
            }
            AppAction::Input('p') => {
                if let Some(payment) = payments.selected().cloned() {
                    self.print_receipt(&payment).await;
                }
            }
            AppAction::Input('s') => self.state.modal = Some(Modal::Stk(StkModal::new())),
            AppAction::Input('c') => self.export_payments(),
            AppAction::Input(ch) => {
                self.handle_shortcut(ch).await;
            }
            _ => {}
        }
    }

    async fn handle_plots_key(&mut self, action: AppAction) {
        let len = self.state.plots.len();
        let selected = self.state.plots.get(self.state.plots_admin.selected).cloned();
        match action {
            AppAction::Up => self.state.plots_admin.select_prev(),
            AppAction::Down => self.state.plots_admin.select_next(len),
            AppAction::Submit => {
                if let Some(plot) = selected {
                    self.navigate(Route::PlotDetail(plot.id)).await;
                }
            }
            AppAction::Input('n') => {
                self.navigate(Route::Admin(AdminPage::RegisterPlot)).await;
            }
            AppAction::Input('e') => {
                if let Some(plot) = selected {
                    self.navigate(Route::Admin(AdminPage::EditPlot(plot.id)))
                        .await;
                }
            }
            AppAction::Input('x') => {
                if let Some(plot) = selected {
                    self.state.modal = Some(Modal::Confirm(ConfirmAction::DeletePlot {
                        id: plot.id,
                        name: plot.name,
                    }));
                }
            }
            AppAction::Input('s') => self.state.modal = Some(Modal::Stk(StkModal::new())),
            AppAction::Input(ch) => {
                self.handle_shortcut(ch).await;
            }
            _ => {}
        }
    }

    async fn handle_plot_form_key(&mut self, action: AppAction) {
        let Some(form) = self.state.plot_form.as_mut() else {
            self.navigate(Route::Admin(AdminPage::Plots)).await;
            return;
        };
        match action {
            AppAction::NextField | AppAction::Down => form.next_field(),
            AppAction::PrevField | AppAction::Up => form.prev_field(),
            AppAction::Left | AppAction::Right => {
                if form.focused() == PlotField::PlotType {
                    form.cycle_type();
                }
            }
            AppAction::Backspace => form.edit_focused(Edit::Pop),
            AppAction::Input(ch) => form.edit_focused(Edit::Push(ch)),
            AppAction::AddRow => form.add_tenant(),
            AppAction::RemoveRow => form.remove_focused_tenant(),
            AppAction::Submit => self.submit_plot_form().await,
            AppAction::Cancel => {
                self.state.plot_form = None;
                self.navigate(Route::Admin(AdminPage::Plots)).await;
            }
            _ => {}
        }
    }

    async fn handle_tenants_key(&mut self, action: AppAction) {
        let tenants = &mut self.state.tenants;
        if tenants.search.active {
            edit_search(&mut tenants.search, &mut tenants.cursor, action);
            return;
        }

        let rows = self.state.tenant_rows();
        let selected = rows.get(self.state.tenants.cursor.selected).cloned();
        match action {
            AppAction::Up => self.state.tenants.cursor.select_prev(),
            AppAction::Down => self.state.tenants.cursor.select_next(rows.len()),
            AppAction::Cancel => {
                self.state.tenants.search.query.clear();
                self.state.tenants.cursor.reset();
            }
            AppAction::Input('/') => self.state.tenants.search.active = true,
            AppAction::Submit => {
                if let Some(contact) = selected {
                    self.navigate(Route::PlotDetail(contact.plot_id)).await;
                }
            }
            AppAction::Input('s') => {
                let modal = selected.map_or_else(StkModal::new, |contact| {
                    StkModal::for_contact(&contact)
                });
                self.state.modal = Some(Modal::Stk(modal));
            }
            AppAction::Input(ch) => {
                self.handle_shortcut(ch).await;
            }
            _ => {}
        }
    }

    async fn handle_receipts_key(&mut self, action: AppAction) {
        let receipts = &mut self.state.receipts;
        if receipts.editing {
            match action {
                AppAction::NextField | AppAction::Down => receipts.next_field(),
                AppAction::Left => receipts.cycle_focused(&self.state.plots, false),
                AppAction::Right => receipts.cycle_focused(&self.state.plots, true),
                AppAction::Input(' ') => receipts.cycle_focused(&self.state.plots, true),
                AppAction::Input(ch) if receipts.focus == ReceiptField::Year => {
                    receipts.edit_year(Edit::Push(ch));
                }
                AppAction::Backspace if receipts.focus == ReceiptField::Year => {
                    receipts.edit_year(Edit::Pop);
                }
                AppAction::Submit | AppAction::Cancel => receipts.editing = false,
                _ => {}
            }
            return;
        }

        let selected = receipts
            .visible(&self.state.payments.items)
            .get(receipts.cursor.selected)
            .map(|payment| (*payment).clone());
        let len = receipts.visible(&self.state.payments.items).len();
        match action {
            AppAction::Up => receipts.cursor.select_prev(),
            AppAction::Down => receipts.cursor.select_next(len),
            AppAction::Input('f') => receipts.editing = true,
            AppAction::Input('c') | AppAction::Cancel => receipts.clear(),
            AppAction::Submit | AppAction::Input('p') => {
                if let Some(payment) = selected {
                    self.print_receipt(&payment).await;
                }
            }
            AppAction::Input(ch) => {
                self.handle_shortcut(ch).await;
            }
            _ => {}
        }
    }

    async fn handle_settings_key(&mut self, action: AppAction) {
        let settings = &mut self.state.settings;
        if !settings.editing {
            match action {
                AppAction::Submit | AppAction::Input('e') => settings.editing = true,
                AppAction::Up => settings.prev_field(),
                AppAction::Down => settings.next_field(),
                AppAction::Input(ch) => {
                    self.handle_shortcut(ch).await;
                }
                _ => {}
            }
            return;
        }

        match action {
            AppAction::NextField | AppAction::Down => settings.next_field(),
            AppAction::PrevField | AppAction::Up => settings.prev_field(),
            AppAction::Left | AppAction::Right => {
                if !settings.focused().is_text() {
                    settings.toggle_focused();
                }
            }
            AppAction::Backspace => settings.edit_focused(Edit::Pop),
            AppAction::Input(ch) => settings.edit_focused(Edit::Push(ch)),
            AppAction::Cancel => settings.cancel(),
            AppAction::Submit => self.save_settings(),
            _ => {}
        }
    }

    async fn handle_modal_key(&mut self, action: AppAction) {
        let Some(modal) = self.state.modal.as_mut() else {
            return;
        };
        match modal {
            Modal::Stk(stk) => match action {
                AppAction::Cancel => self.state.modal = None,
                AppAction::NextField => stk.next_field(),
                AppAction::Up if stk.focus == StkField::Contacts => stk.cursor.select_prev(),
                AppAction::Down if stk.focus == StkField::Contacts => {
                    let contacts = stk_contacts(&self.state.plots);
                    let len = stk.matches(&contacts).len();
                    stk.cursor.select_next(len);
                }
                AppAction::Backspace => stk.edit_focused(Edit::Pop),
                AppAction::Input(ch) => stk.edit_focused(Edit::Push(ch)),
                AppAction::Submit => {
                    if stk.focus == StkField::Contacts {
                        let contacts = stk_contacts(&self.state.plots);
                        if !stk.pick(&contacts) {
                            stk.focus = StkField::Phone;
                        }
                    } else {
                        self.submit_stk().await;
                    }
                }
                _ => {}
            },
            Modal::PaymentEdit(edit) => match action {
                AppAction::Cancel => self.state.modal = None,
                AppAction::NextField | AppAction::Down | AppAction::Up => edit.next_field(),
                AppAction::Backspace => edit.edit_focused(Edit::Pop),
                AppAction::Input(ch) => edit.edit_focused(Edit::Push(ch)),
                AppAction::Submit => match edit.form.validate() {
                    Ok(update) => {
                        let edit = edit.clone();
                        self.state.modal =
                            Some(Modal::Confirm(ConfirmAction::UpdatePayment { update, edit }));
                    }
                    Err(err) => self.warn_form(&err),
                },
                _ => {}
            },
            Modal::Confirm(confirm) => match action {
                AppAction::Submit | AppAction::Input('y') | AppAction::Input('Y') => {
                    let confirm = confirm.clone();
                    self.state.modal = None;
                    self.execute(confirm).await;
                }
                AppAction::Cancel | AppAction::Input('n') | AppAction::Input('N') => {
                    self.state.modal = match confirm {
                        ConfirmAction::UpdatePayment { edit, .. } => {
                            Some(Modal::PaymentEdit(edit.clone()))
                        }
                        _ => None,
                    };
                }
                _ => {}
            },
        }
    }

    fn warn_form(&mut self, err: &FormError) {
        self.state
            .notify_titled(ToastLevel::Warning, err.title(), err.to_string());
    }

    // Actions

    fn open_stk_for_tenant(&mut self) {
        let Some(plot) = self.state.detail.plot.as_ref() else {
            return;
        };
        if !self.state.can_administer() {
            self.state.notify_titled(
                ToastLevel::Warning,
                "Access denied",
                "Only admins and managers can send STK pushes.",
            );
            return;
        }
        let Some(tenant) = plot.tenants.get(self.state.detail.cursor.selected) else {
            return;
        };
        let contact = directory_rows(std::slice::from_ref(plot))
            .into_iter()
            .find(|contact| contact.phone == tenant.phone.trim() && contact.name == tenant.name.trim());
        let modal = contact.map_or_else(StkModal::new, |contact| StkModal::for_contact(&contact));
        self.state.modal = Some(Modal::Stk(modal));
    }

    async fn submit_stk(&mut self) {
        let Some(Modal::Stk(stk)) = self.state.modal.as_ref() else {
            return;
        };
        let push = match stk.form.validate() {
            Ok(push) => push,
            Err(err) => {
                self.warn_form(&err);
                return;
            }
        };

        self.state.busy = true;
        let Some(token) = self.authorized().await else {
            return;
        };
        match self.client.stk_push(&token, &push).await {
            Ok(ack) => {
                tracing::info!(phone = %push.phone, amount = %push.amount, "stk push sent");
                self.state.mark_online();
                self.state.modal = None;
                let message = ack
                    .text()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Prompt sent to {}", push.phone));
                self.state
                    .notify_titled(ToastLevel::Success, "STK push sent", message);
            }
            Err(err) => self.report("STK push failed", err).await,
        }
    }

    async fn submit_plot_form(&mut self) {
        let Some(form) = self.state.plot_form.as_ref() else {
            return;
        };
        let payload = match form.form.validate() {
            Ok(payload) => payload,
            Err(err) => {
                self.warn_form(&err);
                return;
            }
        };

        match (form.mode(), form.plot_id.clone()) {
            (FormMode::Edit, Some(id)) => {
                self.state.modal =
                    Some(Modal::Confirm(ConfirmAction::UpdatePlot { id, payload }));
            }
            _ => {
                self.state.busy = true;
                let Some(token) = self.authorized().await else {
                    return;
                };
                match self.client.register_plot(&token, &payload).await {
                    Ok(ack) => {
                        tracing::info!(name = %payload.name, "plot registered");
                        self.state.mark_online();
                        self.state.notify_titled(
                            ToastLevel::Success,
                            "Plot registered",
                            ack.text().unwrap_or(&payload.name).to_string(),
                        );
                        self.after_plot_saved().await;
                    }
                    Err(err) => self.report("Registering plot failed", err).await,
                }
            }
        }
    }

    async fn after_plot_saved(&mut self) {
        self.state.plot_form = None;
        self.state.plots_loaded = false;
        self.navigate(Route::Admin(AdminPage::Plots)).await;
    }

    async fn execute(&mut self, confirm: ConfirmAction) {
        self.state.busy = true;
        let Some(token) = self.authorized().await else {
            return;
        };
        match confirm {
            ConfirmAction::DeletePayment { id, .. } => {
                match self.client.delete_payment(&token, &id).await {
                    Ok(ack) => {
                        tracing::info!(%id, "payment deleted");
                        self.state.mark_online();
                        self.state.payments.remove(&id);
                        self.state.notify(
                            ToastLevel::Success,
                            ack.text().unwrap_or("Payment deleted").to_string(),
                        );
                    }
                    Err(err) => self.report("Deleting payment failed", err).await,
                }
            }
            ConfirmAction::DeletePlot { id, name } => {
                match self.client.delete_plot(&token, &id).await {
                    Ok(_) => {
                        tracing::info!(%id, "plot deleted");
                        self.state.mark_online();
                        self.state.remove_plot(&id);
                        self.state
                            .notify(ToastLevel::Success, format!("Deleted {name}"));
                    }
                    Err(err) => self.report("Deleting plot failed", err).await,
                }
            }
            ConfirmAction::UpdatePayment { update, edit } => {
                let id = edit.form.payment_id.clone();
                match self.client.update_payment(&token, &id, &update).await {
                    Ok(ack) => {
                        tracing::info!(%id, "payment updated");
                        self.state.mark_online();
                        self.state.notify(
                            ToastLevel::Success,
                            ack.text().unwrap_or("Payment updated").to_string(),
                        );
                        self.load_payments().await;
                    }
                    Err(err) => {
                        self.report("Updating payment failed", err).await;
                        self.state.modal = Some(Modal::PaymentEdit(edit));
                    }
                }
            }
            ConfirmAction::UpdatePlot { id, payload } => {
                match self.client.update_plot(&token, &id, &payload).await {
                    Ok(ack) => {
                        tracing::info!(%id, "plot updated");
                        self.state.mark_online();
                        self.state.notify(
                            ToastLevel::Success,
                            ack.text().unwrap_or("Plot updated").to_string(),
                        );
                        self.after_plot_saved().await;
                    }
                    Err(err) => self.report("Updating plot failed", err).await,
                }
            }
        }
    }

    /// Prints the backend's current copy of the payment, not the cached row.
    async fn print_receipt(&mut self, listed: &Payment) {
        self.state.busy = true;
        let Some(token) = self.authorized().await else {
            return;
        };
        let receipt = match self
            .client
            .receipt(&token, &listed.id, &self.state.receipt_options)
            .await
        {
            Ok(receipt) => {
                self.state.mark_online();
                receipt
            }
            Err(err) => {
                self.report("Loading receipt failed", err).await;
                return;
            }
        };

        match self.printer.print(&receipt).await {
            Ok(PrintOutcome::Sent { target, bytes }) => {
                tracing::info!(payment = %receipt.payment_id, %target, bytes, "receipt printed");
                self.state
                    .notify(ToastLevel::Success, format!("Receipt sent to {target}"));
            }
            Ok(PrintOutcome::Saved(path)) => {
                self.state.notify(
                    ToastLevel::Success,
                    format!("Receipt saved to {}", path.display()),
                );
            }
            Err(err) => {
                tracing::error!(payment = %receipt.payment_id, "printing failed: {err}");
                self.state
                    .notify_titled(ToastLevel::Error, "Printing failed", err.to_string());
            }
        }
    }

    fn export_payments(&mut self) {
        let rows: Vec<Payment> = self
            .state
            .payments
            .visible()
            .into_iter()
            .cloned()
            .collect();
        let path = PathBuf::from(&self.config.export_dir).join(format!(
            "payments-{}.csv",
            Local::now().format("%Y%m%d-%H%M%S")
        ));

        let written = std::fs::create_dir_all(&self.config.export_dir)
            .and_then(|()| File::create(&path))
            .map_err(|err| err.to_string())
            .and_then(|file| write_payments_csv(&rows, file).map_err(|err| err.to_string()));
        match written {
            Ok(()) => {
                tracing::info!(path = %path.display(), rows = rows.len(), "payments exported");
                self.state.notify(
                    ToastLevel::Success,
                    format!("Exported {} payments to {}", rows.len(), path.display()),
                );
            }
            Err(err) => {
                tracing::error!(path = %path.display(), "export failed: {err}");
                self.state
                    .notify_titled(ToastLevel::Error, "Export failed", err);
            }
        }
    }

    fn save_settings(&mut self) {
        let settings = self.state.settings.commit();
        self.local.settings = settings;
        if self.save_local() {
            tracing::info!("settings saved");
            self.state.notify(ToastLevel::Success, "Settings saved");
        }
    }
}

/// Keystrokes while a search line is active.
fn edit_search(search: &mut SearchInput, cursor: &mut ListCursor, action: AppAction) {
    match action {
        AppAction::Input(ch) => {
            search.query.push(ch);
            cursor.reset();
        }
        AppAction::Backspace => {
            search.query.pop();
            cursor.reset();
        }
        AppAction::Submit => search.active = false,
        AppAction::Cancel => {
            search.active = false;
            search.query.clear();
            cursor.reset();
        }
        _ => {}
    }
}

fn auth_message(err: &AuthError) -> String {
    match err {
        AuthError::InvalidCredentials => "Invalid email or password.".to_string(),
        AuthError::UserDisabled => "This account has been disabled.".to_string(),
        AuthError::TooManyAttempts => "Too many attempts. Try again later.".to_string(),
        AuthError::SignedOut | AuthError::TokenExpired => {
            "Your session has expired. Please sign in again.".to_string()
        }
        AuthError::PermissionDenied => "You do not have permission for this action.".to_string(),
        AuthError::Provider(message) => message.clone(),
        AuthError::Transport(_) => "Network error: check your connection.".to_string(),
    }
}

fn client_message(err: &ClientError) -> String {
    match err {
        ClientError::Unauthorized => "Your session is no longer valid.".to_string(),
        ClientError::Forbidden => "You do not have permission for this action.".to_string(),
        ClientError::NotFound => "Not found.".to_string(),
        ClientError::Conflict(message)
        | ClientError::Validation(message)
        | ClientError::Server(message)
        | ClientError::Rejected(message) => message.clone(),
        ClientError::Decode(_) => "Unexpected response from the server.".to_string(),
        ClientError::InvalidUrl(url) => format!("Invalid backend URL: {url}"),
        ClientError::Transport(_) => "Network error: check your connection.".to_string(),
        ClientError::Auth(err) => auth_message(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_line_edits_and_closes() {
        let mut search = SearchInput {
            query: String::new(),
            active: true,
        };
        let mut cursor = ListCursor { selected: 3 };

        edit_search(&mut search, &mut cursor, AppAction::Input('a'));
        edit_search(&mut search, &mut cursor, AppAction::Input('l'));
        assert_eq!(search.query, "al");
        assert_eq!(cursor.selected, 0);

        edit_search(&mut search, &mut cursor, AppAction::Submit);
        assert!(!search.active);
        assert_eq!(search.query, "al");

        search.active = true;
        edit_search(&mut search, &mut cursor, AppAction::Cancel);
        assert!(search.query.is_empty());
    }

    #[test]
    fn backend_messages_reach_the_user() {
        assert_eq!(
            client_message(&ClientError::Rejected("Payment is locked".to_string())),
            "Payment is locked"
        );
        assert_eq!(
            client_message(&ClientError::Auth(AuthError::InvalidCredentials)),
            "Invalid email or password."
        );
        assert_eq!(
            client_message(&ClientError::Forbidden),
            "You do not have permission for this action."
        );
    }
}
