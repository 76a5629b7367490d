//! View controller: screen loads, session-gated actions and the
//! write-then-reload consistency rule.
//!
//! Independent reads for a screen run concurrently and settle separately.
//! Every mutation finishes its write before the affected lists are
//! re-fetched; the controller never merges mutation responses into local
//! state (the one exception is the admin status change, which patches the
//! entry for immediate feedback before the full re-fetch).

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::state::{AuthState, Loadable, Notification, Page};
use crate::client::ApiClient;
use crate::error::ClientError;
use crate::models::{
    Amount, Contribution, DashboardStats, LoginRequest, LoginResponse, MassTime, NewContribution,
    ParishInfo, Pastoral, PaymentMethod, RegisterRequest, Registration, RegistrationStatus,
    Service, UserProfile, UserUpdate,
};
use crate::session::Session;

const ADMIN_ONLY_MESSAGE: &str = "This area is restricted to administrators.";

/// What the user sees after a contribution intent is recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionReceipt {
    pub value: Amount,
    pub method: PaymentMethod,
    /// Key to transfer to, for PIX intents
    pub pix_key: Option<String>,
    pub message: String,
}

pub struct ViewController {
    client: ApiClient,
    pix_key: String,

    page: Page,
    auth: AuthState,
    auth_prompt: bool,
    notification: Option<Notification>,
    receipt: Option<ContributionReceipt>,

    parish_info: Loadable<ParishInfo>,
    services: Loadable<Vec<Service>>,
    pastorals: Loadable<Vec<Pastoral>>,
    mass_times: Loadable<Vec<MassTime>>,

    my_registrations: Loadable<Vec<Registration>>,
    my_contributions: Loadable<Vec<Contribution>>,

    admin_registrations: Loadable<Vec<Registration>>,
    admin_users: Loadable<Vec<UserProfile>>,
    stats: Loadable<DashboardStats>,
}

impl ViewController {
    pub fn new(client: ApiClient, pix_key: impl Into<String>) -> Self {
        let auth = AuthState::from_session(client.session().get().as_deref());
        Self {
            client,
            pix_key: pix_key.into(),
            page: Page::Home,
            auth,
            auth_prompt: false,
            notification: None,
            receipt: None,
            parish_info: Loadable::Idle,
            services: Loadable::Idle,
            pastorals: Loadable::Idle,
            mass_times: Loadable::Idle,
            my_registrations: Loadable::Idle,
            my_contributions: Loadable::Idle,
            admin_registrations: Loadable::Idle,
            admin_users: Loadable::Idle,
            stats: Loadable::Idle,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn page(&self) -> Page {
        self.page
    }

    /// Authentication state, read from the session store except while a
    /// login or registration is in flight
    pub fn auth(&self) -> AuthState {
        match self.auth {
            AuthState::Authenticating => AuthState::Authenticating,
            _ => AuthState::from_session(self.client.session().get().as_deref()),
        }
    }

    pub fn session(&self) -> Option<Arc<Session>> {
        self.client.session().get()
    }

    pub fn auth_prompt_open(&self) -> bool {
        self.auth_prompt
    }

    pub fn close_auth_prompt(&mut self) {
        self.auth_prompt = false;
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn take_notification(&mut self) -> Option<Notification> {
        self.notification.take()
    }

    pub fn receipt(&self) -> Option<&ContributionReceipt> {
        self.receipt.as_ref()
    }

    pub fn parish_info(&self) -> &Loadable<ParishInfo> {
        &self.parish_info
    }

    pub fn services(&self) -> &Loadable<Vec<Service>> {
        &self.services
    }

    pub fn pastorals(&self) -> &Loadable<Vec<Pastoral>> {
        &self.pastorals
    }

    pub fn mass_times(&self) -> &Loadable<Vec<MassTime>> {
        &self.mass_times
    }

    pub fn my_registrations(&self) -> &Loadable<Vec<Registration>> {
        &self.my_registrations
    }

    pub fn my_contributions(&self) -> &Loadable<Vec<Contribution>> {
        &self.my_contributions
    }

    pub fn admin_registrations(&self) -> &Loadable<Vec<Registration>> {
        &self.admin_registrations
    }

    pub fn admin_users(&self) -> &Loadable<Vec<UserProfile>> {
        &self.admin_users
    }

    pub fn stats(&self) -> &Loadable<DashboardStats> {
        &self.stats
    }

    // ------------------------------------------------------------------
    // Navigation and screen loads
    // ------------------------------------------------------------------

    /// Switch screens and load what the new screen shows.
    ///
    /// Gated screens raise the auth prompt (no session) or an error
    /// notification (not an admin) and leave the current page in place.
    pub async fn navigate(&mut self, page: Page) {
        if page.requires_admin() {
            if !self.require_admin() {
                return;
            }
        } else if page.requires_session() && self.require_session().is_none() {
            return;
        }

        debug!(?page, "Navigating");
        self.page = page;
        self.refresh().await;
    }

    /// Reload every dataset of the current page
    pub async fn refresh(&mut self) {
        match self.page {
            Page::Home => self.load_home().await,
            Page::Services => self.load_services().await,
            Page::Pastorals => self.load_pastorals().await,
            Page::MassTimes => self.load_mass_times().await,
            Page::Auth => {}
            Page::MyArea => self.load_my_area().await,
            Page::Contribute => self.load_my_contributions().await,
            Page::Admin => self.load_admin().await,
        }
    }

    /// Parish info, services and pastorals, fetched concurrently
    pub async fn load_home(&mut self) {
        self.parish_info = Loadable::Loading;
        self.services = Loadable::Loading;
        self.pastorals = Loadable::Loading;

        let (info, services, pastorals) = tokio::join!(
            self.client.parish_info(),
            self.client.services(),
            self.client.pastorals()
        );

        let mut errors = Vec::new();
        let (state, err) = Loadable::settle(info);
        self.parish_info = state;
        errors.extend(err);
        let (state, err) = Loadable::settle(services);
        self.services = state;
        errors.extend(err);
        let (state, err) = Loadable::settle(pastorals);
        self.pastorals = state;
        errors.extend(err);

        self.report_all(errors);
    }

    pub async fn load_services(&mut self) {
        self.services = Loadable::Loading;
        let (state, err) = Loadable::settle(self.client.services().await);
        self.services = state;
        self.report_all(err);
    }

    pub async fn load_pastorals(&mut self) {
        self.pastorals = Loadable::Loading;
        let (state, err) = Loadable::settle(self.client.pastorals().await);
        self.pastorals = state;
        self.report_all(err);
    }

    pub async fn load_mass_times(&mut self) {
        self.mass_times = Loadable::Loading;
        let (state, err) = Loadable::settle(self.client.mass_times().await);
        self.mass_times = state;
        self.report_all(err);
    }

    /// The caller's registrations and contributions, fetched concurrently
    pub async fn load_my_area(&mut self) {
        if self.require_session().is_none() {
            return;
        }

        self.my_registrations = Loadable::Loading;
        self.my_contributions = Loadable::Loading;

        let (registrations, contributions) = tokio::join!(
            self.client.my_registrations(),
            self.client.my_contributions()
        );

        let mut errors = Vec::new();
        let (state, err) = Loadable::settle(registrations);
        self.my_registrations = state;
        errors.extend(err);
        let (state, err) = Loadable::settle(contributions);
        self.my_contributions = state;
        errors.extend(err);

        self.report_all(errors);
    }

    pub async fn load_my_contributions(&mut self) {
        if self.require_session().is_none() {
            return;
        }

        self.my_contributions = Loadable::Loading;
        let (state, err) = Loadable::settle(self.client.my_contributions().await);
        self.my_contributions = state;
        self.report_all(err);
    }

    /// Dashboard stats, all registrations and all users, fetched concurrently
    pub async fn load_admin(&mut self) {
        if !self.require_admin() {
            return;
        }

        self.stats = Loadable::Loading;
        self.admin_registrations = Loadable::Loading;
        self.admin_users = Loadable::Loading;

        let (stats, registrations, users) = tokio::join!(
            self.client.dashboard_stats(),
            self.client.admin_registrations(),
            self.client.admin_users()
        );

        let mut errors = Vec::new();
        let (state, err) = Loadable::settle(stats);
        self.stats = state;
        errors.extend(err);
        let (state, err) = Loadable::settle(registrations);
        self.admin_registrations = state;
        errors.extend(err);
        let (state, err) = Loadable::settle(users);
        self.admin_users = state;
        errors.extend(err);

        self.report_all(errors);
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    pub async fn login(&mut self, email: &str, password: &str) {
        let credentials = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        self.begin_authentication();
        match self.client.login(&credentials).await {
            Ok(response) => self.start_session(response, None),
            Err(e) => self.fail_authentication(&e),
        }
    }

    /// Create an account, then log in with the same credentials
    pub async fn register(&mut self, request: RegisterRequest) {
        self.begin_authentication();

        let confirmation = match self.client.register(&request).await {
            Ok(response) => response.message,
            Err(e) => {
                self.fail_authentication(&e);
                return;
            }
        };
        info!(email = %request.email, "Account registered");

        match self.client.login(&request.credentials()).await {
            Ok(response) => self.start_session(response, Some(confirmation)),
            Err(e) => self.fail_authentication(&e),
        }
    }

    pub fn logout(&mut self) {
        self.end_session();
        self.page = Page::Home;
        self.notification = Some(Notification::success("You have been logged out."));
    }

    fn begin_authentication(&mut self) {
        if self.client.session().is_authenticated() {
            self.end_session();
        }
        self.auth = AuthState::Authenticating;
    }

    fn fail_authentication(&mut self, err: &ClientError) {
        warn!(error = %err, "Authentication failed");
        self.auth = AuthState::Anonymous;
        self.notification = Some(Notification::error(err.user_message()));
    }

    fn start_session(&mut self, response: LoginResponse, confirmation: Option<String>) {
        let name = response.user.name.clone();
        let session = Session::new(response.token, response.user);
        self.auth = AuthState::Authenticated {
            role: session.role(),
        };
        self.client.session().set(session);

        self.auth_prompt = false;
        if self.page == Page::Auth {
            self.page = Page::Home;
        }

        let welcome = match confirmation.filter(|m| !m.trim().is_empty()) {
            Some(confirmation) => format!("{} Welcome, {}!", confirmation, name),
            None => format!("Welcome back, {}!", name),
        };
        self.notification = Some(Notification::success(welcome));
    }

    /// Clear the session and everything private to it
    fn end_session(&mut self) {
        self.client.session().clear();
        self.auth = AuthState::Anonymous;
        self.receipt = None;
        self.my_registrations = Loadable::Idle;
        self.my_contributions = Loadable::Idle;
        self.admin_registrations = Loadable::Idle;
        self.admin_users = Loadable::Idle;
        self.stats = Loadable::Idle;
        if self.page.requires_session() {
            self.page = Page::Home;
        }
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    pub async fn enroll(&mut self, service_id: u64) {
        if self.require_session().is_none() {
            return;
        }

        match self.client.create_registration(service_id).await {
            Ok(response) => {
                info!(service_id, "Enrolled in service");
                self.notify_success(response.message, "Your registration was submitted.");
                self.reload_my_registrations().await;
            }
            Err(e) => self.report(&e),
        }
    }

    pub async fn contribute(&mut self, value: Amount, method: PaymentMethod) {
        if self.require_session().is_none() {
            return;
        }
        if !value.is_positive() {
            self.notification = Some(Notification::error(
                "Enter a contribution amount greater than zero.",
            ));
            return;
        }

        let request = NewContribution { value, method };
        match self.client.create_contribution(&request).await {
            Ok(response) => {
                info!(cents = value.cents(), %method, "Contribution recorded");
                let message = if response.message.trim().is_empty() {
                    format!(
                        "Your contribution of {} via {} was recorded. Thank you!",
                        value, method
                    )
                } else {
                    response.message
                };

                self.receipt = Some(ContributionReceipt {
                    value,
                    method,
                    pix_key: (method == PaymentMethod::Pix).then(|| self.pix_key.clone()),
                    message: message.clone(),
                });
                self.notification = Some(Notification::success(message));
                self.reload_my_contributions().await;
            }
            Err(e) => self.report(&e),
        }
    }

    /// Confirm or decline a pending registration (admin only)
    pub async fn set_registration_status(&mut self, id: u64, status: RegistrationStatus) {
        if !self.require_admin() {
            return;
        }

        if status == RegistrationStatus::Pending {
            self.notification = Some(Notification::error(
                "A registration can only be confirmed or declined.",
            ));
            return;
        }

        let current = self
            .admin_registrations
            .data()
            .and_then(|list| list.iter().find(|r| r.id == id))
            .map(|r| r.status);
        if let Some(current) = current {
            if !current.can_transition_to(status) {
                self.notification = Some(Notification::error(format!(
                    "Registration {} is already {}.",
                    id, current
                )));
                return;
            }
        }

        match self.client.update_registration_status(id, status).await {
            Ok(response) => {
                info!(id, %status, "Registration status updated");
                if let Some(entry) = self
                    .admin_registrations
                    .data_mut()
                    .and_then(|list| list.iter_mut().find(|r| r.id == id))
                {
                    entry.status = status;
                }
                self.notify_success(response.message, format!("Registration {}.", status));

                let (registrations, stats) = tokio::join!(
                    self.client.admin_registrations(),
                    self.client.dashboard_stats()
                );
                let mut errors = Vec::new();
                let (state, err) = std::mem::take(&mut self.admin_registrations).refresh(registrations);
                self.admin_registrations = state;
                errors.extend(err);
                let (state, err) = std::mem::take(&mut self.stats).refresh(stats);
                self.stats = state;
                errors.extend(err);
                self.log_refresh_failures(errors);
            }
            Err(e) => self.report(&e),
        }
    }

    /// Update a user's profile fields and admin flag (admin only)
    pub async fn edit_user(&mut self, id: u64, update: UserUpdate) {
        if !self.require_admin() {
            return;
        }

        match self.client.update_user(id, &update).await {
            Ok(response) => {
                info!(id, is_admin = update.is_admin, "User updated");
                self.notify_success(response.message, "User updated.");
                let (state, err) =
                    std::mem::take(&mut self.admin_users).refresh(self.client.admin_users().await);
                self.admin_users = state;
                self.log_refresh_failures(err);
            }
            Err(e) => self.report(&e),
        }
    }

    async fn reload_my_registrations(&mut self) {
        let result = self.client.my_registrations().await;
        let (state, err) = std::mem::take(&mut self.my_registrations).refresh(result);
        self.my_registrations = state;
        self.log_refresh_failures(err);
    }

    async fn reload_my_contributions(&mut self) {
        let result = self.client.my_contributions().await;
        let (state, err) = std::mem::take(&mut self.my_contributions).refresh(result);
        self.my_contributions = state;
        self.log_refresh_failures(err);
    }

    // ------------------------------------------------------------------
    // Guards and reporting
    // ------------------------------------------------------------------

    fn require_session(&mut self) -> Option<Arc<Session>> {
        let session = self.client.session().get();
        if session.is_none() {
            self.report(&ClientError::AuthRequired);
        }
        session
    }

    fn require_admin(&mut self) -> bool {
        match self.require_session() {
            Some(session) if session.is_admin() => true,
            Some(_) => {
                self.notification = Some(Notification::error(ADMIN_ONLY_MESSAGE));
                false
            }
            None => false,
        }
    }

    fn notify_success(&mut self, server_message: String, fallback: impl Into<String>) {
        let message = if server_message.trim().is_empty() {
            fallback.into()
        } else {
            server_message
        };
        self.notification = Some(Notification::success(message));
    }

    /// Turn a failed call into a notification.
    ///
    /// A 401 while a session is active means the server no longer accepts
    /// the token: the session is dropped and the auth prompt raised.
    fn report(&mut self, err: &ClientError) {
        match err {
            ClientError::AuthRequired => {
                debug!("Action needs a session; prompting for login");
                self.auth_prompt = true;
            }
            e if e.is_unauthorized() && self.client.session().is_authenticated() => {
                warn!("Server rejected the session token");
                self.end_session();
                self.auth_prompt = true;
            }
            _ => {}
        }
        self.notification = Some(Notification::error(err.user_message()));
    }

    /// Report one failure of a batch and log the rest. A rejected token
    /// takes precedence over whichever failure came first.
    fn report_all(&mut self, errors: impl IntoIterator<Item = ClientError>) {
        let mut errors: Vec<ClientError> = errors.into_iter().collect();
        if errors.is_empty() {
            return;
        }

        let index = errors
            .iter()
            .position(ClientError::is_unauthorized)
            .unwrap_or(0);
        let reported = errors.remove(index);
        for other in &errors {
            warn!(error = %other, "Additional load failure");
        }
        self.report(&reported);
    }

    /// Re-fetch failures after a successful write keep the stale list and
    /// leave the success notification in place.
    fn log_refresh_failures(&mut self, errors: impl IntoIterator<Item = ClientError>) {
        for err in errors {
            if err.is_unauthorized() {
                self.report(&err);
                return;
            }
            warn!(error = %err, "Re-fetch after update failed; showing previous data");
        }
    }
}
