//! Process-wide sign-in state.
//!
//! One [`SessionContext`] is created at startup and cloned into whoever needs
//! a token. Auth state changes are published on a watch channel; consumers
//! hold an [`AuthSubscription`] and stop listening by dropping it.

use std::sync::Arc;

use chrono::Duration;
use engine::{AuthState, Role, SignedInUser};
use tokio::sync::{Mutex, watch};

use crate::{
    auth::{Credentials, FirebaseAuth},
    error::AuthError,
};

/// ID tokens are refreshed when they expire within this window.
pub const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<Inner>,
}

struct Inner {
    auth: FirebaseAuth,
    state: watch::Sender<AuthState>,
    credentials: Mutex<Option<Credentials>>,
}

impl SessionContext {
    pub fn new(auth: FirebaseAuth) -> Self {
        let (state, _) = watch::channel(AuthState::Checking);
        Self {
            inner: Arc::new(Inner {
                auth,
                state,
                credentials: Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            receiver: Some(self.inner.state.subscribe()),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.state.receiver_count()
    }

    fn publish(&self, state: AuthState) {
        self.inner.state.send_replace(state);
    }

    /// Stores the credentials, looks the role up and announces the user.
    /// A failed role lookup signs the user in without a role.
    async fn establish(&self, credentials: Credentials) -> SignedInUser {
        let role = match self
            .inner
            .auth
            .get_role(&credentials.id_token, &credentials.uid)
            .await
        {
            Ok(role) => role,
            Err(err) => {
                tracing::warn!(uid = %credentials.uid, "role lookup failed: {err}");
                None
            }
        };
        let user = SignedInUser {
            uid: credentials.uid.clone(),
            email: credentials.email.clone(),
            role,
        };
        *self.inner.credentials.lock().await = Some(credentials);
        tracing::info!(
            uid = %user.uid,
            role = user.role.as_ref().map(Role::as_str).unwrap_or("none"),
            "signed in"
        );
        self.publish(AuthState::SignedIn(user.clone()));
        user
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignedInUser, AuthError> {
        let credentials = self.inner.auth.sign_in(email.trim(), password).await?;
        Ok(self.establish(credentials).await)
    }

    /// Resumes a stored session. Leaves the checking state either way.
    pub async fn restore(&self, refresh_token: Option<&str>) -> AuthState {
        let Some(token) = refresh_token.filter(|token| !token.trim().is_empty()) else {
            self.publish(AuthState::SignedOut);
            return self.state();
        };
        match self.inner.auth.refresh(token).await {
            Ok(credentials) => {
                self.establish(credentials).await;
            }
            Err(err) => {
                tracing::warn!("stored session could not be restored: {err}");
                self.publish(AuthState::SignedOut);
            }
        }
        self.state()
    }

    pub async fn sign_out(&self) {
        *self.inner.credentials.lock().await = None;
        tracing::info!("signed out");
        self.publish(AuthState::SignedOut);
    }

    /// Current refresh token, for persisting between runs.
    pub async fn refresh_token(&self) -> Option<String> {
        self.inner
            .credentials
            .lock()
            .await
            .as_ref()
            .map(|credentials| credentials.refresh_token.clone())
    }

    /// A valid ID token, refreshed first when it is about to expire.
    pub async fn id_token(&self) -> Result<String, AuthError> {
        let mut guard = self.inner.credentials.lock().await;
        let Some(current) = guard.as_ref() else {
            return Err(AuthError::SignedOut);
        };
        if !current.expires_within(Duration::seconds(REFRESH_MARGIN_SECS)) {
            return Ok(current.id_token.clone());
        }

        let refresh_token = current.refresh_token.clone();
        let email = current.email.clone();
        match self.inner.auth.refresh(&refresh_token).await {
            Ok(mut fresh) => {
                if fresh.email.is_empty() {
                    fresh.email = email;
                }
                let token = fresh.id_token.clone();
                *guard = Some(fresh);
                Ok(token)
            }
            Err(err) => {
                if matches!(err, AuthError::TokenExpired) {
                    *guard = None;
                    drop(guard);
                    self.publish(AuthState::SignedOut);
                }
                Err(err)
            }
        }
    }

    /// Writes a user's role. When it is the signed-in user, the published
    /// state picks the new role up.
    pub async fn set_role(&self, uid: &str, role: &str) -> Result<(), AuthError> {
        let token = self.id_token().await?;
        self.inner.auth.set_role(&token, uid, role).await?;

        if let AuthState::SignedIn(mut user) = self.state()
            && user.uid == uid
        {
            user.role = Role::parse(role);
            self.publish(AuthState::SignedIn(user));
        }
        Ok(())
    }
}

/// Listener handle for auth state changes. Dropping it unsubscribes.
pub struct AuthSubscription {
    receiver: Option<watch::Receiver<AuthState>>,
}

impl AuthSubscription {
    pub fn current(&self) -> AuthState {
        self.receiver
            .as_ref()
            .map(|receiver| receiver.borrow().clone())
            .unwrap_or_default()
    }

    /// Latest state if it changed since the last call, without waiting.
    pub fn poll(&mut self) -> Option<AuthState> {
        let receiver = self.receiver.as_mut()?;
        match receiver.has_changed() {
            Ok(true) => Some(receiver.borrow_and_update().clone()),
            _ => None,
        }
    }

    /// Waits for the next change. `None` once unsubscribed or when the
    /// session is gone.
    pub async fn changed(&mut self) -> Option<AuthState> {
        let receiver = self.receiver.as_mut()?;
        receiver.changed().await.ok()?;
        Some(receiver.borrow_and_update().clone())
    }

    pub fn is_active(&self) -> bool {
        self.receiver.is_some()
    }

    pub fn unsubscribe(&mut self) {
        if self.receiver.take().is_some() {
            tracing::debug!("auth subscription closed");
        }
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
