//! The auth session manager.
//!
//! Owns the bearer token lifecycle and the current-user identity.
//! Collaborators are constructor-injected; nothing here is a global.
//! State changes take effect synchronously before the async call
//! resolves to its caller, so dependents (cart store, route guards)
//! never observe a half-updated session.

use std::sync::Arc;
use storefront_api::{ApiError, AuthApi, TokenStore};
use storefront_commerce::customer::{Role, User};
use thiserror::Error;

/// Session errors.
#[derive(Error, Debug)]
pub enum SessionError {
    /// An operation required a signed-in user.
    #[error("not signed in")]
    NotSignedIn,

    /// The session was found to be expired and has been cleared.
    #[error("session expired, please log in again")]
    Expired,

    /// A transient collaborator failure; prior session state is kept.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A snapshot of the current session, for guards and the cart store.
///
/// Invariant: `user` is present iff a previously validated token is
/// present.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// The validated user, if any.
    pub user: Option<User>,
    /// Whether startup validation has finished. Guards wait on this.
    pub resolved: bool,
}

impl Session {
    /// Whether a validated user is present.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// The current user's role, if signed in.
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }
}

/// Outcome of a startup token validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidateOutcome {
    /// No persisted token; session is empty.
    Anonymous,
    /// Token validated; the user is signed in.
    Authenticated,
    /// Token was rejected by the Auth API and has been cleared;
    /// the caller should navigate to login.
    Revoked,
}

/// Where the presentation layer should navigate after a session event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationTarget {
    /// The home/catalog view.
    Home,
    /// The login view.
    Login,
    /// The admin dashboard.
    AdminDashboard,
}

impl NavigationTarget {
    /// Post-login destination: admins land on the dashboard, everyone
    /// else on home.
    pub fn after_login(user: &User) -> Self {
        match user.role {
            Role::Admin => NavigationTarget::AdminDashboard,
            Role::User => NavigationTarget::Home,
        }
    }

    /// The route path for this target.
    pub fn path(&self) -> &'static str {
        match self {
            NavigationTarget::Home => "/",
            NavigationTarget::Login => "/login",
            NavigationTarget::AdminDashboard => "/admin/dashboard",
        }
    }
}

/// Owns the persisted token and the resolved user identity.
///
/// Single writer of the token store by convention; everything else
/// only reads.
pub struct SessionManager {
    auth: Arc<dyn AuthApi>,
    tokens: Arc<dyn TokenStore>,
    user: Option<User>,
    resolved: bool,
}

impl SessionManager {
    /// Create a manager with no resolved session.
    pub fn new(auth: Arc<dyn AuthApi>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            auth,
            tokens,
            user: None,
            resolved: false,
        }
    }

    /// Snapshot the current session.
    pub fn session(&self) -> Session {
        Session {
            user: self.user.clone(),
            resolved: self.resolved,
        }
    }

    /// The current user, if signed in.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Whether a validated user is present.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Validate the persisted token against the profile endpoint.
    ///
    /// No token leaves the session empty. An auth-class rejection
    /// clears the token and session (`Revoked`); a transient failure
    /// leaves prior state untouched and surfaces the error.
    pub async fn validate_token(&mut self) -> Result<ValidateOutcome, SessionError> {
        if self.tokens.load().is_none() {
            self.resolved = true;
            return Ok(ValidateOutcome::Anonymous);
        }

        match self.auth.profile().await {
            Ok(user) => {
                tracing::debug!(user = %user.id, "token validated");
                self.user = Some(user);
                self.resolved = true;
                Ok(ValidateOutcome::Authenticated)
            }
            Err(e) if e.is_auth_error() => {
                tracing::warn!(error = %e, "token rejected, clearing session");
                self.clear();
                Ok(ValidateOutcome::Revoked)
            }
            Err(e) => {
                // Transient failure: keep whatever we had.
                self.resolved = true;
                Err(SessionError::Api(e))
            }
        }
    }

    /// Install a session after the caller has authenticated.
    ///
    /// Persists the token and sets the user synchronously; no network
    /// call is made.
    pub fn login(&mut self, token: &str, user: User) {
        if let Err(e) = self.tokens.save(token) {
            tracing::warn!(error = %e, "failed to persist token");
        }
        self.user = Some(user);
        self.resolved = true;
    }

    /// End the session.
    ///
    /// The logout endpoint is best-effort; local state is cleared
    /// unconditionally, regardless of the network outcome.
    pub async fn logout(&mut self) -> NavigationTarget {
        if let Err(e) = self.auth.logout().await {
            tracing::warn!(error = %e, "logout request failed");
        }
        self.clear();
        NavigationTarget::Login
    }

    /// Re-check token liveness against the profile endpoint.
    ///
    /// For long-lived flows (checkout) where the token may have
    /// expired since validation. An auth-class rejection clears the
    /// session and yields [`SessionError::Expired`].
    pub async fn ensure_live(&mut self) -> Result<(), SessionError> {
        if self.user.is_none() {
            return Err(SessionError::NotSignedIn);
        }
        match self.auth.profile().await {
            Ok(user) => {
                self.user = Some(user);
                Ok(())
            }
            Err(e) if e.is_auth_error() => {
                tracing::warn!(error = %e, "session expired mid-flow");
                self.clear();
                Err(SessionError::Expired)
            }
            Err(e) => Err(SessionError::Api(e)),
        }
    }

    /// Clear the persisted token and the in-memory identity.
    pub fn clear(&mut self) {
        if let Err(e) = self.tokens.clear() {
            tracing::warn!(error = %e, "failed to clear persisted token");
        }
        self.user = None;
        self.resolved = true;
    }
}
