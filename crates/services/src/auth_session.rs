use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use course_core::gate::{self, GateInput, GateOutcome, Route};
use course_core::model::{Credentials, RegistrationDraft, Role, User};
use storage::repository::{CredentialRepository, StoredCredential};

use crate::Clock;
use crate::api::{AuthApi, AuthGrant};
use crate::error::{ServiceError, SessionError};
use crate::sequencer::{LatestOnly, Ticket};

/// A verified sign-in.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    token: String,
    pub established_at: DateTime<Utc>,
    pub checked_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("established_at", &self.established_at)
            .field("checked_at", &self.checked_at)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// The stored credential has not been verified yet.
    Checking,
    SignedOut,
    SignedIn(Session),
}

impl AuthState {
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::SignedIn(session) => Some(&session.user),
            AuthState::Checking | AuthState::SignedOut => None,
        }
    }

    #[must_use]
    pub fn is_checking(&self) -> bool {
        matches!(self, AuthState::Checking)
    }
}

/// The signed-in identity, shared by every service.
///
/// Created on login, refreshed by [`AuthSession::check`] and destroyed on
/// logout. Clones share state. Login and logout supersede a check that is
/// still in flight, so a late check result never overwrites them.
#[derive(Clone)]
pub struct AuthSession {
    api: Arc<dyn AuthApi>,
    credentials: Arc<dyn CredentialRepository>,
    clock: Clock,
    state: Arc<RwLock<AuthState>>,
    transitions: LatestOnly,
}

impl AuthSession {
    #[must_use]
    pub fn new(
        api: Arc<dyn AuthApi>,
        credentials: Arc<dyn CredentialRepository>,
        clock: Clock,
    ) -> Self {
        Self {
            api,
            credentials,
            clock,
            state: Arc::new(RwLock::new(AuthState::Checking)),
            transitions: LatestOnly::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.state().user().cloned()
    }

    /// Start a new transition and apply its state in one step.
    fn begin(&self, next: AuthState) -> Ticket {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let ticket = self.transitions.issue();
        *state = next;
        ticket
    }

    /// Apply the outcome of `ticket` unless a newer transition has started.
    fn settle(&self, ticket: Ticket, next: AuthState) -> AuthState {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if !self.transitions.is_latest(ticket) {
            tracing::debug!("session changed while checking, keeping the newer state");
            return state.clone();
        }
        *state = next.clone();
        next
    }

    /// Verify the stored credential with the backend.
    ///
    /// Never fails: a missing credential, a storage error, a rejected token
    /// or an unreachable backend all end signed out, and the checked token is
    /// removed from storage whenever it could not be confirmed. If a login or
    /// logout happens meanwhile, its state wins and is returned instead.
    #[tracing::instrument(skip(self))]
    pub async fn check(&self) -> AuthState {
        let ticket = self.begin(AuthState::Checking);

        let stored = match self.credentials.load_credential().await {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(error = %err, "could not read stored credential");
                None
            }
        };
        let Some(stored) = stored else {
            return self.settle(ticket, AuthState::SignedOut);
        };

        let next = match self.api.current_user(&stored.token).await {
            Ok(user) => AuthState::SignedIn(Session {
                user,
                token: stored.token,
                established_at: stored.saved_at,
                checked_at: self.clock.now(),
            }),
            Err(err) => {
                tracing::warn!(error = %err, kind = ?err.kind(), "session check failed, signing out");
                self.discard_credential(&stored.token).await;
                AuthState::SignedOut
            }
        };
        self.settle(ticket, next)
    }

    /// # Errors
    ///
    /// Returns `SessionError::Api` if the backend refuses the credentials and
    /// `SessionError::Storage` if the token cannot be persisted.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let grant = self.api.login(&Credentials::new(email, password)).await?;
        self.establish(grant).await
    }

    /// Validate the form locally, then create the account.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Invalid` before any request for a bad form.
    #[tracing::instrument(skip(self, draft), fields(email = %draft.email, role = %draft.role))]
    pub async fn register(&self, draft: RegistrationDraft) -> Result<User, SessionError> {
        let draft = draft.validate()?;
        let grant = self.api.register(&draft).await?;
        self.establish(grant).await
    }

    async fn establish(&self, grant: AuthGrant) -> Result<User, SessionError> {
        let now = self.clock.now();
        self.credentials
            .save_credential(&StoredCredential::new(grant.token.clone(), now))
            .await?;
        tracing::info!(user = %grant.user.id, role = %grant.user.role, "signed in");
        let user = grant.user.clone();
        self.begin(AuthState::SignedIn(Session {
            user: grant.user,
            token: grant.token,
            established_at: now,
            checked_at: now,
        }));
        Ok(user)
    }

    /// Sign out locally, telling the backend when possible.
    ///
    /// The state is signed out and the credential cleared even when the
    /// backend call fails.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` only if the credential cannot be removed.
    #[tracing::instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), SessionError> {
        let token = match self.state() {
            AuthState::SignedIn(session) => Some(session.token),
            AuthState::Checking | AuthState::SignedOut => self
                .credentials
                .load_credential()
                .await
                .ok()
                .flatten()
                .map(|c| c.token),
        };
        self.begin(AuthState::SignedOut);

        if let Some(token) = token {
            if let Err(err) = self.api.logout(&token).await {
                tracing::warn!(error = %err, "backend logout failed");
            }
        }
        self.credentials.clear_credential().await?;
        tracing::info!("signed out");
        Ok(())
    }

    async fn discard_credential(&self, token: &str) {
        if let Err(err) = self.credentials.discard_credential(token).await {
            tracing::warn!(error = %err, "could not clear stored credential");
        }
    }

    /// Decide whether the current session may open `destination`.
    #[must_use]
    pub fn gate(&self, required_role: Option<Role>, destination: &Route) -> GateOutcome {
        let state = self.state();
        gate::evaluate(&GateInput {
            user: state.user(),
            checking: state.is_checking(),
            required_role,
            destination,
        })
    }

    /// Like [`AuthSession::gate`], with the role taken from the route's policy.
    #[must_use]
    pub fn guard(&self, destination: &Route) -> GateOutcome {
        let state = self.state();
        gate::guard(destination, state.user(), state.is_checking())
    }

    /// The active session, provided the user holds `role` (any role if `None`).
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotSignedIn` or `ServiceError::Forbidden`.
    pub fn authorize(&self, role: Option<Role>) -> Result<Session, ServiceError> {
        let AuthState::SignedIn(session) = self.state() else {
            return Err(ServiceError::NotSignedIn);
        };
        match role {
            Some(required) if session.user.role != required => {
                Err(ServiceError::Forbidden { required })
            }
            _ => Ok(session),
        }
    }
}
