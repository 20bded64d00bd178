//! Route protection.
//!
//! Decides, from the session snapshot and a destination, whether a protected
//! page renders, waits for the session check, or redirects elsewhere. The
//! decision is recomputed from scratch on every call; nothing is cached.

mod policy;
mod route;

pub use policy::RoutePolicy;
pub use route::{LOGIN_PATH, Route, RouteError};

use crate::model::{Role, User};

/// Where the gate stands for one destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// The session is still being verified.
    Checking,
    Unauthenticated,
    AuthenticatedWrongRole,
    Authorized,
}

/// What the shell should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateAction {
    ShowLoading,
    Render,
    RedirectTo(Route),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    pub state: GateState,
    pub action: GateAction,
}

impl GateOutcome {
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.state == GateState::Authorized
    }

    #[must_use]
    pub fn redirect(&self) -> Option<&Route> {
        match &self.action {
            GateAction::RedirectTo(route) => Some(route),
            GateAction::ShowLoading | GateAction::Render => None,
        }
    }
}

/// Session snapshot plus the page being requested.
#[derive(Debug, Clone, Copy)]
pub struct GateInput<'a> {
    pub user: Option<&'a User>,
    pub checking: bool,
    pub required_role: Option<Role>,
    pub destination: &'a Route,
}

/// Decide what to do with a request for a protected page.
///
/// A pending session check always wins, so nothing redirects before the
/// check settles. Without a user the login page is shown with the original
/// destination preserved; with the wrong role the user goes to their own
/// landing page.
#[must_use]
pub fn evaluate(input: &GateInput<'_>) -> GateOutcome {
    if input.checking {
        return GateOutcome {
            state: GateState::Checking,
            action: GateAction::ShowLoading,
        };
    }

    let Some(user) = input.user else {
        return GateOutcome {
            state: GateState::Unauthenticated,
            action: GateAction::RedirectTo(Route::login_redirect(input.destination)),
        };
    };

    match input.required_role {
        Some(required) if required != user.role => GateOutcome {
            state: GateState::AuthenticatedWrongRole,
            action: GateAction::RedirectTo(Route::landing(user.role)),
        },
        _ => GateOutcome {
            state: GateState::Authorized,
            action: GateAction::Render,
        },
    }
}

/// Resolve the policy for `destination` and run the gate against it.
///
/// Public pages render regardless of session state.
#[must_use]
pub fn guard(destination: &Route, user: Option<&User>, checking: bool) -> GateOutcome {
    let policy = RoutePolicy::for_route(destination);
    if !policy.requires_auth() {
        return GateOutcome {
            state: GateState::Authorized,
            action: GateAction::Render,
        };
    }
    evaluate(&GateInput {
        user,
        checking,
        required_role: policy.required_role(),
        destination,
    })
}
