//! Auth state and its transition function.
//!
//! The state is a tagged union driven only by [`AuthAction`]s through
//! [`reduce`], which is pure so it can be checked without any collaborators.

use serde::Serialize;

use crate::models::AuthUser;

/// Where the client currently stands with respect to authentication.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(tag = "status", content = "user", rename_all = "snake_case")]
pub enum AuthState {
    #[default]
    SignedOut,
    /// A sign-in, sign-out or session refresh is in flight. `previous` is the
    /// user that was signed in when loading began, restored if loading is
    /// cleared without a new outcome.
    Loading { previous: Option<AuthUser> },
    SignedIn(AuthUser),
}

/// The discrete transitions the auth state accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    Loading(bool),
    SignIn(AuthUser),
    SignOut,
}

impl AuthState {
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Loading { .. })
    }

    pub fn is_signed_in(&self) -> bool {
        self.user().is_some()
    }

    /// The signed-in user, including the one kept aside while loading.
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            AuthState::SignedIn(user) => Some(user),
            AuthState::Loading { previous } => previous.as_ref(),
            AuthState::SignedOut => None,
        }
    }
}

/// Apply `action` to `state`.
pub fn reduce(state: AuthState, action: AuthAction) -> AuthState {
    match (state, action) {
        (_, AuthAction::SignIn(user)) => AuthState::SignedIn(user),
        (_, AuthAction::SignOut) => AuthState::SignedOut,
        (AuthState::SignedOut, AuthAction::Loading(true)) => AuthState::Loading { previous: None },
        (AuthState::SignedIn(user), AuthAction::Loading(true)) => AuthState::Loading {
            previous: Some(user),
        },
        (AuthState::Loading { previous }, AuthAction::Loading(false)) => match previous {
            Some(user) => AuthState::SignedIn(user),
            None => AuthState::SignedOut,
        },
        (state, AuthAction::Loading(_)) => state,
    }
}
