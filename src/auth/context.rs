//! The auth context: sign-in/sign-out actions plus the listener that keeps the
//! local auth state in step with the identity provider's session.

use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::error::AuthError;
use super::sequence::{SequenceGuard, Ticket};
use crate::clients::{GraphQLClient, HttpGraphQLClient, HttpPermissionsApi, PermissionsApi};
use crate::config::{ConfigV1, RoutesConfig};
use crate::models::{AuthUser, ProviderUser};
use crate::navigation::Navigator;
use crate::notify::Notifier;
use crate::providers::{IdentityProvider, PopupSignIn};
use crate::state::{reduce, AuthAction, AuthState};

/// The services an [`AuthContext`] drives.
#[derive(Clone)]
pub struct Collaborators {
    pub identity: Arc<dyn IdentityProvider>,
    pub graphql: Arc<dyn GraphQLClient>,
    pub permissions: Arc<dyn PermissionsApi>,
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
}

/// Holds the auth state and exposes the actions that change it.
pub struct AuthContext {
    services: Collaborators,
    routes: RoutesConfig,
    state: watch::Sender<AuthState>,
    cycles: SequenceGuard,
    listening: AtomicBool,
}

/// Keeps the auth state listener alive. Dropping it unsubscribes; cycles
/// already running are left to finish.
pub struct ListenerHandle {
    task: JoinHandle<()>,
}

impl ListenerHandle {
    pub fn stop(self) {
        self.task.abort();
    }

    /// True once the provider's notification stream has ended.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl AuthContext {
    pub fn new(services: Collaborators, routes: RoutesConfig) -> Self {
        info!(
            "Creating auth context for identity provider '{}'",
            services.identity.get_name()
        );
        let (state, _) = watch::channel(AuthState::default());
        Self {
            services,
            routes,
            state,
            cycles: SequenceGuard::new(),
            listening: AtomicBool::new(false),
        }
    }

    /// Build a context whose GraphQL and permissions clients talk HTTP to the
    /// backends named in `config`.
    pub fn from_config(
        config: &ConfigV1,
        identity: Arc<dyn IdentityProvider>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let services = Collaborators {
            identity,
            graphql: Arc::new(HttpGraphQLClient::new(&config.graphql)),
            permissions: Arc::new(HttpPermissionsApi::new(&config.api)),
            navigator,
            notifier,
        };
        Self::new(services, config.routes.clone())
    }

    /// A snapshot of the current auth state.
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Subscribe to auth state changes.
    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn routes(&self) -> &RoutesConfig {
        &self.routes
    }

    /// Sign in through the provider's popup. Failures are reported to the
    /// user and leave the previous state in place.
    pub async fn sign_in(&self) {
        self.dispatch(AuthAction::Loading(true));

        match self.services.identity.sign_in_with_popup().await {
            Ok(PopupSignIn { user, access_token }) => {
                info!(
                    event_name = "auth.sign_in.succeeded",
                    event_domain = "auth",
                    provider = self.services.identity.get_name(),
                    uid = user.uid.as_str(),
                    "popup sign-in succeeded"
                );
                self.dispatch(AuthAction::SignIn(AuthUser::from_popup(
                    &user,
                    &access_token,
                )));
            }
            Err(err) => {
                self.dispatch(AuthAction::Loading(false));
                error!(
                    event_name = "auth.sign_in.failed",
                    event_domain = "auth",
                    provider = self.services.identity.get_name(),
                    error_code = err.code.as_str(),
                    error_message = err.message.as_str(),
                    email = err.email.as_deref(),
                    credential = err.credential.as_deref(),
                    "popup sign-in failed"
                );
                self.services.notifier.error(&err.message);
            }
        }
    }

    /// Sign out of the provider. Any session refresh still in flight is
    /// superseded so it cannot sign the user back in.
    pub async fn sign_out(&self) {
        self.cycles.supersede();
        self.dispatch(AuthAction::Loading(true));

        match self.services.identity.sign_out().await {
            Ok(()) => {
                info!(
                    event_name = "auth.sign_out.succeeded",
                    event_domain = "auth",
                    provider = self.services.identity.get_name(),
                    "signed out"
                );
                self.dispatch(AuthAction::SignOut);
            }
            Err(err) => {
                self.dispatch(AuthAction::Loading(false));
                self.report("auth.sign_out.failed", &AuthError::from(err));
            }
        }
    }

    /// Subscribe to the provider's session changes. Each notification runs as
    /// its own task, so a slow refresh never holds up a newer one.
    pub fn listen(self: &Arc<Self>) -> Result<ListenerHandle, AuthError> {
        if self.listening.swap(true, Ordering::SeqCst) {
            return Err(AuthError::AlreadyListening);
        }

        let mut changes = self.services.identity.auth_state_changes();
        let context = Arc::clone(self);
        let task = tokio::spawn(async move {
            while let Some(user) = changes.next().await {
                let ticket = context.cycles.begin();
                debug!(
                    event_name = "auth.session.changed",
                    event_domain = "auth",
                    ticket = ?ticket,
                    signed_in = user.is_some(),
                    "auth state notification"
                );
                let cycle = Arc::clone(&context);
                tokio::spawn(async move { cycle.run_cycle(ticket, user).await });
            }
            debug!("auth state notifications ended");
        });

        Ok(ListenerHandle { task })
    }

    /// Handle one session notification as the listener would.
    pub async fn on_auth_state_changed(&self, user: Option<ProviderUser>) {
        let ticket = self.cycles.begin();
        self.run_cycle(ticket, user).await;
    }

    async fn run_cycle(&self, ticket: Ticket, user: Option<ProviderUser>) {
        let Some(user) = user else {
            if self.dispatch_current(ticket, AuthAction::Loading(false)) {
                self.services.navigator.push(&self.routes.login);
            }
            return;
        };

        self.dispatch_current(ticket, AuthAction::Loading(true));

        match self.refresh_session(ticket, &user).await {
            Ok(auth_user) => {
                if self.dispatch_current(ticket, AuthAction::SignIn(auth_user)) {
                    info!(
                        event_name = "auth.session.signed_in",
                        event_domain = "auth",
                        uid = user.uid.as_str(),
                        "session refreshed"
                    );
                    let destination = self.continue_destination();
                    self.services.navigator.push(&destination);
                } else {
                    debug!(ticket = ?ticket, "dropping superseded session refresh");
                }
            }
            Err(err) => {
                if self.dispatch_current(ticket, AuthAction::Loading(false)) {
                    self.report("auth.session.failed", &err);
                } else {
                    warn!(
                        event_name = "auth.session.failed",
                        event_domain = "auth",
                        error_kind = err.kind(),
                        error_message = %err,
                        superseded = true,
                        "superseded session refresh failed"
                    );
                }
            }
        }
    }

    /// Exchange the provider session for a fully merged application user.
    async fn refresh_session(
        &self,
        ticket: Ticket,
        user: &ProviderUser,
    ) -> Result<AuthUser, AuthError> {
        let token = self.services.identity.id_token(user).await?;
        // A superseded cycle must not put its token back on the shared transport.
        if self.cycles.is_current(ticket) {
            self.services.graphql.set_authorization(&token);
        }
        debug!(uid = user.uid.as_str(), "identity token refreshed");

        let record = self.services.graphql.fetch_user(&user.uid).await?;
        let permissions = self.services.permissions.permissions(&token).await?;

        Ok(AuthUser::from_session(&token, user, record, &permissions))
    }

    fn continue_destination(&self) -> String {
        self.services
            .navigator
            .query_param(&self.routes.continue_param)
            .filter(|destination| !destination.is_empty())
            .unwrap_or_else(|| self.routes.dashboard.clone())
    }

    fn dispatch(&self, action: AuthAction) {
        self.state.send_modify(|state| {
            let current = std::mem::take(state);
            *state = reduce(current, action);
        });
    }

    /// Dispatch only while `ticket` is the latest cycle. Returns whether it did.
    fn dispatch_current(&self, ticket: Ticket, action: AuthAction) -> bool {
        self.state.send_if_modified(|state| {
            if !self.cycles.is_current(ticket) {
                return false;
            }
            let current = std::mem::take(state);
            *state = reduce(current, action);
            true
        })
    }

    fn report(&self, event_name: &'static str, err: &AuthError) {
        error!(
            event_name,
            event_domain = "auth",
            error_kind = err.kind(),
            error_message = %err,
            "auth operation failed"
        );
        self.services.notifier.error(&err.to_string());
    }
}
