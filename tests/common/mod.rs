#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use avenue_auth::auth::{AuthContext, AuthError, Collaborators};
use avenue_auth::clients::GraphQLClient;
use avenue_auth::clients::PermissionsApi;
use avenue_auth::config::RoutesConfig;
use avenue_auth::models::{PermissionsResponse, PermissionsUser, ProviderUser};
use avenue_auth::navigation::HistoryRouter;
use avenue_auth::notify::ToastQueue;
use avenue_auth::providers::{
    AuthStateStream, IdentityProvider, PopupSignIn, ProviderError,
};
use futures::channel::mpsc;
use futures::StreamExt;
use serde_json::{json, Map, Value};
use tokio::sync::Notify;

/// An identity provider whose answers are scripted by the test.
pub struct FakeIdentityProvider {
    popup: Mutex<Result<PopupSignIn, ProviderError>>,
    sign_out: Mutex<Result<(), ProviderError>>,
    changes_tx: mpsc::UnboundedSender<Option<ProviderUser>>,
    changes_rx: Mutex<Option<mpsc::UnboundedReceiver<Option<ProviderUser>>>>,
}

impl FakeIdentityProvider {
    pub fn new() -> Self {
        let (changes_tx, changes_rx) = mpsc::unbounded();
        Self {
            popup: Mutex::new(Err(ProviderError::new(
                "auth/unscripted",
                "popup was not scripted",
            ))),
            sign_out: Mutex::new(Ok(())),
            changes_tx,
            changes_rx: Mutex::new(Some(changes_rx)),
        }
    }

    pub fn popup_returns(&self, result: Result<PopupSignIn, ProviderError>) {
        *self.popup.lock().unwrap() = result;
    }

    pub fn sign_out_returns(&self, result: Result<(), ProviderError>) {
        *self.sign_out.lock().unwrap() = result;
    }

    /// Push a session change notification to the listener.
    pub fn emit(&self, user: Option<ProviderUser>) {
        self.changes_tx
            .unbounded_send(user)
            .expect("listener receiver dropped");
    }
}

#[async_trait::async_trait]
impl IdentityProvider for FakeIdentityProvider {
    fn get_name(&self) -> &str {
        "fake"
    }

    async fn sign_in_with_popup(&self) -> Result<PopupSignIn, ProviderError> {
        self.popup.lock().unwrap().clone()
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.sign_out.lock().unwrap().clone()
    }

    fn auth_state_changes(&self) -> AuthStateStream {
        match self.changes_rx.lock().unwrap().take() {
            Some(rx) => rx.boxed(),
            None => futures::stream::empty().boxed(),
        }
    }

    async fn id_token(&self, user: &ProviderUser) -> Result<String, ProviderError> {
        Ok(format!("id-token-{}", user.uid))
    }
}

/// A GraphQL backend holding one record per uid. Lookups for a gated uid
/// block until the test opens the gate.
#[derive(Default)]
pub struct FakeGraphQL {
    records: Mutex<HashMap<String, Map<String, Value>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    authorizations: Mutex<Vec<String>>,
}

impl FakeGraphQL {
    pub fn insert(&self, uid: &str, record: Value) {
        let record = record.as_object().cloned().unwrap_or_default();
        self.records.lock().unwrap().insert(uid.to_string(), record);
    }

    pub fn gate(&self, uid: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(uid.to_string(), gate.clone());
        gate
    }

    pub fn authorizations(&self) -> Vec<String> {
        self.authorizations.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl GraphQLClient for FakeGraphQL {
    fn set_authorization(&self, token: &str) {
        self.authorizations.lock().unwrap().push(token.to_string());
    }

    async fn fetch_user(&self, uid: &str) -> Result<Option<Map<String, Value>>, AuthError> {
        let gate = self.gates.lock().unwrap().get(uid).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(self.records.lock().unwrap().get(uid).cloned())
    }
}

/// A permissions backend answering every token the same way.
pub struct FakePermissions {
    response: Mutex<Result<PermissionsResponse, String>>,
    calls: Mutex<Vec<String>>,
}

impl FakePermissions {
    pub fn new() -> Self {
        Self {
            response: Mutex::new(Ok(permissions(json!(["projects:read"]), json!(7)))),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn returns(&self, response: Result<PermissionsResponse, String>) {
        *self.response.lock().unwrap() = response;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PermissionsApi for FakePermissions {
    async fn permissions(&self, token: &str) -> Result<PermissionsResponse, AuthError> {
        self.calls.lock().unwrap().push(token.to_string());
        self.response
            .lock()
            .unwrap()
            .clone()
            .map_err(AuthError::Permissions)
    }
}

pub fn permissions(permissions: Value, user_id: Value) -> PermissionsResponse {
    PermissionsResponse {
        permissions,
        user: PermissionsUser { user_id },
    }
}

pub fn provider_user(uid: &str) -> ProviderUser {
    ProviderUser {
        email: Some(format!("{}@example.com", uid)),
        display_name: Some(uid.to_uppercase()),
        ..ProviderUser::new(uid)
    }
}

/// An auth context wired to fakes, with handles to inspect each of them.
pub struct Harness {
    pub context: Arc<AuthContext>,
    pub identity: Arc<FakeIdentityProvider>,
    pub graphql: Arc<FakeGraphQL>,
    pub permissions: Arc<FakePermissions>,
    pub router: Arc<HistoryRouter>,
    pub toasts: Arc<ToastQueue>,
}

impl Harness {
    pub fn new() -> Self {
        Self::at("/")
    }

    /// A harness whose router starts at `location`.
    pub fn at(location: &str) -> Self {
        let identity = Arc::new(FakeIdentityProvider::new());
        let graphql = Arc::new(FakeGraphQL::default());
        let permissions = Arc::new(FakePermissions::new());
        let router = Arc::new(HistoryRouter::new(location));
        let toasts = Arc::new(ToastQueue::new());

        let context = Arc::new(AuthContext::new(
            Collaborators {
                identity: identity.clone(),
                graphql: graphql.clone(),
                permissions: permissions.clone(),
                navigator: router.clone(),
                notifier: toasts.clone(),
            },
            RoutesConfig::default(),
        ));

        Self {
            context,
            identity,
            graphql,
            permissions,
            router,
            toasts,
        }
    }
}

/// Poll `condition` until it holds, failing the test after two seconds.
pub async fn eventually<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within two seconds"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Run `future` with a timeout so a hung cycle fails instead of blocking.
pub async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(2), future)
        .await
        .expect("future did not complete within two seconds")
}
