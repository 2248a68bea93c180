use futures::stream::BoxStream;
use thiserror::Error;

use crate::models::ProviderUser;

/// A stream of session changes: `Some(user)` when a session is present, `None`
/// when it is gone.
pub type AuthStateStream = BoxStream<'static, Option<ProviderUser>>;

/// What a successful popup sign-in hands back.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupSignIn {
    pub user: ProviderUser,
    /// OAuth access token from the credential attached to the popup result.
    pub access_token: String,
}

/// An error reported by the identity provider.
///
/// `email` and `credential` are only filled in for failures tied to a specific
/// account, e.g. an account that exists with a different credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub code: String,
    pub message: String,
    pub email: Option<String>,
    pub credential: Option<String>,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError {
            code: code.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }
}

/// The identity provider the client signs in against.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    fn get_name(&self) -> &str;

    /// Run the interactive popup flow.
    async fn sign_in_with_popup(&self) -> Result<PopupSignIn, ProviderError>;

    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Session change notifications. Implementations yield the restored
    /// session (or `None`) first, then every later change.
    fn auth_state_changes(&self) -> AuthStateStream;

    /// A fresh identity token for `user`, suitable as a bearer credential.
    async fn id_token(&self, user: &ProviderUser) -> Result<String, ProviderError>;
}
