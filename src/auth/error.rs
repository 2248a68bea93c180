use thiserror::Error;

use crate::providers::ProviderError;

/// Everything that can go wrong while signing in, signing out or refreshing
/// a session. The `Display` text is what the user gets to see.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("GraphQL request failed: {0}")]
    GraphQL(String),

    #[error("Permissions request failed: {0}")]
    Permissions(String),

    #[error("auth state listener is already running")]
    AlreadyListening,
}

impl AuthError {
    /// Short machine-readable kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Provider(_) => "provider",
            AuthError::GraphQL(_) => "graphql",
            AuthError::Permissions(_) => "permissions",
            AuthError::AlreadyListening => "already_listening",
        }
    }
}
