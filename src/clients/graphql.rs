use serde_json::{json, Map, Value};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

use crate::auth::AuthError;
use crate::config::GraphQLConfig;

/// The transport a GraphQL request goes out on: endpoint plus the bearer
/// token attached to every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQLLink {
    pub uri: String,
    pub bearer: Option<String>,
}

impl GraphQLLink {
    pub fn new(uri: impl Into<String>) -> Self {
        GraphQLLink {
            uri: uri.into(),
            bearer: None,
        }
    }

    pub fn with_bearer(&self, token: &str) -> Self {
        GraphQLLink {
            uri: self.uri.clone(),
            bearer: Some(token.to_string()),
        }
    }
}

/// The application's GraphQL backend, as far as authentication needs it.
#[async_trait::async_trait]
pub trait GraphQLClient: Send + Sync {
    /// Swap the transport so later requests carry `token`.
    fn set_authorization(&self, token: &str);

    /// Look up the application's record for the identity provider `uid`.
    /// `Ok(None)` means the backend knows no such user.
    async fn fetch_user(&self, uid: &str) -> Result<Option<Map<String, Value>>, AuthError>;
}

/// A [`GraphQLClient`] speaking GraphQL-over-HTTP with reqwest.
pub struct HttpGraphQLClient {
    client: reqwest::Client,
    config: GraphQLConfig,
    link: RwLock<GraphQLLink>,
}

impl HttpGraphQLClient {
    pub fn new(config: &GraphQLConfig) -> Self {
        info!("Creating GraphQL client for '{}'", config.uri);
        Self {
            client: reqwest::Client::new(),
            config: config.clone(),
            link: RwLock::new(GraphQLLink::new(config.uri.clone())),
        }
    }

    /// The transport currently in use.
    pub fn link(&self) -> GraphQLLink {
        self.link
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_link(&self, link: GraphQLLink) {
        *self.link.write().unwrap_or_else(PoisonError::into_inner) = link;
    }
}

#[async_trait::async_trait]
impl GraphQLClient for HttpGraphQLClient {
    fn set_authorization(&self, token: &str) {
        let link = self.link().with_bearer(token);
        self.set_link(link);
    }

    async fn fetch_user(&self, uid: &str) -> Result<Option<Map<String, Value>>, AuthError> {
        let link = self.link();
        debug!(
            event_name = "clients.graphql.user.request",
            event_domain = "clients",
            uri = link.uri.as_str(),
            uid,
            authorized = link.bearer.is_some(),
            "sending GraphQL user lookup"
        );

        let mut request = self.client.post(&link.uri).json(&json!({
            "query": self.config.user_query,
            "variables": { "uid": uid },
        }));
        if let Some(token) = &link.bearer {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AuthError::GraphQL(format!("Error sending request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::GraphQL(format!(
                "Unexpected status code: {}",
                status
            )));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| AuthError::GraphQL(format!("Error parsing JSON: {}", e)))?;

        parse_user(&body, &self.config.user_field)
    }
}

/// Pull the first row of `data.<field>` out of a GraphQL response body.
fn parse_user(body: &Value, field: &str) -> Result<Option<Map<String, Value>>, AuthError> {
    if let Some(first) = body["errors"].as_array().and_then(|errors| errors.first()) {
        let message = first["message"]
            .as_str()
            .unwrap_or("unknown GraphQL error")
            .to_string();
        return Err(AuthError::GraphQL(message));
    }

    let row = match &body["data"][field] {
        Value::Array(rows) => rows.first(),
        Value::Object(_) => Some(&body["data"][field]),
        _ => None,
    };
    Ok(row.and_then(Value::as_object).cloned())
}
