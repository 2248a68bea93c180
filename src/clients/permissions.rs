use tracing::{debug, info};

use crate::auth::AuthError;
use crate::config::ApiConfig;
use crate::models::PermissionsResponse;

/// The backend endpoint that turns an identity token into permissions.
#[async_trait::async_trait]
pub trait PermissionsApi: Send + Sync {
    async fn permissions(&self, token: &str) -> Result<PermissionsResponse, AuthError>;
}

/// A [`PermissionsApi`] calling the REST backend with reqwest.
pub struct HttpPermissionsApi {
    client: reqwest::Client,
    url: String,
}

impl HttpPermissionsApi {
    pub fn new(config: &ApiConfig) -> Self {
        let url = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            config.permissions_path
        );
        info!("Creating permissions client for '{}'", url);
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl PermissionsApi for HttpPermissionsApi {
    async fn permissions(&self, token: &str) -> Result<PermissionsResponse, AuthError> {
        debug!("Sending permissions request to: {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Permissions(format!("Error sending request: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<PermissionsResponse>()
                .await
                .map_err(|e| AuthError::Permissions(format!("Error parsing JSON: {}", e)))
        } else if status == 401 || status == 403 {
            Err(AuthError::Permissions("Invalid identity token".to_string()))
        } else {
            Err(AuthError::Permissions(format!(
                "Unexpected status code: {}",
                status
            )))
        }
    }
}
