use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body returned by the backend permissions endpoint.
///
/// `permissions` is opaque to the client and stored as-is on the merged user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PermissionsResponse {
    #[serde(default)]
    pub permissions: Value,
    pub user: PermissionsUser,
}

/// The application-side identity of the caller. The backend may send the id
/// as a string or a number, so it is kept as raw JSON.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PermissionsUser {
    pub user_id: Value,
}
