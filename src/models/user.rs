use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::permissions::PermissionsResponse;

/// The profile handed out by the identity provider for a signed-in session.
///
/// Unknown provider fields are kept in `extra` so they survive the merge into
/// [`AuthUser`] untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub is_anonymous: bool,
    pub provider_id: Option<String>,
    pub tenant_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProviderUser {
    pub fn new(uid: impl Into<String>) -> Self {
        ProviderUser {
            uid: uid.into(),
            ..Default::default()
        }
    }

    /// The profile as a flat JSON object, the shape it takes inside [`AuthUser`].
    pub fn to_fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(fields)) => fields,
            _ => Map::new(),
        }
    }
}

/// The signed-in user as seen by the rest of the client.
///
/// Built by overlaying several sources in order; a later source overwrites any
/// key an earlier one set.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct AuthUser {
    fields: Map<String, Value>,
}

impl AuthUser {
    pub const ACCESS_TOKEN: &'static str = "accessToken";
    pub const PERMISSIONS: &'static str = "permissions";
    pub const USER_ID: &'static str = "userID";

    /// Overlay `sources` left to right, last write wins on key collision.
    pub fn merge<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = Map<String, Value>>,
    {
        let mut fields = Map::new();
        for source in sources {
            fields.extend(source);
        }
        AuthUser { fields }
    }

    /// User produced by the popup flow: profile first, then the popup's access token.
    pub fn from_popup(user: &ProviderUser, access_token: &str) -> Self {
        AuthUser::merge([
            user.to_fields(),
            single(Self::ACCESS_TOKEN, Value::from(access_token)),
        ])
    }

    /// User produced by an auth state change: access token, provider profile,
    /// application record, permissions, then the application user id.
    pub fn from_session(
        access_token: &str,
        user: &ProviderUser,
        record: Option<Map<String, Value>>,
        permissions: &PermissionsResponse,
    ) -> Self {
        AuthUser::merge([
            single(Self::ACCESS_TOKEN, Value::from(access_token)),
            user.to_fields(),
            record.unwrap_or_default(),
            single(Self::PERMISSIONS, permissions.permissions.clone()),
            single(Self::USER_ID, permissions.user.user_id.clone()),
        ])
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn access_token(&self) -> Option<&str> {
        self.str_field(Self::ACCESS_TOKEN)
    }

    pub fn uid(&self) -> Option<&str> {
        self.str_field("uid")
    }

    pub fn email(&self) -> Option<&str> {
        self.str_field("email")
    }

    pub fn display_name(&self) -> Option<&str> {
        self.str_field("displayName")
    }

    pub fn permissions(&self) -> Option<&Value> {
        self.fields.get(Self::PERMISSIONS)
    }

    pub fn user_id(&self) -> Option<&Value> {
        self.fields.get(Self::USER_ID)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

fn single(key: &str, value: Value) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    map
}
