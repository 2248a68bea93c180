use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::logging::LoggingConfig;

/// Prefix for environment overrides, e.g. `AVENUE_API__BASE_URL`.
pub const ENV_PREFIX: &str = "AVENUE_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: backend endpoints, routes and logging.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub logging: LoggingConfig,
    pub graphql: GraphQLConfig,
    pub api: ApiConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
}

/// Where the GraphQL user lookup is sent and what it asks for.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct GraphQLConfig {
    pub uri: String,
    #[serde(default = "default_user_query")]
    pub user_query: String,
    /// Name of the field under `data` holding the matching user rows.
    #[serde(default = "default_user_field")]
    pub user_field: String,
}

/// The REST backend that turns an identity token into permissions.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_permissions_path")]
    pub permissions_path: String,
}

/// Client-side routes used for redirects after auth state changes.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct RoutesConfig {
    #[serde(default = "default_dashboard")]
    pub dashboard: String,
    #[serde(default = "default_login")]
    pub login: String,
    /// Query parameter carrying the post-login destination.
    #[serde(default = "default_continue_param")]
    pub continue_param: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            dashboard: default_dashboard(),
            login: default_login(),
            continue_param: default_continue_param(),
        }
    }
}

fn default_user_query() -> String {
    "query User($uid: String!) { user(where: { uid: { _eq: $uid } }) { id uid email name } }"
        .to_string()
}

fn default_user_field() -> String {
    "user".to_string()
}

fn default_permissions_path() -> String {
    "/auth".to_string()
}

fn default_dashboard() -> String {
    "/dashboard".to_string()
}

fn default_login() -> String {
    "/login".to_string()
}

fn default_continue_param() -> String {
    "continueUrl".to_string()
}

impl ConfigV1 {
    /// Extract a config from an already assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        match figment.extract::<Config>()? {
            Config::ConfigV1(c) => Ok(c),
        }
    }
}

/// Load config from a YAML file, with `AVENUE_`-prefixed environment overrides.
pub fn load_config(path: impl AsRef<Path>) -> Result<ConfigV1, figment::Error> {
    let figment = Figment::new()
        .merge(Yaml::file(path.as_ref()))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    ConfigV1::from_figment(figment)
}

/// The JSON schema for the configuration, pretty printed.
pub fn config_schema() -> Result<String, serde_json::Error> {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema)
}
