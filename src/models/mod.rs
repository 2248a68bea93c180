pub mod permissions;
pub mod user;

pub use permissions::{PermissionsResponse, PermissionsUser};
pub use user::{AuthUser, ProviderUser};
