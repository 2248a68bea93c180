//! HTTP adapters for the backends the auth context talks to.

pub mod graphql;
pub mod permissions;

pub use graphql::{GraphQLClient, GraphQLLink, HttpGraphQLClient};
pub use permissions::{HttpPermissionsApi, PermissionsApi};
