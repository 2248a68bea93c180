//! Client-side authentication context.
//!
//! [`auth::AuthContext`] wraps an identity provider's popup sign-in, mirrors
//! the provider session into a local [`state::AuthState`], and exchanges the
//! provider's identity token for application permissions before redirecting.

pub mod auth;
pub mod clients;
pub mod config;
pub mod models;
pub mod navigation;
pub mod notify;
pub mod providers;
pub mod state;
pub mod utils;
