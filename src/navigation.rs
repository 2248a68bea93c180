//! Client-side navigation: reading the current location and redirecting.

use reqwest::Url;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Programmatic navigation for the auth context.
pub trait Navigator: Send + Sync {
    /// Value of query parameter `name` on the current location, if any.
    fn query_param(&self, name: &str) -> Option<String>;

    /// Redirect to `path`.
    fn push(&self, path: &str);
}

/// An in-memory history stack. Locations may be paths (`/login?next=/a`) or
/// absolute URLs.
pub struct HistoryRouter {
    entries: Mutex<Vec<String>>,
}

impl HistoryRouter {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: Mutex::new(vec![initial.into()]),
        }
    }

    pub fn current(&self) -> String {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
            .unwrap_or_default()
    }

    /// Every location visited, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for HistoryRouter {
    fn default() -> Self {
        HistoryRouter::new("/")
    }
}

impl Navigator for HistoryRouter {
    fn query_param(&self, name: &str) -> Option<String> {
        let url = resolve(&self.current())?;
        let value = url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned());
        value
    }

    fn push(&self, path: &str) {
        debug!(
            event_name = "navigation.push",
            event_domain = "navigation",
            path,
            "navigating"
        );
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}

/// Resolve a location against a dummy origin so relative paths parse too.
fn resolve(location: &str) -> Option<Url> {
    Url::parse("http://localhost/").ok()?.join(location).ok()
}
