pub mod identity;

// Re-export from identity.rs so we can do "use crate::providers::*;"
pub use identity::*;
