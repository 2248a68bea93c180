pub mod context;
pub mod error;
pub mod sequence;

// Re-export so we can do "use crate::auth::*;"
pub use context::{AuthContext, Collaborators, ListenerHandle};
pub use error::AuthError;
pub use sequence::{SequenceGuard, Ticket};
