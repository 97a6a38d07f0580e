//! Authentication: identity-token verification, session cookies, and the
//! request extractors that hand a verified identity to handlers.

pub mod extract;
pub mod handlers;
pub mod identity;
pub mod session;

pub use extract::{AuthUser, MaybeAuthUser};
pub use identity::Identity;
