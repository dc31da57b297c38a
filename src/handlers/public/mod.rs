// handlers/public/mod.rs - Public handlers (no session required)
//
// Landing page, account registration, login/logout and the health probe.
// Handlers here must treat every input as untrusted.

pub mod auth;
pub mod health;
pub mod home;

pub use auth::*;
pub use health::health;
pub use home::index;
