// handlers/public/auth/mod.rs - Account and session endpoints

pub mod login;
pub mod register;
pub mod session;

pub use login::{login_get, login_post};
pub use register::{register_get, register_post};
pub use session::logout;
