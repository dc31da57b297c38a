// handlers/protected/mod.rs - Protected handlers (session required)
//
// Security Level: valid session cookie
// Middleware: require_login (pages) / require_api_login (/api/*), both of
// which place a `CurrentUser` in the request extensions.

pub mod api;
pub mod dashboard;
pub mod search;

pub use api::{household_transactions_get, spend_get};
pub use dashboard::{dashboard_get, dashboard_post};
pub use search::{search_get, search_post};
