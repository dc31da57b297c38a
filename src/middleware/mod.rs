pub mod auth;
pub mod cookies;
pub mod flash;
pub mod response;

pub use auth::{require_api_login, require_login, CurrentUser, SESSION_COOKIE};
pub use flash::{redirect_with_flash, redirect_with_flash_in, Flash, FLASH_COOKIE};
pub use response::{ApiResponse, ApiResult};
