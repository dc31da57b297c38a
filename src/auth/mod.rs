pub mod credentials;
pub mod session;

pub use credentials::{CredentialService, LoginForm, RegistrationForm, UserError};
pub use session::{Claims, SessionError};
