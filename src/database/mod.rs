pub mod manager;
pub mod models;
pub mod reference;
pub mod repository;
pub mod schema;
pub mod users;

pub use manager::{DatabaseError, DatabaseManager};
pub use reference::PgReferenceStore;
pub use repository::{ReferenceStore, ReplaceOutcome, Snapshot, UserRepository};
pub use users::PgUserRepository;
