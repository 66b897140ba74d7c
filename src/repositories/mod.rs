pub mod token_repository;
pub mod user_repository;

pub use token_repository::{RegistrationTokenRepository, SqliteRegistrationTokenRepository};
pub use user_repository::{SqliteUserRepository, UserRepository};
