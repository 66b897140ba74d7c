pub mod registration_token;
pub mod user;

pub use registration_token::RegistrationToken;
pub use user::User;
