pub mod email_service;
pub mod mail_template;
pub mod registration_service;

pub use email_service::{create_email_service, EmailError, EmailService};
pub use registration_service::{RegistrationError, RegistrationService};
