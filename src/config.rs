use std::env;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("Invalid {0}: {1}")]
    Invalid(&'static str, String),
}

/// Placeholder substituted with the decoded activation URI when rendering
/// the mail body.
pub const ACTIVATION_LINK_PLACEHOLDER: &str = "{activation_link}";

const DEFAULT_EXPIRATION_MINUTES: &str = "1440";

const DEFAULT_MAIL_SUBJECT: &str = "Activate your account";

const DEFAULT_MAIL_TEMPLATE: &str = "Welcome!\n\n\
Thank you for registering. Please activate your account by visiting the link below:\n\n\
{activation_link}\n\n\
If you did not request this registration, you can safely ignore this email.\n";

#[derive(Debug, Clone)]
pub struct RegistrationConfig {
    /// Path fragment appended to the application base URI, e.g. `/activate`.
    pub account_activation_path: String,
    /// Validity window for issued tokens, in minutes.
    pub token_expiration_minutes: i64,
    pub mail_subject: String,
    /// Body template containing exactly one `{activation_link}` placeholder.
    pub mail_template: String,
}

impl RegistrationConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let account_activation_path = env::var("ACCOUNT_ACTIVATION_PATH")
            .map_err(|_| ConfigError::Missing("ACCOUNT_ACTIVATION_PATH"))?;

        let token_expiration_minutes = env::var("REGISTRATION_TOKEN_EXPIRATION_MINUTES")
            .unwrap_or_else(|_| DEFAULT_EXPIRATION_MINUTES.to_string())
            .parse::<i64>()
            .map_err(|e| {
                ConfigError::Invalid("REGISTRATION_TOKEN_EXPIRATION_MINUTES", e.to_string())
            })?;

        let mail_subject =
            env::var("REGISTRATION_MAIL_SUBJECT").unwrap_or_else(|_| DEFAULT_MAIL_SUBJECT.into());
        let mail_template = env::var("REGISTRATION_MAIL_TEMPLATE")
            .unwrap_or_else(|_| DEFAULT_MAIL_TEMPLATE.into());

        Self::new(
            account_activation_path,
            token_expiration_minutes,
            mail_subject,
            mail_template,
        )
    }

    pub fn new(
        account_activation_path: String,
        token_expiration_minutes: i64,
        mail_subject: String,
        mail_template: String,
    ) -> Result<Self, ConfigError> {
        if !account_activation_path.starts_with('/') {
            return Err(ConfigError::Invalid(
                "ACCOUNT_ACTIVATION_PATH",
                format!("must start with '/', got {account_activation_path:?}"),
            ));
        }

        if token_expiration_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "REGISTRATION_TOKEN_EXPIRATION_MINUTES",
                format!("must be positive, got {token_expiration_minutes}"),
            ));
        }

        if !mail_template.contains(ACTIVATION_LINK_PLACEHOLDER) {
            return Err(ConfigError::Invalid(
                "REGISTRATION_MAIL_TEMPLATE",
                format!("missing the {ACTIVATION_LINK_PLACEHOLDER} placeholder"),
            ));
        }

        Ok(Self {
            account_activation_path,
            token_expiration_minutes,
            mail_subject,
            mail_template,
        })
    }
}
