use crate::config::{ConfigError, RegistrationConfig};
use crate::context::RequestContext;
use crate::models::{RegistrationToken, User};
use crate::repositories::token_repository::RegistrationTokenRepository;
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use crate::services::email_service::{EmailError, EmailService};
use crate::services::mail_template::{self, TemplateError};
use chrono::{Duration, Utc};
use rand::Rng;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Failed to decode activation URI: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("Mail delivery failed: {0}")]
    MailDelivery(#[from] EmailError),
    #[error("Token not found or expired")]
    TokenNotFound,
    #[error("User not found")]
    UserNotFound,
    #[error("Persistence error: {0}")]
    Persistence(#[from] RepositoryError),
}

impl From<ConfigError> for RegistrationError {
    fn from(err: ConfigError) -> Self {
        RegistrationError::Configuration(err.to_string())
    }
}

impl From<TemplateError> for RegistrationError {
    fn from(err: TemplateError) -> Self {
        RegistrationError::Configuration(err.to_string())
    }
}

/// Issues time-limited registration tokens, mails the activation link and
/// removes tokens once activation completes.
pub struct RegistrationService {
    config: RegistrationConfig,
    tokens: Arc<dyn RegistrationTokenRepository>,
    users: Arc<dyn UserRepository>,
    email_service: Box<dyn EmailService>,
}

impl RegistrationService {
    pub fn new(
        config: RegistrationConfig,
        tokens: Arc<dyn RegistrationTokenRepository>,
        users: Arc<dyn UserRepository>,
        email_service: Box<dyn EmailService>,
    ) -> Self {
        Self {
            config,
            tokens,
            users,
            email_service,
        }
    }

    fn generate_token() -> String {
        let mut rng = rand::thread_rng();
        let bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
        hex::encode(bytes)
    }

    /// Issues a token for the user and mails them the activation link built
    /// against the request's base URI. Nothing is handed to the mail
    /// collaborator unless token issuance, URI construction and template
    /// rendering all succeed.
    pub async fn send_registration_activation_mail(
        &self,
        ctx: &RequestContext,
        user: &User,
    ) -> Result<(), RegistrationError> {
        let token = self.get_valid_token_for_user(user.id).await?;

        let activation_uri = self.build_activation_uri(ctx, &token.token);
        let decoded_uri = urlencoding::decode(&activation_uri)?;

        let body = mail_template::render_activation_body(&self.config.mail_template, &decoded_uri)?;

        tracing::debug!("Created activation URI for user {}: {}", user.id, activation_uri);

        self.email_service
            .send_activation_mail(&user.email, &self.config.mail_subject, &body)
            .await?;

        tracing::info!("Activation mail sent to {}", user.email);

        Ok(())
    }

    /// Returns the user's token, reusing an unexpired one and replacing an
    /// expired one, so at most one active token exists per user.
    pub async fn get_valid_token_for_user(
        &self,
        user_id: i64,
    ) -> Result<RegistrationToken, RegistrationError> {
        if let Some(existing) = self.tokens.find_by_user(user_id).await? {
            if !existing.is_expired() {
                return Ok(existing);
            }
            self.tokens.delete(&existing.token).await?;
        }

        let token = Self::generate_token();
        let expires_at =
            (Utc::now() + Duration::minutes(self.config.token_expiration_minutes)).to_rfc3339();

        Ok(self.tokens.insert(user_id, &token, &expires_at).await?)
    }

    fn build_activation_uri(&self, ctx: &RequestContext, token: &str) -> String {
        format!(
            "{}{}?token={}",
            ctx.base_uri(),
            self.config.account_activation_path,
            token
        )
    }

    /// Looks up a token by value. Expired rows are removed on discovery and
    /// reported as not found.
    pub async fn find_valid_token(
        &self,
        token_value: &str,
    ) -> Result<RegistrationToken, RegistrationError> {
        let token = self
            .tokens
            .find_by_token(token_value)
            .await?
            .ok_or(RegistrationError::TokenNotFound)?;

        if token.is_expired() {
            self.tokens.delete(&token.token).await?;
            return Err(RegistrationError::TokenNotFound);
        }

        Ok(token)
    }

    /// Validates the token, marks the owning user's email verified and
    /// deletes the token.
    pub async fn activate(&self, token_value: &str) -> Result<User, RegistrationError> {
        let token = self.find_valid_token(token_value).await?;

        let user = self
            .users
            .find_by_id(token.user_id)
            .await?
            .ok_or(RegistrationError::UserNotFound)?;

        self.users.verify_email(user.id).await?;
        self.delete_token_after_activation(&token).await?;

        tracing::info!("Account activated for {}", user.email);

        Ok(User {
            email_verified: true,
            ..user
        })
    }

    /// Deletes the token record. Performs no expiration or ownership check:
    /// callers must only invoke this after the account has been activated,
    /// and are responsible for any authorization.
    pub async fn delete_token_after_activation(
        &self,
        token: &RegistrationToken,
    ) -> Result<(), RegistrationError> {
        self.tokens.delete(&token.token).await?;
        tracing::trace!("Registration token for user {} deleted", token.user_id);
        Ok(())
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RegistrationError> {
        Ok(self.users.find_by_email(email).await?)
    }

    /// Creates an unverified user row. Loses a concurrent create race
    /// gracefully by returning the row the winner inserted.
    pub async fn create_user(&self, email: &str) -> Result<User, RegistrationError> {
        match self.users.create_user(email).await {
            Ok(user) => Ok(user),
            Err(RepositoryError::AlreadyExists) => self
                .users
                .find_by_email(email)
                .await?
                .ok_or(RegistrationError::UserNotFound),
            Err(e) => Err(e.into()),
        }
    }
}
