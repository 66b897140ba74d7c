use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single-use activation credential tied to one user. The `token` value is
/// opaque; `expires_at` is stored as RFC 3339 text.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RegistrationToken {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires_at: String,
    pub created_at: Option<String>,
}

impl RegistrationToken {
    /// Whether the token is past its expiration window. A row with an
    /// unparseable timestamp is treated as expired rather than live forever.
    pub fn is_expired(&self) -> bool {
        match DateTime::parse_from_rfc3339(&self.expires_at) {
            Ok(expires_at) => expires_at < Utc::now(),
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token_expiring_at(expires_at: String) -> RegistrationToken {
        RegistrationToken {
            id: 1,
            user_id: 1,
            token: "abc".to_string(),
            expires_at,
            created_at: None,
        }
    }

    #[test]
    fn future_expiry_is_not_expired() {
        let token = token_expiring_at((Utc::now() + Duration::minutes(30)).to_rfc3339());
        assert!(!token.is_expired());
    }

    #[test]
    fn past_expiry_is_expired() {
        let token = token_expiring_at((Utc::now() - Duration::minutes(1)).to_rfc3339());
        assert!(token.is_expired());
    }

    #[test]
    fn garbage_timestamp_counts_as_expired() {
        let token = token_expiring_at("not-a-timestamp".to_string());
        assert!(token.is_expired());
    }
}
