pub mod test_helpers {
    use crate::services::email_service::{EmailError, EmailService};
    use async_trait::async_trait;
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use std::sync::{Arc, Mutex};
    use tempfile::NamedTempFile;

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing
    /// Useful when you need to test features that don't work with in-memory databases
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let database_url = format!("sqlite://{}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok((pool, temp_file))
    }

    /// Insert a test user
    pub async fn insert_test_user(
        pool: &SqlitePool,
        email: &str,
        verified: bool,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO users (email, email_verified) VALUES (?, ?)")
            .bind(email)
            .bind(verified)
            .execute(pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    #[derive(Debug, Clone)]
    pub struct SentMail {
        pub to: String,
        pub subject: String,
        pub body: String,
    }

    /// Email collaborator that records every send instead of delivering,
    /// or fails every send when constructed with `failing()`.
    #[derive(Default)]
    pub struct RecordingEmailService {
        sent: Arc<Mutex<Vec<SentMail>>>,
        fail: bool,
    }

    impl RecordingEmailService {
        pub fn failing() -> Self {
            Self {
                sent: Arc::default(),
                fail: true,
            }
        }

        /// Handle to the recorded mail, usable after the service has been
        /// boxed and moved into the service under test.
        pub fn sent_mails(&self) -> Arc<Mutex<Vec<SentMail>>> {
            self.sent.clone()
        }
    }

    #[async_trait]
    impl EmailService for RecordingEmailService {
        async fn send_activation_mail(
            &self,
            to_email: &str,
            subject: &str,
            body: &str,
        ) -> Result<(), EmailError> {
            if self.fail {
                return Err(EmailError::SendFailed("transport unavailable".to_string()));
            }

            self.sent.lock().unwrap().push(SentMail {
                to: to_email.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });

            Ok(())
        }
    }
}
