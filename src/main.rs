use enroll::{
    config::RegistrationConfig,
    db, handlers,
    repositories::{SqliteRegistrationTokenRepository, SqliteUserRepository},
    services::{create_email_service, RegistrationService},
    AppState,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "enroll=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let pool = db::create_pool().await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Fail fast on a bad registration configuration
    let config = RegistrationConfig::from_env()?;

    // Initialize repositories and services
    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let token_repository = Arc::new(SqliteRegistrationTokenRepository::new(pool.clone()));
    let email_service = create_email_service();

    let registration_service = Arc::new(RegistrationService::new(
        config,
        token_repository,
        user_repository,
        email_service,
    ));

    let app_state = AppState {
        registration_service,
        pool,
    };

    let app = handlers::router(app_state).layer(TraceLayer::new_for_http());

    // Start server
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()?;

    let addr = SocketAddr::from((host.parse::<std::net::IpAddr>()?, port));

    tracing::info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
