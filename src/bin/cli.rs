use clap::{Parser, Subcommand};
use enroll::{
    config::RegistrationConfig,
    context::RequestContext,
    db,
    repositories::{
        token_repository::RegistrationTokenRepository, SqliteRegistrationTokenRepository,
        SqliteUserRepository, UserRepository,
    },
    services::{create_email_service, RegistrationService},
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "enroll-cli")]
#[command(about = "CLI tool for managing enroll users and tokens", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Registration token commands
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,
    },

    /// Mark a user's email as verified
    Verify {
        /// Email address of the user to verify
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum TokenCommands {
    /// Issue a registration token and send the activation mail
    Issue {
        /// Email address of the user
        #[arg(short, long)]
        email: String,

        /// Application base URI used to build the activation link
        #[arg(short, long)]
        base_uri: String,
    },

    /// Delete all expired registration tokens
    PurgeExpired,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Connect to database
    let pool = db::create_pool().await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let token_repository = Arc::new(SqliteRegistrationTokenRepository::new(pool.clone()));

    // Parse CLI arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Create { email } => {
                let user = user_repository.create_user(&email).await?;
                println!("Created user {} ({})", user.email, user.id);
            }
            UserCommands::Verify { email } => {
                let user = user_repository
                    .find_by_email(&email)
                    .await?
                    .ok_or(format!("No user with email {email}"))?;
                user_repository.verify_email(user.id).await?;
                println!("Marked {} as verified", email);
            }
        },
        Commands::Token { command } => match command {
            TokenCommands::Issue { email, base_uri } => {
                let config = RegistrationConfig::from_env()?;
                let email_service = create_email_service();
                let service = RegistrationService::new(
                    config,
                    token_repository,
                    user_repository.clone(),
                    email_service,
                );

                let ctx = RequestContext::new(&base_uri)?;
                let user = service
                    .find_user_by_email(&email)
                    .await?
                    .ok_or(format!("No user with email {email}"))?;

                service.send_registration_activation_mail(&ctx, &user).await?;
                println!("Activation mail sent to {}", email);
            }
            TokenCommands::PurgeExpired => {
                let now = chrono::Utc::now().to_rfc3339();
                let purged = token_repository.delete_expired(&now).await?;
                println!("Purged {} expired token(s)", purged);
            }
        },
    }

    Ok(())
}
