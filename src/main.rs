//! shelf-rs server entry point.

use clap::Parser;
use shelf_rs::{
    auth::AuthService,
    config::{Cli, Command, Config, UserCommand},
    db::Database,
    server,
    uploads::UploadStore,
};
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Find or load config
    let config_path = cli.config.clone().or_else(Config::find_config_file);

    let config = if let Some(ref path) = config_path {
        Config::load(path)?
    } else {
        Config::default()
    };

    // Handle command
    match cli.command {
        Some(Command::Init { force }) => cmd_init(force).await,
        Some(Command::User { action }) => cmd_user(action, &config).await,
        Some(Command::Serve { bind }) => cmd_serve(config, bind).await,
        None => {
            // Default: start server
            cmd_serve(config, None).await
        }
    }
}

/// Initialize config and database.
async fn cmd_init(force: bool) -> anyhow::Result<()> {
    let config_path = PathBuf::from("config.toml");

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    // Write default config
    std::fs::write(&config_path, Config::generate_default())?;
    println!("Created config file: {}", config_path.display());

    // Initialize database and upload directory
    let config = Config::default();
    let _db = Database::open(&config.database.path)?;
    println!("Initialized database: {}", config.database.path.display());

    std::fs::create_dir_all(&config.uploads.dir)?;
    println!("Created upload directory: {}", config.uploads.dir.display());

    println!("\nEdit config.toml to configure your server.");
    println!("Then run: shelf-rs user add <email> --name <name> --password <password>");

    Ok(())
}

/// User management commands.
async fn cmd_user(action: UserCommand, config: &Config) -> anyhow::Result<()> {
    let db = Database::open(&config.database.path)?;
    let auth = AuthService::new(
        db,
        config.auth.session_days,
        config.auth.registration_enabled(),
    );

    match action {
        UserCommand::Add {
            email,
            name,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password("Password: ")?,
            };

            let user = auth.create_user(&email, &password, &name)?;
            println!("Created user: {} ({}, id: {})", user.email, user.name, user.id);
        }

        UserCommand::Del { email } => {
            if auth.delete_user(&email)? {
                println!("Deleted user: {}", email);
            } else {
                println!("User not found: {}", email);
            }
        }

        UserCommand::List => {
            let users = auth.list_users()?;
            if users.is_empty() {
                println!("No users found.");
            } else {
                println!("{:<30} {:<20} {:<36} CREATED", "EMAIL", "NAME", "ID");
                println!("{}", "-".repeat(100));
                for user in users {
                    let created = chrono::DateTime::from_timestamp(user.created_at, 0)
                        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    println!(
                        "{:<30} {:<20} {:<36} {}",
                        user.email, user.name, user.id, created
                    );
                }
            }
        }

        UserCommand::Passwd { email, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password("New password: ")?,
            };

            if auth.change_password(&email, &password)? {
                println!("Password changed for: {}", email);
            } else {
                println!("User not found: {}", email);
            }
        }
    }

    Ok(())
}

/// Start the server.
async fn cmd_serve(mut config: Config, bind: Option<std::net::SocketAddr>) -> anyhow::Result<()> {
    // Override bind address if specified
    if let Some(addr) = bind {
        config.server.bind = addr;
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelf_rs=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Open database
    let db = Database::open(&config.database.path)?;

    // Create auth service and upload store
    let auth = AuthService::new(
        db.clone(),
        config.auth.session_days,
        config.auth.registration_enabled(),
    );
    let uploads = UploadStore::new(config.uploads.dir.clone())?;

    tracing::info!(
        bind = %config.server.bind,
        database = %config.database.path.display(),
        uploads = %config.uploads.dir.display(),
        "Starting shelf-rs server"
    );

    // Create application state and router
    let state = server::AppState::new(config.clone(), db, auth, uploads);
    let app = server::create_router(state);

    let listener = TcpListener::bind(config.server.bind).await?;
    tracing::info!(address = %config.server.bind, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Prompt for password input.
fn prompt_password(prompt: &str) -> anyhow::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut password = String::new();
    io::stdin().read_line(&mut password)?;

    Ok(password.trim().to_string())
}
