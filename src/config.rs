use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Personal book tracker server.
#[derive(Parser, Debug, Clone)]
#[command(name = "shelf-rs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file.
    #[arg(short, long, env = "SHELF_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the server (default if no command given).
    Serve {
        /// Address to bind the server to.
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// User management commands.
    User {
        /// User subcommand action.
        #[command(subcommand)]
        action: UserCommand,
    },

    /// Initialize database and create default config.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}

/// User management subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum UserCommand {
    /// Add a new user.
    Add {
        /// Email address.
        email: String,
        /// Display name.
        #[arg(short, long)]
        name: String,
        /// Password (will prompt if not provided).
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Delete a user.
    Del {
        /// Email of the user to delete.
        email: String,
    },

    /// List all users.
    List,

    /// Change user password.
    Passwd {
        /// Email address.
        email: String,
        /// New password (will prompt if not provided).
        #[arg(short, long)]
        password: Option<String>,
    },
}

/// Main configuration from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Cover upload configuration.
    #[serde(default)]
    pub uploads: UploadsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::new(
        std::net::IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        5000,
    )
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/shelf.db")
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Registration mode: "open", "disabled".
    #[serde(default = "default_registration")]
    pub registration: String,

    /// Session token duration in days.
    #[serde(default = "default_session_days")]
    pub session_days: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            registration: default_registration(),
            session_days: default_session_days(),
        }
    }
}

fn default_registration() -> String {
    "open".to_string()
}

fn default_session_days() -> u32 {
    30
}

impl AuthConfig {
    /// Check if registration is enabled.
    pub fn registration_enabled(&self) -> bool {
        self.registration == "open"
    }
}

/// Cover upload configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    /// Directory uploaded covers are stored in.
    #[serde(default = "default_uploads_dir")]
    pub dir: PathBuf,

    /// Maximum request body size in megabytes.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: default_uploads_dir(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("data/uploads")
}

fn default_max_upload_mb() -> usize {
    8
}

impl UploadsConfig {
    /// Maximum request body size in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

impl Config {
    /// Load configuration from file.
    pub fn load(path: &PathBuf) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to parse config file: {}", e))
        })
    }

    /// Find config file in default locations.
    pub fn find_config_file() -> Option<PathBuf> {
        let candidates = [
            PathBuf::from("config.toml"),
            PathBuf::from("shelf-rs.toml"),
            dirs::config_dir()
                .map(|p| p.join("shelf-rs").join("config.toml"))
                .unwrap_or_default(),
            PathBuf::from("/etc/shelf-rs/config.toml"),
        ];

        candidates.into_iter().find(|p| p.exists())
    }

    /// Generate default config file content.
    pub fn generate_default() -> String {
        r#"# shelf-rs configuration

[server]
bind = "0.0.0.0:5000"

[database]
# path = "/var/lib/shelf-rs/shelf.db"

[auth]
# Registration mode: "open" or "disabled"
registration = "open"
# Session duration in days
session_days = 30

[uploads]
# dir = "/var/lib/shelf-rs/uploads"
# Maximum request body size in megabytes
max_upload_mb = 8
"#
        .to_string()
    }
}
