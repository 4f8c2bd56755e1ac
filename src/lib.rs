//! shelf-rs: A self-hosted personal book tracker.
//!
//! This crate provides an HTTP server for maintaining a personal book
//! library: user accounts with session tokens, per-user book records with a
//! reading status, and optional cover images uploaded to a server-managed
//! directory.
//!
//! # Features
//!
//! - User registration and login with Argon2 password hashing
//! - Owner-scoped book CRUD over a stable JSON contract
//! - Cover uploads (multipart) with content sniffing and generated names
//! - Static serving of uploaded covers
//! - TOML configuration and a small management CLI

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Authentication and user management.
pub mod auth;
/// Configuration and CLI.
pub mod config;
/// Database operations.
pub mod db;
/// Error types.
pub mod error;
/// HTTP server.
pub mod server;
/// Cover upload storage.
pub mod uploads;


pub use config::{Cli, Command, Config};
pub use db::Database;
pub use error::{AppError, Result};
pub use server::AppState;
