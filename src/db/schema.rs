use crate::db::*;
use crate::error::{AppError, Result};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::Arc;

/// Database wrapper for thread-safe access.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::Internal(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.initialize_schema()?;
        Ok(db)
    }

    /// Open in-memory database (for testing).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Internal(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.initialize_schema()?;
        Ok(db)
    }

    /// Initialize database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            -- Users table
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                name TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );

            -- Sessions table
            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                expires_at INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            -- Books table
            CREATE TABLE IF NOT EXISTS books (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                genre TEXT,
                status TEXT NOT NULL DEFAULT 'To Read',
                cover_image TEXT,
                user_id TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_books_user ON books(user_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at);
            "#,
        )
        .map_err(|e| AppError::Internal(format!("Failed to initialize schema: {}", e)))?;

        Ok(())
    }

    // ========== USER OPERATIONS ==========

    /// Create a new user.
    pub fn create_user(&self, user: &User) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO users (id, email, password_hash, name, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id,
                user.email,
                user.password_hash,
                user.name,
                user.created_at,
            ],
        )
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint") {
                AppError::Conflict(format!("Email '{}' is already registered", user.email))
            } else {
                AppError::Internal(format!("Failed to create user: {}", e))
            }
        })?;
        Ok(())
    }

    /// Get user by email.
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, email, password_hash, name, created_at
             FROM users WHERE email = ?1",
            params![email],
            map_user,
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get user: {}", e)))
    }

    /// Get user by ID.
    pub fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, email, password_hash, name, created_at
             FROM users WHERE id = ?1",
            params![id],
            map_user,
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get user: {}", e)))
    }

    /// List all users.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, email, password_hash, name, created_at
                 FROM users ORDER BY email",
            )
            .map_err(|e| AppError::Internal(format!("Failed to prepare query: {}", e)))?;

        let users = stmt
            .query_map([], map_user)
            .map_err(|e| AppError::Internal(format!("Failed to list users: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(format!("Failed to collect users: {}", e)))?;

        Ok(users)
    }

    /// Update user password.
    pub fn update_user_password(&self, email: &str, password_hash: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn
            .execute(
                "UPDATE users SET password_hash = ?1 WHERE email = ?2",
                params![password_hash, email],
            )
            .map_err(|e| AppError::Internal(format!("Failed to update password: {}", e)))?;
        Ok(rows > 0)
    }

    /// Delete user.
    pub fn delete_user(&self, email: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn
            .execute("DELETE FROM users WHERE email = ?1", params![email])
            .map_err(|e| AppError::Internal(format!("Failed to delete user: {}", e)))?;
        Ok(rows > 0)
    }

    // ========== SESSION OPERATIONS ==========

    /// Create session.
    pub fn create_session(&self, session: &Session) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO sessions (token, user_id, expires_at)
             VALUES (?1, ?2, ?3)",
            params![session.token, session.user_id, session.expires_at],
        )
        .map_err(|e| AppError::Internal(format!("Failed to create session: {}", e)))?;
        Ok(())
    }

    /// Get session by token.
    pub fn get_session(&self, token: &str) -> Result<Option<Session>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT token, user_id, expires_at FROM sessions WHERE token = ?1",
            params![token],
            |row| {
                Ok(Session {
                    token: row.get(0)?,
                    user_id: row.get(1)?,
                    expires_at: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get session: {}", e)))
    }

    /// Delete session.
    pub fn delete_session(&self, token: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])
            .map_err(|e| AppError::Internal(format!("Failed to delete session: {}", e)))?;
        Ok(())
    }

    // ========== BOOK OPERATIONS ==========

    /// Create a new book.
    pub fn create_book(&self, book: &Book) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO books (id, title, author, genre, status, cover_image, user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                book.id,
                book.title,
                book.author,
                book.genre,
                book.status.as_str(),
                book.cover_image,
                book.user_id,
                book.created_at,
                book.updated_at,
            ],
        )
        .map_err(|e| AppError::Internal(format!("Failed to create book: {}", e)))?;
        Ok(())
    }

    /// Get a book by ID, scoped to its owner.
    ///
    /// Absent and foreign-owned records are both `None`.
    pub fn get_book(&self, id: &str, user_id: &str) -> Result<Option<Book>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, title, author, genre, status, cover_image, user_id, created_at, updated_at
             FROM books WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
            map_book,
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to get book: {}", e)))
    }

    /// List all books for a user, newest-created first.
    pub fn list_books(&self, user_id: &str) -> Result<Vec<Book>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, title, author, genre, status, cover_image, user_id, created_at, updated_at
                 FROM books WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
            )
            .map_err(|e| AppError::Internal(format!("Failed to prepare query: {}", e)))?;

        let books = stmt
            .query_map(params![user_id], map_book)
            .map_err(|e| AppError::Internal(format!("Failed to list books: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(format!("Failed to collect books: {}", e)))?;

        Ok(books)
    }

    /// Find a book by title and author (case-insensitive), scoped to a user.
    pub fn find_book_by_title_author(
        &self,
        user_id: &str,
        title: &str,
        author: &str,
    ) -> Result<Option<Book>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, title, author, genre, status, cover_image, user_id, created_at, updated_at
             FROM books
             WHERE user_id = ?1 AND lower(title) = lower(?2) AND lower(author) = lower(?3)",
            params![user_id, title, author],
            map_book,
        )
        .optional()
        .map_err(|e| AppError::Internal(format!("Failed to find book: {}", e)))
    }

    /// Update a book's mutable fields, scoped to its owner.
    pub fn update_book(&self, book: &Book) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn
            .execute(
                "UPDATE books
                 SET title = ?1, author = ?2, genre = ?3, status = ?4, cover_image = ?5, updated_at = ?6
                 WHERE id = ?7 AND user_id = ?8",
                params![
                    book.title,
                    book.author,
                    book.genre,
                    book.status.as_str(),
                    book.cover_image,
                    book.updated_at,
                    book.id,
                    book.user_id,
                ],
            )
            .map_err(|e| AppError::Internal(format!("Failed to update book: {}", e)))?;
        Ok(rows > 0)
    }

    /// Delete a book, scoped to its owner.
    pub fn delete_book(&self, id: &str, user_id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn
            .execute(
                "DELETE FROM books WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
            )
            .map_err(|e| AppError::Internal(format!("Failed to delete book: {}", e)))?;
        Ok(rows > 0)
    }
}

/// Map a row to a User.
fn map_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        name: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Map a row to a Book. Unknown stored status values fall back to the default.
fn map_book(row: &Row) -> rusqlite::Result<Book> {
    let status: String = row.get(4)?;
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        genre: row.get(3)?,
        status: ReadingStatus::parse(&status).unwrap_or_default(),
        cover_image: row.get(5)?,
        user_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
