mod schema;

pub use schema::Database;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// User account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: String,
    /// Email address (unique, stored lowercase).
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Display name.
    pub name: String,
    /// Account creation timestamp.
    pub created_at: i64,
}

/// Authentication session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Session token.
    pub token: String,
    /// User ID.
    pub user_id: String,
    /// Expiration timestamp.
    pub expires_at: i64,
}

/// Reading status of a book, declared by the user.
///
/// Flat three-state enum: any status may change to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReadingStatus {
    /// Not started yet.
    #[default]
    #[serde(rename = "To Read")]
    ToRead,
    /// Currently reading.
    #[serde(rename = "Reading")]
    Reading,
    /// Finished.
    #[serde(rename = "Read")]
    Read,
}

impl ReadingStatus {
    /// Wire representation, matching the JSON enum values.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::ToRead => "To Read",
            ReadingStatus::Reading => "Reading",
            ReadingStatus::Read => "Read",
        }
    }

    /// Parse a wire value; `None` for anything unrecognized.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "To Read" => Some(ReadingStatus::ToRead),
            "Reading" => Some(ReadingStatus::Reading),
            "Read" => Some(ReadingStatus::Read),
            _ => None,
        }
    }
}

/// A tracked book, owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique book ID.
    pub id: String,
    /// Book title.
    pub title: String,
    /// Book author.
    pub author: String,
    /// Genre (optional).
    pub genre: Option<String>,
    /// Reading status.
    pub status: ReadingStatus,
    /// Cover reference: absolute URL or `/uploads/<name>` path.
    pub cover_image: Option<String>,
    /// Owning user ID. Immutable after creation.
    pub user_id: String,
    /// Creation timestamp.
    pub created_at: i64,
    /// Last update timestamp.
    pub updated_at: i64,
}

/// Timestamp helper.
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_status_round_trip() {
        for status in [
            ReadingStatus::ToRead,
            ReadingStatus::Reading,
            ReadingStatus::Read,
        ] {
            assert_eq!(ReadingStatus::parse(status.as_str()), Some(status));
        }

        assert_eq!(ReadingStatus::parse("reading"), None);
        assert_eq!(ReadingStatus::parse(""), None);
        assert_eq!(ReadingStatus::default(), ReadingStatus::ToRead);
    }

    #[test]
    fn book_serializes_camel_case() {
        let book = Book {
            id: "b-1".to_string(),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            genre: None,
            status: ReadingStatus::ToRead,
            cover_image: Some("/uploads/x.png".to_string()),
            user_id: "u-1".to_string(),
            created_at: 0,
            updated_at: 0,
        };

        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["coverImage"], "/uploads/x.png");
        assert_eq!(json["userId"], "u-1");
        assert_eq!(json["status"], "To Read");
    }
}
