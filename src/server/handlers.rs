//! HTTP request handlers.

use crate::db::{self, Book, ReadingStatus, User};
use crate::error::{AppError, Result};
use crate::server::AppState;
use axum::{
    Json,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{HeaderMap, StatusCode, header},
};
use serde::{Deserialize, Serialize};

/// Simple `{"message": ...}` response body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// AUTH API
// ============================================================================

/// Register request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    email: String,
    password: String,
    name: String,
}

/// Register response.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    user: User,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    token: String,
    user: User,
}

/// Create a new account.
pub async fn auth_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let user = state.auth.register(&req.email, &req.password, &req.name)?;

    tracing::info!(user_id = %user.id, "Registered user");
    Ok((StatusCode::CREATED, Json(RegisterResponse { user })))
}

/// Exchange credentials for a session token.
pub async fn auth_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (user, token) = state.auth.login(&req.email, &req.password)?;
    Ok(Json(LoginResponse { token, user }))
}

/// Drop the session for the presented token, if any.
pub async fn auth_logout(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode> {
    if let Some(token) = extract_token(&headers) {
        state.auth.logout(&token)?;
    }
    Ok(StatusCode::OK)
}

/// Get current user info.
pub async fn auth_me(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<User>> {
    let user = get_authenticated_user(&state, &headers).await?;
    Ok(Json(user))
}

// ============================================================================
// BOOKS API
// ============================================================================

/// List all books of the caller, newest-created first.
pub async fn books_list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Book>>> {
    let user = get_authenticated_user(&state, &headers).await?;
    let books = state.db.list_books(&user.id)?;
    Ok(Json(books))
}

/// Fetch a single book.
pub async fn books_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Book>> {
    let user = get_authenticated_user(&state, &headers).await?;
    let book = state.db.get_book(&id, &user.id)?.ok_or(AppError::NotFound)?;
    Ok(Json(book))
}

/// Add a book.
pub async fn books_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
) -> Result<(StatusCode, Json<Book>)> {
    let user = get_authenticated_user(&state, &headers).await?;
    let payload = read_book_payload(request).await?;

    let title = required_field(payload.title, "Title and author are required")?;
    let author = required_field(payload.author, "Title and author are required")?;

    // Duplicate entries per owner are rejected, not just advised against.
    if state
        .db
        .find_book_by_title_author(&user.id, &title, &author)?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Book is already in your library".to_string(),
        ));
    }

    // Omitted or unrecognized status falls back to the default.
    let status = payload
        .status
        .as_deref()
        .and_then(ReadingStatus::parse)
        .unwrap_or_default();

    let cover_image = resolve_cover(&state, payload.cover_file, payload.cover_image)?;

    let now = db::now_timestamp();
    let book = Book {
        id: uuid::Uuid::new_v4().to_string(),
        title,
        author,
        genre: payload
            .genre
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty()),
        status,
        cover_image,
        user_id: user.id,
        created_at: now,
        updated_at: now,
    };

    state.db.create_book(&book)?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update book details. Fields absent from the request keep their prior value.
pub async fn books_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    request: Request,
) -> Result<Json<Book>> {
    let user = get_authenticated_user(&state, &headers).await?;
    let payload = read_book_payload(request).await?;

    let mut book = state.db.get_book(&id, &user.id)?.ok_or(AppError::NotFound)?;

    if let Some(title) = payload.title {
        book.title = required_field(Some(title), "Title cannot be blank")?;
    }
    if let Some(author) = payload.author {
        book.author = required_field(Some(author), "Author cannot be blank")?;
    }
    if let Some(genre) = payload.genre {
        // An explicit empty value clears the genre.
        let genre = genre.trim().to_string();
        book.genre = if genre.is_empty() { None } else { Some(genre) };
    }
    if let Some(status) = payload.status {
        book.status = ReadingStatus::parse(&status)
            .ok_or_else(|| AppError::Validation(format!("Invalid status: {}", status)))?;
    }

    // Renaming onto another owned entry would create a duplicate.
    if let Some(existing) = state
        .db
        .find_book_by_title_author(&user.id, &book.title, &book.author)?
        && existing.id != book.id
    {
        return Err(AppError::Conflict(
            "Book is already in your library".to_string(),
        ));
    }

    if let Some(cover) = resolve_cover(&state, payload.cover_file, payload.cover_image)? {
        book.cover_image = Some(cover);
    }

    book.updated_at = db::now_timestamp();

    if !state.db.update_book(&book)? {
        return Err(AppError::NotFound);
    }

    Ok(Json(book))
}

/// Delete a book.
pub async fn books_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let user = get_authenticated_user(&state, &headers).await?;

    if !state.db.delete_book(&id, &user.id)? {
        return Err(AppError::NotFound);
    }

    Ok(Json(MessageResponse::new("Book deleted")))
}

// ============================================================================
// REQUEST PARSING
// ============================================================================

/// Book fields as they arrive on the wire, multipart or JSON.
///
/// Every field is optional here; create/update decide what is required.
#[derive(Debug, Default)]
struct BookPayload {
    title: Option<String>,
    author: Option<String>,
    genre: Option<String>,
    status: Option<String>,
    cover_image: Option<String>,
    cover_file: Option<Vec<u8>>,
}

/// JSON request body for create/update.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct BookBody {
    title: Option<String>,
    author: Option<String>,
    genre: Option<String>,
    status: Option<String>,
    cover_image: Option<String>,
}

/// Parse the request body as multipart form data when declared as such,
/// plain JSON otherwise.
async fn read_book_payload(request: Request) -> Result<BookPayload> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    if is_multipart {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?;
        read_multipart(multipart).await
    } else {
        let Json(body) = Json::<BookBody>::from_request(request, &())
            .await
            .map_err(|_| AppError::Validation("Invalid request body".to_string()))?;

        Ok(BookPayload {
            title: body.title,
            author: body.author,
            genre: body.genre,
            status: body.status,
            cover_image: body.cover_image,
            cover_file: None,
        })
    }
}

/// Collect known multipart fields; unknown ones are ignored.
///
/// The `coverImage` field is a file when it carries a filename, an ordinary
/// URL string otherwise. Only the bytes are kept; the client filename plays
/// no part in storage.
async fn read_multipart(mut multipart: Multipart) -> Result<BookPayload> {
    let mut payload = BookPayload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "title" => payload.title = Some(field_text(field).await?),
            "author" => payload.author = Some(field_text(field).await?),
            "genre" => payload.genre = Some(field_text(field).await?),
            "status" => payload.status = Some(field_text(field).await?),
            "coverImage" => {
                if field.file_name().is_some() {
                    let bytes = field.bytes().await.map_err(|e| {
                        AppError::Upload(format!("Failed to read upload: {}", e))
                    })?;
                    payload.cover_file = Some(bytes.to_vec());
                } else {
                    payload.cover_image = Some(field_text(field).await?);
                }
            }
            _ => {}
        }
    }

    Ok(payload)
}

/// Read a multipart field as text.
async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart field: {}", e)))
}

/// Trim a required text field, rejecting absent or blank values.
fn required_field(value: Option<String>, message: &str) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::Validation(message.to_string())),
    }
}

/// Resolve the cover reference for a request.
///
/// An uploaded file wins over a `coverImage` URL string; blank strings count
/// as absent.
fn resolve_cover(
    state: &AppState,
    cover_file: Option<Vec<u8>>,
    cover_image: Option<String>,
) -> Result<Option<String>> {
    if let Some(bytes) = cover_file {
        return Ok(Some(state.uploads.store_cover(&bytes)?));
    }

    Ok(cover_image.filter(|s| !s.trim().is_empty()))
}

// ============================================================================
// HELPERS
// ============================================================================

/// Extract token from Authorization header.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// Get authenticated user from token.
///
/// Missing, unknown and expired tokens all fail the same way.
async fn get_authenticated_user(state: &AppState, headers: &HeaderMap) -> Result<User> {
    let token = extract_token(headers).ok_or(AppError::Unauthorized)?;

    state
        .auth
        .validate_token(&token)?
        .ok_or(AppError::Unauthorized)
}
