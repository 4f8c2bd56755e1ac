//! HTTP server and routes.

mod handlers;
mod state;

pub use state::AppState;

use crate::uploads;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth_register))
        .route("/login", post(handlers::auth_login))
        .route("/logout", post(handlers::auth_logout))
        .route("/me", get(handlers::auth_me));

    let book_routes = Router::new()
        .route("/", get(handlers::books_list))
        .route("/", post(handlers::books_create))
        .route("/{id}", get(handlers::books_get))
        .route("/{id}", put(handlers::books_update))
        .route("/{id}", delete(handlers::books_delete));

    Router::new()
        .nest("/auth", auth_routes)
        .nest("/books", book_routes)
        .nest_service(
            uploads::PUBLIC_PREFIX,
            ServeDir::new(state.uploads.dir().to_path_buf()),
        )
        .layer(DefaultBodyLimit::max(state.config.uploads.max_upload_bytes()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
