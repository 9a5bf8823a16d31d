//! enroll-web library - student enrollment wizard service
//!
//! Personal → Education → Course → Upload → Review → Finalize. Each stage
//! stores its form in a server-side session; finalize writes the six
//! enrollment tables in one transaction.

use axum::{extract::DefaultBodyLimit, Router};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod session;

use session::SessionStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// In-progress wizard sessions
    pub sessions: SessionStore,
    /// Directory accepted requirement documents are written to
    pub upload_dir: PathBuf,
    /// Request body cap, uploads included
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create new application state
    pub fn new(
        db: SqlitePool,
        sessions: SessionStore,
        upload_dir: PathBuf,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            db,
            sessions,
            upload_dir,
            max_upload_bytes,
        }
    }
}

/// Build application router
///
/// Wizard routes run behind the session middleware; `/health` does not.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let wizard = Router::new()
        .route("/", get(api::home))
        .route("/form", get(api::personal_form))
        .route("/submit", post(api::submit_personal))
        .route(
            "/educational",
            get(api::education_form).post(api::submit_education),
        )
        .route("/course", get(api::course_form).post(api::submit_course))
        .route("/upload", get(api::upload_form).post(api::submit_uploads))
        .route("/submission", get(api::review))
        .route("/finalize", post(api::finalize))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::session_middleware,
        ));

    Router::new()
        .merge(wizard)
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
