//! Enrollment finalize stage
//!
//! Persists the accumulated wizard in one transaction and clears the
//! session. Without all four stages nothing is written and the browser is
//! sent back to the landing page.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use enroll_common::db::persist_enrollment;
use tracing::info;

use super::error::ApiResult;
use super::ui::SUCCESS_HTML;
use crate::session::SessionId;
use crate::AppState;

/// POST /finalize
pub async fn finalize(State(state): State<AppState>, session: SessionId) -> ApiResult<Response> {
    let wizard = state.sessions.snapshot(session).await;

    // A missing stage maps to a redirect home in ApiError
    let enrollment = wizard.require_complete()?;

    let student_id = persist_enrollment(&state.db, enrollment).await?;
    state.sessions.clear(session).await;

    info!("Enrollment finalized: StudentId {}", student_id);
    Ok(Html(SUCCESS_HTML).into_response())
}
