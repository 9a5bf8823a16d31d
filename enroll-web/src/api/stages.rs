//! Form stage handlers for the first three wizard pages
//!
//! Each handler stores its form verbatim in the session and redirects to
//! the next page. Stages may be visited in any order.

use axum::{extract::State, response::Redirect, Form};
use enroll_common::{CourseSelection, EducationRecord, PersonalData, StageRecord};

use crate::session::SessionId;
use crate::AppState;

/// POST /submit
pub async fn submit_personal(
    State(state): State<AppState>,
    session: SessionId,
    Form(data): Form<PersonalData>,
) -> Redirect {
    state.sessions.put(session, StageRecord::Personal(data)).await;
    Redirect::to("/educational")
}

/// POST /educational
pub async fn submit_education(
    State(state): State<AppState>,
    session: SessionId,
    Form(data): Form<EducationRecord>,
) -> Redirect {
    state.sessions.put(session, StageRecord::Education(data)).await;
    Redirect::to("/course")
}

/// POST /course
pub async fn submit_course(
    State(state): State<AppState>,
    session: SessionId,
    Form(data): Form<CourseSelection>,
) -> Redirect {
    state.sessions.put(session, StageRecord::Course(data)).await;
    Redirect::to("/upload")
}
