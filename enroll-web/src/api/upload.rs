//! Requirement upload stage
//!
//! Accepts the three requirement documents in one multipart submission.
//! Every field is validated before anything touches the disk: the first
//! offending field (in form order) rejects the whole batch and nothing is
//! written. Accepted files are stored in the upload directory under their
//! sanitized names, overwriting same-named files.

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use enroll_common::upload::{validate_upload, ALLOWED_EXTENSIONS};
use enroll_common::{DocumentKind, PersonalData, StageKey, StageRecord, UploadedDocumentSet};
use std::collections::HashMap;
use tracing::{debug, info};

use super::error::ApiResult;
use super::ui::UPLOAD_HTML;
use crate::session::SessionId;
use crate::AppState;

/// One multipart file field as received
struct ReceivedFile {
    filename: Option<String>,
    data: Bytes,
}

/// Personal data with both names, or `None` if the first stage is incomplete
async fn personal_with_identity(state: &AppState, session: SessionId) -> Option<PersonalData> {
    match state.sessions.get(session, StageKey::Personal).await {
        Some(StageRecord::Personal(personal)) if personal.identity().is_some() => Some(personal),
        _ => None,
    }
}

/// GET /upload
pub async fn upload_form(State(state): State<AppState>, session: SessionId) -> Response {
    if personal_with_identity(&state, session).await.is_none() {
        return Redirect::to("/form").into_response();
    }
    Html(UPLOAD_HTML).into_response()
}

/// POST /upload
pub async fn submit_uploads(
    State(state): State<AppState>,
    session: SessionId,
    mut multipart: Multipart,
) -> ApiResult<Response> {
    let Some(personal) = personal_with_identity(&state, session).await else {
        info!("Upload attempted before personal details; redirecting to /form");
        return Ok(Redirect::to("/form").into_response());
    };
    let Some((last_name, first_name)) = personal.identity() else {
        return Ok(Redirect::to("/form").into_response());
    };

    let mut received: HashMap<DocumentKind, ReceivedFile> = HashMap::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(kind) = field.name().and_then(DocumentKind::from_field) else {
            continue;
        };
        let filename = field.file_name().map(str::to_string);
        let data = field.bytes().await?;
        received.insert(kind, ReceivedFile { filename, data });
    }

    let mut accepted = Vec::with_capacity(DocumentKind::ALL.len());
    for kind in DocumentKind::ALL {
        let file = received.remove(&kind);
        let expected_prefix = kind.expected_prefix(last_name, first_name);
        let filename = validate_upload(
            kind,
            file.as_ref().and_then(|f| f.filename.as_deref()),
            &expected_prefix,
            &ALLOWED_EXTENSIONS,
        )?;
        let data = file.map(|f| f.data).unwrap_or_default();
        accepted.push((kind, filename, data));
    }

    tokio::fs::create_dir_all(&state.upload_dir).await?;

    let mut documents = UploadedDocumentSet::new();
    for (kind, filename, data) in accepted {
        let path = state.upload_dir.join(&filename);
        tokio::fs::write(&path, &data).await?;
        debug!("Saved {} ({} bytes) to {}", kind, data.len(), path.display());
        documents.insert(kind, filename);
    }

    state.sessions.put(session, StageRecord::Uploads(documents)).await;
    Ok(Redirect::to("/submission").into_response())
}
