//! Security tests for enroll-web
//!
//! Tests security-critical features:
//! - Request body cap on uploads (resource exhaustion)
//! - Client filenames cannot escape the upload directory
//! - Session cookie attributes and id handling

mod helpers;

use axum::http::{header, StatusCode};
use enroll_web::session::DEFAULT_PENDING_LIMIT;
use helpers::{location, TestApp};

// =============================================================================
// Body Size Limit Tests
// =============================================================================

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let mut app = TestApp::with_body_limit(1024).await;
    app.submit_personal("Cruz", "Ana").await;

    let big = vec![0u8; 64 * 1024];
    let response = app
        .post_files(
            "/upload",
            &[
                ("medical_certificate", "Cruz_Ana_Medical.pdf", big.as_slice()),
                ("grades", "Cruz_Ana_Grades.pdf", &b"pdf"[..]),
                ("org_fee", "Cruz_Ana_OrgFee.pdf", &b"pdf"[..]),
            ],
        )
        .await;

    assert!(
        response.status().is_client_error(),
        "expected 4xx, got {}",
        response.status()
    );
    assert_eq!(std::fs::read_dir(app.upload_path()).unwrap().count(), 0);

    let wizard = app.state.sessions.snapshot(app.session().unwrap()).await;
    assert!(wizard.uploads.is_none());
}

#[tokio::test]
async fn test_upload_within_limit_accepted() {
    let mut app = TestApp::with_body_limit(64 * 1024).await;
    app.submit_personal("Cruz", "Ana").await;

    let response = app.post_files("/upload", &helpers::valid_files()).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/submission");
}

// =============================================================================
// Path Traversal Tests
// =============================================================================

#[tokio::test]
async fn test_directory_components_are_stripped() {
    let mut app = TestApp::new().await;
    app.submit_personal("Cruz", "Ana").await;

    let response = app
        .post_files(
            "/upload",
            &[
                ("medical_certificate", "../../Cruz_Ana_Medical.pdf", &b"pdf"[..]),
                ("grades", "..\\Cruz_Ana_Grades.pdf", &b"pdf"[..]),
                ("org_fee", "/etc/Cruz_Ana_OrgFee.pdf", &b"pdf"[..]),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let mut stored: Vec<String> = std::fs::read_dir(app.upload_path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    stored.sort();
    assert_eq!(
        stored,
        ["Cruz_Ana_Grades.pdf", "Cruz_Ana_Medical.pdf", "Cruz_Ana_OrgFee.pdf"]
    );
}

// =============================================================================
// Session Cookie Tests
// =============================================================================

#[tokio::test]
async fn test_session_cookie_is_http_only() {
    let mut app = TestApp::new().await;

    let response = app.get("/").await;
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("first visit should set a cookie")
        .to_str()
        .unwrap();

    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
}

#[tokio::test]
async fn test_health_does_not_create_sessions() {
    let mut app = TestApp::new().await;

    let response = app.get("/health").await;
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(app.state.sessions.is_empty().await);
}

#[tokio::test]
async fn test_cookieless_requests_do_not_grow_session_store() {
    let app = TestApp::new().await;

    for _ in 0..500 {
        let mut browser = app.new_browser();
        let response = browser.post_form("/finalize", &[]).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        browser.get("/").await;
    }

    assert!(app.state.sessions.is_empty().await);
    assert!(app.state.sessions.pending_len().await <= DEFAULT_PENDING_LIMIT);
}

#[tokio::test]
async fn test_forged_session_id_gets_fresh_session() {
    let mut victim = TestApp::new().await;
    victim.submit_personal("Cruz", "Ana").await;
    let victim_session = victim.session().unwrap();

    // A guessed id that the server never issued
    let forged = "00000000-0000-4000-8000-000000000000";
    let mut attacker = victim.new_browser();
    let response = attacker
        .send(
            axum::http::Request::builder()
                .method("GET")
                .uri("/submission")
                .header(header::COOKIE, format!("enroll_session={}", forged)),
            axum::body::Body::empty(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = helpers::body_text(response).await;
    assert!(!body.contains("Cruz"), "attacker must not see another session");

    let reissued = attacker.session().expect("a fresh cookie should be issued");
    assert_ne!(reissued.to_string(), forged);
    assert_ne!(reissued, victim_session);
}

#[tokio::test]
async fn test_stolen_session_id_is_shared() {
    // The cookie is the only credential; documenting that a copied id
    // reaches the same wizard state
    let mut owner = TestApp::new().await;
    owner.submit_personal("Cruz", "Ana").await;
    let id = owner.session().unwrap();

    let mut copy = owner.new_browser();
    let body = helpers::body_text(
        copy.send(
            axum::http::Request::builder()
                .method("GET")
                .uri("/submission")
                .header(header::COOKIE, format!("enroll_session={}", id)),
            axum::body::Body::empty(),
        )
        .await,
    )
    .await;
    assert!(body.contains("<dd>Cruz</dd>"));
}
