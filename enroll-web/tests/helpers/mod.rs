//! Test helpers for enroll-web integration tests
//!
//! - `TestApp`: router over an in-memory database and a temporary upload
//!   directory, with a cookie jar holding one browser session
//! - Form and multipart request builders

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use enroll_common::db::init_database;
use enroll_web::session::{session_id_from_headers, SessionId, SessionStore, SESSION_COOKIE};
use enroll_web::{build_router, AppState};
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

pub const BOUNDARY: &str = "----enrolltestboundary";

/// One simulated browser talking to a fresh application
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub upload_dir: Arc<TempDir>,
    cookie: Option<String>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_body_limit(10 * 1024 * 1024).await
    }

    pub async fn with_body_limit(max_upload_bytes: usize) -> Self {
        let db = init_database("sqlite::memory:")
            .await
            .expect("Should create in-memory database");
        let upload_dir = tempfile::tempdir().expect("Should create upload dir");
        let sessions = SessionStore::new(Duration::from_secs(3600));
        let state = AppState::new(
            db,
            sessions,
            upload_dir.path().to_path_buf(),
            max_upload_bytes,
        );

        Self {
            router: build_router(state.clone()),
            state,
            upload_dir: Arc::new(upload_dir),
            cookie: None,
        }
    }

    /// Another browser (empty cookie jar) on the same application
    pub fn new_browser(&self) -> Self {
        Self {
            router: self.router.clone(),
            state: self.state.clone(),
            upload_dir: Arc::clone(&self.upload_dir),
            cookie: None,
        }
    }

    pub fn db(&self) -> &SqlitePool {
        &self.state.db
    }

    pub fn upload_path(&self) -> &Path {
        self.upload_dir.path()
    }

    /// Session id currently held in the cookie jar
    pub fn session(&self) -> Option<SessionId> {
        let cookie = self.cookie.as_ref()?;
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(header::COOKIE, cookie.parse().ok()?);
        session_id_from_headers(&headers)
    }

    /// Send a request, attaching and updating the session cookie
    pub async fn send(&mut self, builder: axum::http::request::Builder, body: Body) -> Response<Body> {
        let builder = match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        };
        let request = builder.body(body).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .to_string();
            assert!(pair.starts_with(SESSION_COOKIE));
            self.cookie = Some(pair);
        }

        response
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        self.send(Request::builder().method("GET").uri(uri), Body::empty())
            .await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, form_encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded"),
            Body::from(body),
        )
        .await
    }

    /// POST multipart files as `(field, filename, bytes)`
    pub async fn post_files(&mut self, uri: &str, files: &[(&str, &str, &[u8])]) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                ),
            Body::from(multipart_body(files)),
        )
        .await
    }

    pub async fn submit_personal(&mut self, last: &str, first: &str) -> Response<Body> {
        self.post_form(
            "/submit",
            &[
                ("first_name", first),
                ("last_name", last),
                ("middle_name", "Santos"),
                ("email", "student@example.com"),
                ("lrn", "123456789012"),
                ("guardian_name", "Maria"),
            ],
        )
        .await
    }

    /// Walk through every stage up to the review page
    pub async fn complete_wizard(&mut self) {
        let response = self.submit_personal("Cruz", "Ana").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = self
            .post_form("/educational", &[("first_gen", "yes"), ("highschool", "Rizal HS")])
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = self
            .post_form(
                "/course",
                &[("id_number", "BSIT"), ("year_level", "1"), ("enroll", "New"), ("student", "Regular")],
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = self.post_files("/upload", &valid_files()).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/submission");
    }

    pub async fn row_count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(self.db())
            .await
            .unwrap()
    }
}

/// The three documents for Ana Cruz, correctly named
pub fn valid_files() -> [(&'static str, &'static str, &'static [u8]); 3] {
    [
        ("medical_certificate", "Cruz_Ana_Medical.pdf", &b"%PDF-1.4 medical"[..]),
        ("grades", "Cruz_Ana_Grades.pdf", &b"%PDF-1.4 grades"[..]),
        ("org_fee", "Cruz_Ana_OrgFee.png", &b"\x89PNG receipt"[..]),
    ]
}

pub fn multipart_body(files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, filename, data) in files {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Minimal `application/x-www-form-urlencoded` value encoding
fn form_encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            b' ' => "+".to_string(),
            _ => format!("%{:02X}", b),
        })
        .collect()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect should carry a Location header")
        .to_str()
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Body should be UTF-8")
}
