use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use crate::config::ServerSection;
use crate::state::AppState;

/// Create a wired-up router and AppState backed by a temp directory.
pub fn setup_app(token: &str, max_backups: usize) -> (Router, AppState, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("create tempdir");

    let config = ServerSection {
        data_dir: tmp.path().to_string_lossy().into_owned(),
        token: token.to_string(),
        max_backups,
        ..Default::default()
    };

    let state = AppState::new(config);
    let router = super::router(state.clone());
    (router, state, tmp)
}

/// Send a request without authentication.
pub async fn request(
    router: Router,
    method: &str,
    path: &str,
    body: Option<String>,
) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(path);
    let body = match body {
        Some(raw) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(raw)
        }
        None => Body::empty(),
    };
    router.oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// Send a request with a bearer token.
pub async fn request_with_token(
    router: Router,
    method: &str,
    path: &str,
    body: Option<String>,
    token: &str,
) -> axum::response::Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header("Authorization", format!("Bearer {token}"));
    let body = match body {
        Some(raw) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(raw)
        }
        None => Body::empty(),
    };
    router.oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// Read full response body into `Vec<u8>`.
pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("collect body")
        .to_vec()
}

/// Assert response has expected status.
pub fn assert_status(response: &axum::response::Response, expected: StatusCode) {
    assert_eq!(
        response.status(),
        expected,
        "expected {expected}, got {}",
        response.status()
    );
}
