pub mod backups;
#[cfg(test)]
pub mod test_helpers;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use subtle::ConstantTimeEq;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let mut api = Router::new()
        .route("/api/backups/list", axum::routing::get(backups::list_backups))
        .route(
            "/api/backups/create",
            axum::routing::post(backups::create_backup),
        )
        .route(
            "/api/backups/{name}",
            axum::routing::get(backups::fetch_backup).delete(backups::delete_backup),
        );

    // Token auth is optional: an empty token leaves the API open, matching
    // deployments where the reverse proxy handles sessions.
    if !state.inner.config.token.is_empty() {
        api = api.layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));
    }

    // Health endpoint is unauthenticated
    let public = Router::new().route("/health", axum::routing::get(health));

    public
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn auth_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let expected = state.inner.config.token.as_bytes();

    let provided = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    if provided.as_bytes().ct_eq(expected).into() {
        next.run(req).await
    } else {
        (StatusCode::UNAUTHORIZED, "invalid or missing token").into_response()
    }
}
