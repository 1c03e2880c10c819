//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One page route (`/index.html`, with `/` redirecting to it), the session
//! API behind the name prompt, read-only collection snapshots, the
//! websocket feed, and static assets under `/static`.

pub mod collections;
pub mod landing;
pub mod session;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub const LANDING_PATH: &str = "/index.html";

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let assets = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/", get(redirect_to_landing))
        .route(LANDING_PATH, get(landing::index))
        .route(
            "/api/session",
            get(session::show).post(session::submit).delete(session::remove),
        )
        .route("/api/session/cancel", post(session::cancel))
        .route("/api/rooms", get(collections::list_rooms))
        .route("/api/messages", get(collections::list_messages))
        .route("/api/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .nest_service("/static", assets)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn redirect_to_landing() -> Redirect {
    Redirect::temporary(LANDING_PATH)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_helpers;
    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::ServiceExt;

    #[tokio::test]
    async fn root_redirects_to_landing() {
        let app = app(test_helpers::test_app_state());
        let res = app
            .oneshot(Request::get("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(res.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()), Some(LANDING_PATH));
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let app = app(test_helpers::test_app_state());
        let res = app
            .oneshot(Request::get("/healthz").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let app = app(test_helpers::test_app_state());
        let res = app
            .oneshot(Request::get("/landing").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
