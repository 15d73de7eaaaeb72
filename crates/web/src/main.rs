use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use grandmaster_core::GameController;

mod config;
mod routes;

use config::Args;

pub struct AppState {
    pub controller: Arc<GameController>,
}

pub fn app(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/new", post(routes::new_game))
        .route("/move", post(routes::make_move))
        .route("/hint", post(routes::hint))
        .route("/analyze", post(routes::analyze))
        .route("/health", get(routes::health))
        .route("/api/state", get(routes::api::state))
        .route("/api/new", post(routes::api::new_game))
        .route("/api/move", post(routes::api::make_move))
        .route("/api/moves", get(routes::api::legal_targets))
        .route("/api/hint", post(routes::api::hint))
        .route("/api/analyze", post(routes::api::analyze))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let controller = args.build_controller()?;
    let state = Arc::new(AppState { controller });

    let app = app(state, &args.static_dir);

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    info!("Server running at http://{}", args.bind);

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use grandmaster_core::{ControllerConfig, DisabledAdvisor, RandomMover};
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_app() -> (Router, Arc<GameController>) {
        let controller = GameController::new(
            Arc::new(RandomMover),
            Arc::new(DisabledAdvisor),
            ControllerConfig {
                opponent_delay: Duration::ZERO,
            },
        );
        let state = Arc::new(AppState {
            controller: Arc::clone(&controller),
        });
        (app(state, Path::new("static")), controller)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = test_app();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_initial_state() {
        let (app, _) = test_app();
        let response = app
            .oneshot(Request::get("/api/state").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "White to move.");
        assert_eq!(json["history"], serde_json::json!([]));
        assert_eq!(json["game_over"], false);
    }

    #[tokio::test]
    async fn test_move_then_opponent_replies() {
        let (app, controller) = test_app();
        let response = app
            .oneshot(post_json("/api/move", serde_json::json!({"from": "e2", "to": "e4"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["history"], serde_json::json!(["e4"]));
        assert_eq!(json["opponent_thinking"], true);

        controller.wait_for_opponent().await;
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.history.len(), 2);
        assert_eq!(snapshot.status, "White to move.");
    }

    #[tokio::test]
    async fn test_illegal_move_rejected() {
        let (app, controller) = test_app();
        let response = app
            .oneshot(post_json("/api/move", serde_json::json!({"from": "e2", "to": "e5"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("Illegal"));
        assert!(controller.snapshot().history.is_empty());
    }

    #[tokio::test]
    async fn test_bad_square_is_bad_request() {
        let (app, _) = test_app();
        let response = app
            .oneshot(Request::get("/api/moves?from=z9").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_legal_targets() {
        let (app, _) = test_app();
        let response = app
            .oneshot(Request::get("/api/moves?from=e2").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["targets"], serde_json::json!(["e3", "e4"]));
    }

    #[tokio::test]
    async fn test_analysis_before_game_over() {
        let (app, _) = test_app();
        let response = app
            .oneshot(Request::post("/api/analyze").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_hint_without_advisor() {
        let (app, _) = test_app();
        let response = app
            .oneshot(Request::post("/api/hint").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_new_game_as_black() {
        let (app, controller) = test_app();
        let response = app
            .oneshot(post_json(
                "/api/new",
                serde_json::json!({"difficulty": "easy", "side": "black"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["human_side"], "Black");
        assert_eq!(json["difficulty"], "Easy");
        assert_eq!(json["opponent_thinking"], true);

        controller.wait_for_opponent().await;
        assert_eq!(controller.snapshot().history.len(), 1);
    }

    #[tokio::test]
    async fn test_form_move_redirects() {
        let (app, controller) = test_app();
        let response = app
            .oneshot(
                Request::post("/move")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("from=g1&to=f3"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(controller.snapshot().history.to_sequence()[0], "Nf3");
    }

    #[tokio::test]
    async fn test_form_analysis_rejection_sets_notice() {
        let (app, controller) = test_app();
        let response = app
            .oneshot(Request::post("/analyze").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            controller.snapshot().notice.as_deref(),
            Some("Analysis is available once the game is over")
        );
    }

    #[tokio::test]
    async fn test_index_renders_board() {
        let (app, _) = test_app();
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("White to move."));
        assert!(html.contains("data-square=\"e2\""));
    }
}
