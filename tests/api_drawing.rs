//! HTTP-level tests for the drawing endpoint.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use rasterhub_api::app::{build_app, build_state};
use rasterhub_core::config::AppConfig;
use rasterhub_database::memory::{MemorySessionStore, MemorySnapshotStore};
use rasterhub_database::provider::StoreProvider;

fn app() -> Router {
    let config = AppConfig::default();
    let sessions = MemorySessionStore::new();
    let snapshots = MemorySnapshotStore::new(&sessions);
    let stores = StoreProvider::from_stores(
        std::sync::Arc::new(snapshots),
        std::sync::Arc::new(sessions),
    );
    let cors = config.server.cors.clone();
    let state = build_state(config, stores).unwrap();
    build_app(state, &cors)
}

fn drawing_request(token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/drawing")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header("x-session-token", token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn initial_canvas_mints_session_cookie() {
    let app = app();
    let response = app
        .oneshot(drawing_request(None, json!({"tool": "get_initial_canvas"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("fresh session must set a cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("rasterhub_session="));

    let body = body_json(response).await;
    assert!(
        body["image_data_url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,")
    );
    assert_eq!(body["can_undo"], json!(false));
    assert_eq!(body["can_redo"], json!(false));
    assert_eq!(body["message"], json!("Initial canvas loaded."));
}

#[tokio::test]
async fn brush_stroke_enables_undo() {
    let app = app();
    let body = json!({
        "tool": "brush_stroke",
        "path": [[10.0, 10.0], [40.0, 40.0], [60.0, 20.0]],
        "color": "FF0000",
        "size": 3
    });
    let response = app
        .oneshot(drawing_request(Some("tok-http"), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers().get(header::SET_COOKIE).is_none(),
        "existing token must not be re-issued"
    );
    let body = body_json(response).await;
    assert_eq!(body["can_undo"], json!(true));
    assert_eq!(body["can_redo"], json!(false));
    assert_eq!(body["message"], json!("Operation 'brush_stroke' applied."));
}

#[tokio::test]
async fn unknown_tool_is_rejected() {
    let app = app();
    let response = app
        .oneshot(drawing_request(Some("tok-http"), json!({"tool": "spray"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], json!("UNKNOWN_TOOL"));
    assert!(body.get("image_data_url").is_none());
}

#[tokio::test]
async fn missing_parameters_are_rejected() {
    let app = app();
    let response = app
        .oneshot(drawing_request(
            Some("tok-http"),
            json!({"tool": "line", "x1": 0, "y1": 0}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], json!("VALIDATION_ERROR"));
}

#[tokio::test]
async fn undo_and_new_canvas_round_trip() {
    let app = app();

    let draw = json!({
        "tool": "rectangle",
        "x1": 5, "y1": 5, "x2": 50, "y2": 40,
        "conRelleno": true, "colorRelleno": "00FF00"
    });
    let response = app
        .clone()
        .oneshot(drawing_request(Some("tok-rt"), draw))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(drawing_request(Some("tok-rt"), json!({"tool": "undo"})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["message"], json!("Undo applied."));
    assert_eq!(body["can_redo"], json!(true));

    let response = app
        .clone()
        .oneshot(drawing_request(Some("tok-rt"), json!({"tool": "undo"})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["message"], json!("No further actions to undo."));

    let response = app
        .oneshot(drawing_request(
            Some("tok-rt"),
            json!({"tool": "new_canvas", "width": 320, "height": 200}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        json!("New canvas created and history reset.")
    );
    assert_eq!(body["can_undo"], json!(false));
    assert_eq!(body["can_redo"], json!(false));
}

#[tokio::test]
async fn health_reports_store_status() {
    let app = app();
    let request = Request::builder()
        .method("GET")
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["store"], json!("connected"));
}
