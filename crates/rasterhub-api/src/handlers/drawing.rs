//! The drawing endpoint.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::dto::request::EditRequest;
use crate::dto::response::EditResponse;
use crate::error::ApiError;
use crate::extractors::session::{SESSION_COOKIE, SessionToken};
use crate::state::AppState;

/// POST /api/drawing
///
/// Runs one edit command and returns the canvas the session now points
/// at. A freshly minted session token is handed back via `Set-Cookie`.
pub async fn dispatch_edit(
    State(state): State<AppState>,
    token: SessionToken,
    Json(request): Json<EditRequest>,
) -> Result<Response, ApiError> {
    debug!(tool = %request.tool, minted = token.minted, "Drawing request");

    let command = request.into_command()?;
    let outcome = state.dispatcher.dispatch(&token.value, command).await?;

    let mut response = Json(EditResponse::from(outcome)).into_response();
    if token.minted {
        let cookie = format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            token.value
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(SET_COOKIE, value);
        }
    }
    Ok(response)
}
