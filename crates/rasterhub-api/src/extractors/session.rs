//! `SessionToken` extractor — identifies the browser session making the request.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "rasterhub_session";
/// Header alternative for non-browser clients.
pub const SESSION_HEADER: &str = "x-session-token";

/// The session token for this request.
///
/// Read from the `rasterhub_session` cookie or the `x-session-token`
/// header. When neither is present a fresh token is minted and the
/// handler is expected to hand it back via `Set-Cookie`.
#[derive(Debug, Clone)]
pub struct SessionToken {
    /// Opaque session identifier.
    pub value: String,
    /// Whether this request minted the token.
    pub minted: bool,
}

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(value) = header_token(parts).or_else(|| cookie_token(parts)) {
            return Ok(Self {
                value,
                minted: false,
            });
        }
        Ok(Self {
            value: Uuid::new_v4().to_string(),
            minted: true,
        })
    }
}

fn header_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn cookie_token(parts: &Parts) -> Option<String> {
    let cookies = parts.headers.get("cookie")?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}
