use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    api::AppState,
    session::{SessionId, SESSION_COOKIE},
};

/// Value of cookie `name`, if the request carries it
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Resolves the visitor's session from the signed cookie.
///
/// A missing, malformed or forged cookie starts a new session and sets a
/// fresh cookie on the response. New sessions are only stored once a
/// handler changes them. The session id is stored in the request
/// extensions as [`SessionId`].
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let verified = cookie_value(request.headers(), SESSION_COOKIE)
        .and_then(|value| state.signer.verify(value));

    let (session_id, is_new) = match verified {
        Some(id) => (id, false),
        None => (Uuid::new_v4(), true),
    };

    if !is_new {
        state.sessions.touch(SessionId(session_id)).await;
    }
    request.extensions_mut().insert(SessionId(session_id));

    let mut response = next.run(request).await;

    if is_new {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE,
            state.signer.sign(&session_id)
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Invalid session cookie header"),
        }
    }

    response
}
