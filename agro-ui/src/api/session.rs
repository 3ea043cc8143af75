//! Session cookie middleware
//!
//! Attaches a [`SessionId`] to every page request, issuing a new session and
//! cookie when the request carries none or an expired one.

use axum::{
    extract::{Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::session::{parse_session_cookie, session_cookie, Session};
use crate::AppState;

/// Session id of the current request, set by [`session_middleware`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Run `f` against this request's session
    pub async fn with<F, R>(self, state: &AppState, f: F) -> ApiResult<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        state
            .sessions
            .update(self.0, f)
            .await
            .ok_or(ApiError::SessionExpired)
    }
}

pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(parse_session_cookie);

    let resumed = match presented {
        Some(id) => state.sessions.touch(id).await.then_some(id),
        None => None,
    };

    let (id, issued) = match resumed {
        Some(id) => (id, false),
        None => {
            let id = state.sessions.create().await;
            debug!(session = %id, "Issued new session");
            (id, true)
        }
    };

    request.extensions_mut().insert(SessionId(id));
    let mut response = next.run(request).await;

    if issued {
        if let Ok(value) = HeaderValue::from_str(&session_cookie(id)) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    response
}
