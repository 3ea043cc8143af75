//! Home page

use axum::{
    extract::{Extension, State},
    response::{IntoResponse, Response},
};

use super::layout::{render_page, NavItem};
use super::redirect_to;
use crate::api::SessionId;
use crate::error::ApiResult;
use crate::session::Page;
use crate::AppState;

/// GET /
pub async fn home_page(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> ApiResult<Response> {
    let page = session.with(&state, |s| s.navigate(Page::Home)).await?;
    if page != Page::Home {
        return Ok(redirect_to(page));
    }

    let body = r#"
    <div class="hero">
        <h1>AI-Powered Plant Disease Classification Engine</h1>
        <p>Detect crop diseases instantly with voice guidance.</p>
    </div>
    <a href="/login" class="button">🔐 Login</a>
    <a href="/register" class="button">📝 Register</a>
"#;

    Ok(render_page("Home", NavItem::Home, body).into_response())
}

/// GET /back
///
/// Back button on the login and register forms.
pub async fn back(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> ApiResult<Response> {
    let page = session.with(&state, |s| s.navigate(Page::Home)).await?;
    Ok(redirect_to(page))
}
