//! Login page and logout

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::layout::{render_notice, render_page, NavItem};
use super::redirect_to;
use crate::api::SessionId;
use crate::db;
use crate::error::ApiResult;
use crate::session::{Notice, Page};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub password: String,
}

fn login_body(notice: Option<&Notice>) -> String {
    format!(
        r#"
    <div class="box">
        <h3>Login</h3>
        {notice}
        <form method="post" action="/login">
            <label for="mobile">Mobile Number</label>
            <input type="text" id="mobile" name="mobile">
            <label for="password">Password</label>
            <input type="password" id="password" name="password">
            <button type="submit">Login</button>
        </form>
        <a href="/back" class="button">⬅ Back</a>
    </div>
"#,
        notice = notice.map(render_notice).unwrap_or_default(),
    )
}

/// GET /login
pub async fn login_page(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> ApiResult<Response> {
    let (page, flash) = session
        .with(&state, |s| (s.navigate(Page::Login), s.take_flash()))
        .await?;
    if page != Page::Login {
        return Ok(redirect_to(page));
    }

    Ok(render_page("Login", NavItem::None, &login_body(flash.as_ref())).into_response())
}

/// POST /login
///
/// A mismatch keeps the visitor on the login page with an inline error.
pub async fn submit_login(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    let page = session.with(&state, |s| s.navigate(Page::Login)).await?;
    if page != Page::Login {
        return Ok(redirect_to(page));
    }

    match db::authenticate(&state.db, &form.mobile, &form.password).await {
        Ok(account) => {
            info!(identifier = %account.identifier, "Login succeeded");
            let page = session.with(&state, |s| s.log_in(account)).await?;
            Ok(redirect_to(page))
        }
        Err(agro_common::Error::InvalidCredentials) => {
            warn!(identifier = %form.mobile, "Login failed: invalid credentials");
            let notice = Notice::Error("Invalid credentials".to_string());
            let html = render_page("Login", NavItem::None, &login_body(Some(&notice)));
            Ok((StatusCode::UNAUTHORIZED, html).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> ApiResult<Response> {
    let page = session.with(&state, |s| s.log_out()).await?;
    Ok(redirect_to(page))
}
