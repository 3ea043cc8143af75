//! Registration page

use axum::{
    extract::{Extension, State},
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::info;

use super::layout::{render_page, NavItem};
use super::redirect_to;
use crate::api::SessionId;
use crate::db;
use crate::error::ApiResult;
use crate::session::{Notice, Page};
use crate::AppState;

/// Registration form; every field may be empty
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub password: String,
}

/// GET /register
pub async fn register_page(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> ApiResult<Response> {
    let page = session.with(&state, |s| s.navigate(Page::Register)).await?;
    if page != Page::Register {
        return Ok(redirect_to(page));
    }

    let body = r#"
    <div class="box">
        <h3>Create Account</h3>
        <form method="post" action="/register">
            <label for="name">Full Name</label>
            <input type="text" id="name" name="name">
            <label for="mobile">Mobile Number</label>
            <input type="text" id="mobile" name="mobile">
            <label for="password">Password</label>
            <input type="password" id="password" name="password">
            <button type="submit">Register</button>
        </form>
        <a href="/back" class="button">⬅ Back</a>
    </div>
"#;

    Ok(render_page("Register", NavItem::None, body).into_response())
}

/// POST /register
///
/// Writes (or overwrites) the account, then continues to login.
pub async fn submit_register(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<RegisterForm>,
) -> ApiResult<Response> {
    let page = session.with(&state, |s| s.navigate(Page::Register)).await?;
    if page != Page::Register {
        return Ok(redirect_to(page));
    }

    db::register(&state.db, &form.mobile, &form.name, &form.password).await?;
    info!(identifier = %form.mobile, "Registration completed");

    let page = session
        .with(&state, |s| {
            s.flash = Some(Notice::Success("Registration successful".to_string()));
            s.navigate(Page::Login)
        })
        .await?;

    Ok(redirect_to(page))
}
