//! UI routes - HTML pages for the AgroDetect web interface
//!
//! - **Home** (`home`): landing page with Login/Register links
//! - **Register** (`register`): account creation form
//! - **Login** (`login`): credential form
//! - **Scan** (`scan`): leaf upload/capture, analysis, voice and certificate
//!
//! Every handler first asks the session to move to its page and redirects to
//! wherever the session actually ends up when that differs.

use axum::{
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};

use crate::session::Page;
use crate::AppState;

pub mod layout;

mod home;
mod login;
mod register;
mod scan;

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home_page))
        .route("/back", get(home::back))
        .route("/register", get(register::register_page).post(register::submit_register))
        .route("/login", get(login::login_page).post(login::submit_login))
        .route("/logout", post(login::logout))
        .route("/scan", get(scan::scan_page))
        .route("/scan/analyze", post(scan::analyze))
        .route("/certificate", get(scan::download_certificate))
}

/// See-other redirect to a page's URL
pub(crate) fn redirect_to(page: Page) -> Response {
    Redirect::to(page.path()).into_response()
}
