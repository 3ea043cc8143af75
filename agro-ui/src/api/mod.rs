//! HTTP handlers for agro-ui

pub mod health;
pub mod session;
pub mod ui;

pub use health::health_routes;
pub use session::{session_middleware, SessionId};
pub use ui::ui_routes;
