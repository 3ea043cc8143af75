//! agro-ui library interface
//!
//! Exposes the application state and router for the binary and for
//! integration tests.

pub mod api;
pub mod db;
pub mod error;
pub mod services;
pub mod session;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::{middleware, Router};
use chrono::{DateTime, Utc};
use services::{CertificateGenerator, FixedDiagnosisAnalyzer, LeafAnalyzer, VoiceRenderer};
use session::SessionStore;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Account database
    pub db: SqlitePool,
    /// Per-visitor page and login state
    pub sessions: SessionStore,
    pub analyzer: Arc<dyn LeafAnalyzer>,
    pub voice: VoiceRenderer,
    pub certificates: CertificateGenerator,
    /// Largest accepted multipart body for leaf uploads
    pub max_upload_bytes: usize,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, voice: VoiceRenderer, certificates: CertificateGenerator) -> Self {
        Self {
            db,
            sessions: SessionStore::new(Duration::from_secs(3600)),
            analyzer: Arc::new(FixedDiagnosisAnalyzer),
            voice,
            certificates,
            max_upload_bytes: 10 * 1024 * 1024,
            startup_time: Utc::now(),
        }
    }

    pub fn with_session_idle_timeout(mut self, timeout: Duration) -> Self {
        self.sessions = SessionStore::new(timeout);
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn LeafAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }
}

/// Build application router
///
/// Page routes run behind the session middleware; `/health` does not.
pub fn build_router(state: AppState) -> Router {
    let pages = api::ui_routes()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::session_middleware,
        ))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes));

    Router::new()
        .merge(pages)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
