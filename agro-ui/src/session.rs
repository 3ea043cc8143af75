//! Per-visitor session state and page routing
//!
//! Each browser gets a [`Session`] keyed by a random id carried in the
//! `agro_session` cookie. The session tracks which of the four pages the
//! visitor is on and which account, if any, is logged in.

use agro_common::db::Account;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "agro_session";

/// The four screens of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Login,
    Register,
    Scan,
}

impl Page {
    /// URL that renders this page
    pub fn path(self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::Login => "/login",
            Page::Register => "/register",
            Page::Scan => "/scan",
        }
    }

    /// Transitions a visitor may request directly
    ///
    /// Re-entering the current page is handled by [`Session::navigate`].
    pub fn can_transition_to(self, target: Page) -> bool {
        matches!(
            (self, target),
            (Page::Home, Page::Login)
                | (Page::Home, Page::Register)
                | (Page::Register, Page::Login)
                | (Page::Register, Page::Home)
                | (Page::Login, Page::Scan)
                | (Page::Login, Page::Home)
        )
    }
}

/// One-shot message shown on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct Session {
    pub page: Page,
    pub account: Option<Account>,
    pub flash: Option<Notice>,
    /// Certificate produced by the most recent analysis
    pub last_certificate: Option<PathBuf>,
    last_seen: Instant,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            page: Page::Home,
            account: None,
            flash: None,
            last_certificate: None,
            last_seen: Instant::now(),
        }
    }

    /// Request a move to `target` and return the page the visitor ends up on
    ///
    /// Asking for the scan page without a logged-in account lands on login.
    /// Disallowed transitions leave the session where it was.
    pub fn navigate(&mut self, target: Page) -> Page {
        if target == Page::Scan && self.account.is_none() {
            self.page = Page::Login;
            return self.page;
        }

        if self.page == target || self.page.can_transition_to(target) {
            self.page = target;
        } else {
            debug!(from = ?self.page, to = ?target, "Ignoring page transition");
        }
        self.page
    }

    /// Record a successful login and move to the scan page
    pub fn log_in(&mut self, account: Account) -> Page {
        self.account = Some(account);
        self.navigate(Page::Scan)
    }

    /// Forget the account and return home
    pub fn log_out(&mut self) -> Page {
        self.account = None;
        self.last_certificate = None;
        self.flash = None;
        self.page = Page::Home;
        self.page
    }

    pub fn take_flash(&mut self) -> Option<Notice> {
        self.flash.take()
    }
}

/// In-memory session map shared by all handlers
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Start a fresh session, pruning idle ones first
    pub async fn create(&self) -> Uuid {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let timeout = self.idle_timeout;
        sessions.retain(|_, s| s.last_seen.elapsed() <= timeout);
        if sessions.len() < before {
            debug!("Pruned {} idle sessions", before - sessions.len());
        }

        let id = Uuid::new_v4();
        sessions.insert(id, Session::new());
        id
    }

    /// Mark a session as active; false if it does not exist or has expired
    pub async fn touch(&self, id: Uuid) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(&id) else {
            return false;
        };

        if session.last_seen.elapsed() <= self.idle_timeout {
            session.last_seen = Instant::now();
            return true;
        }

        sessions.remove(&id);
        false
    }

    /// Snapshot of a session
    pub async fn get(&self, id: Uuid) -> Option<Session> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Mutate a session in place
    pub async fn update<F, R>(&self, id: Uuid, f: F) -> Option<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        self.sessions.write().await.get_mut(&id).map(f)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Extract the session id from a `Cookie` header value
pub fn parse_session_cookie(header: &str) -> Option<Uuid> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value issuing `id`
pub fn session_cookie(id: Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account {
            identifier: "555".to_string(),
            display_name: "Asha".to_string(),
        }
    }

    #[test]
    fn test_new_session_is_home_without_account() {
        let session = Session::new();
        assert_eq!(session.page, Page::Home);
        assert!(session.account.is_none());
    }

    #[test]
    fn test_scan_without_account_redirects_to_login() {
        let mut session = Session::new();
        assert_eq!(session.navigate(Page::Scan), Page::Login);

        let mut session = Session::new();
        session.navigate(Page::Register);
        assert_eq!(session.navigate(Page::Scan), Page::Login);
    }

    #[test]
    fn test_registration_flow() {
        let mut session = Session::new();
        assert_eq!(session.navigate(Page::Register), Page::Register);
        assert_eq!(session.navigate(Page::Login), Page::Login);
        assert_eq!(session.log_in(account()), Page::Scan);
        assert_eq!(session.account, Some(account()));
    }

    #[test]
    fn test_back_to_home() {
        let mut session = Session::new();
        session.navigate(Page::Login);
        assert_eq!(session.navigate(Page::Home), Page::Home);
        session.navigate(Page::Register);
        assert_eq!(session.navigate(Page::Home), Page::Home);
    }

    #[test]
    fn test_disallowed_transitions_stay_put() {
        let mut session = Session::new();
        session.navigate(Page::Login);
        assert_eq!(session.navigate(Page::Register), Page::Login);

        session.log_in(account());
        assert_eq!(session.navigate(Page::Home), Page::Scan);
        assert_eq!(session.navigate(Page::Register), Page::Scan);
        assert_eq!(session.navigate(Page::Scan), Page::Scan);
    }

    #[test]
    fn test_log_out_clears_account() {
        let mut session = Session::new();
        session.navigate(Page::Login);
        session.log_in(account());
        session.last_certificate = Some(PathBuf::from("/tmp/x.pdf"));

        assert_eq!(session.log_out(), Page::Home);
        assert!(session.account.is_none());
        assert!(session.last_certificate.is_none());
        assert_eq!(session.navigate(Page::Scan), Page::Login);
    }

    #[test]
    fn test_flash_is_one_shot() {
        let mut session = Session::new();
        session.flash = Some(Notice::Success("Registration successful".into()));
        assert!(session.take_flash().is_some());
        assert!(session.take_flash().is_none());
    }

    #[test]
    fn test_parse_session_cookie() {
        let id = Uuid::new_v4();
        let header = format!("theme=dark; {}={}; other=1", SESSION_COOKIE, id);
        assert_eq!(parse_session_cookie(&header), Some(id));
        assert_eq!(parse_session_cookie("agro_session=not-a-uuid"), None);
        assert_eq!(parse_session_cookie("theme=dark"), None);
        assert!(session_cookie(id).starts_with(&format!("agro_session={}", id)));
    }

    #[tokio::test]
    async fn test_store_create_update_touch() {
        let store = SessionStore::new(Duration::from_secs(60));
        assert!(store.is_empty().await);

        let id = store.create().await;
        assert!(store.touch(id).await);
        assert!(!store.touch(Uuid::new_v4()).await);

        let page = store.update(id, |s| s.navigate(Page::Register)).await;
        assert_eq!(page, Some(Page::Register));
        assert_eq!(store.get(id).await.unwrap().page, Page::Register);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let store = SessionStore::new(Duration::ZERO);
        let id = store.create().await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(!store.touch(id).await);
        assert!(store.get(id).await.is_none());

        store.create().await;
        assert_eq!(store.len().await, 1);
    }
}
