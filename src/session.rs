//! Server-side session storage.
//!
//! A session is created on successful login and addressed by an opaque random
//! id carried in an HTTP-only cookie. Sessions have a fixed lifetime counted
//! from creation; they are never refreshed by activity.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::http::{header, HeaderMap, HeaderValue};
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::config::SessionConfig;

/// User id stored in the session for the configured admin account.
pub const ADMIN_USER_ID: &str = "admin";

const SESSION_ID_LEN: usize = 48;

/// Identity attached to a logged-in client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: String,
    pub is_admin: bool,
    pub is_library_card: bool,
}

impl Session {
    pub fn admin() -> Self {
        Self { user_id: ADMIN_USER_ID.to_string(), is_admin: true, is_library_card: false }
    }

    pub fn user(user_id: impl Into<String>, is_admin: bool) -> Self {
        Self { user_id: user_id.into(), is_admin, is_library_card: false }
    }

    pub fn library_card(application_id: impl Into<String>) -> Self {
        Self { user_id: application_id.into(), is_admin: false, is_library_card: true }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    session: Session,
    expires_at: Instant,
}

/// In-memory session map shared by all handlers.
#[derive(Clone)]
pub struct SessionStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    ttl: Duration,
    cookie_name: String,
    secure_cookie: bool,
}

impl SessionStore {
    pub fn new(cfg: &SessionConfig) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::from_secs(cfg.ttl_secs),
            cookie_name: cfg.cookie_name.clone(),
            secure_cookie: cfg.secure_cookie,
        }
    }

    /// Stores `session` under a fresh id and returns the id.
    pub async fn create(&self, session: Session) -> String {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_ID_LEN)
            .map(char::from)
            .collect();
        let entry = Entry { session, expires_at: Instant::now() + self.ttl };
        self.entries.write().await.insert(id.clone(), entry);
        id
    }

    /// Returns the live session for `id`. Expired entries are dropped on access.
    pub async fn get(&self, id: &str) -> Option<Session> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(id) {
                Some(entry) if entry.expires_at > now => return Some(entry.session.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        self.entries.write().await.remove(id);
        None
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.entries.write().await.remove(id).is_some()
    }

    /// Removes every expired session and returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Reads this store's session id from the request `Cookie` header(s).
    pub fn session_id_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, value)| value.trim_matches('"').to_string())
            .filter(|value| !value.is_empty())
    }

    /// `Set-Cookie` value that hands `id` to the client.
    pub fn session_cookie(&self, id: &str) -> HeaderValue {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.cookie_name,
            id,
            self.ttl.as_secs()
        );
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static("invalid=; Max-Age=0"))
    }

    /// `Set-Cookie` value that makes the client drop its session cookie.
    pub fn expired_cookie(&self) -> HeaderValue {
        let cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", self.cookie_name);
        HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static("invalid=; Max-Age=0"))
    }
}

/// Periodically drops expired sessions.
pub async fn cleanup_task(store: SessionStore, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let purged = store.purge_expired().await;
        if purged > 0 {
            tracing::debug!(purged, "Expired sessions removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(ttl_secs: u64) -> SessionStore {
        SessionStore::new(&SessionConfig {
            cookie_name: "library.sid".to_string(),
            ttl_secs,
            cleanup_interval_secs: 60,
            secure_cookie: false,
        })
    }

    #[tokio::test]
    async fn test_create_get_remove() {
        let s = store(60);
        let id = s.create(Session::admin()).await;
        assert_eq!(id.len(), SESSION_ID_LEN);
        assert_eq!(s.get(&id).await, Some(Session::admin()));
        assert!(s.remove(&id).await);
        assert_eq!(s.get(&id).await, None);
        assert!(!s.remove(&id).await);
    }

    #[tokio::test]
    async fn test_session_ids_are_unique() {
        let s = store(60);
        let a = s.create(Session::user("u1", false)).await;
        let b = s.create(Session::user("u1", false)).await;
        assert_ne!(a, b);
        assert_eq!(s.len().await, 2);
    }

    #[tokio::test]
    async fn test_expired_session_is_not_returned() {
        let s = store(1);
        let id = s.create(Session::library_card("card-1")).await;
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(s.get(&id).await, None);
        assert_eq!(s.len().await, 0);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let s = store(1);
        s.create(Session::user("a", false)).await;
        s.create(Session::user("b", false)).await;
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(s.purge_expired().await, 2);
        assert_eq!(s.len().await, 0);
    }

    #[test]
    fn test_session_id_from_headers() {
        let s = store(60);
        let mut headers = HeaderMap::new();
        assert_eq!(s.session_id_from_headers(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; library.sid=abc123; other=1"));
        assert_eq!(s.session_id_from_headers(&headers), Some("abc123".to_string()));

        headers.insert(header::COOKIE, HeaderValue::from_static("library.sid="));
        assert_eq!(s.session_id_from_headers(&headers), None);
    }

    #[test]
    fn test_cookie_values() {
        let s = store(86400);
        let set = s.session_cookie("xyz");
        let set = set.to_str().unwrap();
        assert!(set.starts_with("library.sid=xyz;"));
        assert!(set.contains("HttpOnly"));
        assert!(set.contains("Max-Age=86400"));
        assert!(!set.contains("Secure"));

        let cleared = s.expired_cookie();
        assert!(cleared.to_str().unwrap().contains("Max-Age=0"));
    }
}
