use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use handlebars::Handlebars;
use tokio::sync::Mutex;

use crate::chat::Session;
use crate::core::AppConfig;
use crate::core::models::default_model;
use crate::huggingface::HuggingFace;
use crate::ui;

/// A session is locked for the whole turn so a browser can't have
/// two requests in flight for the same transcript.
pub type SharedSession = Arc<Mutex<Session>>;

struct SessionEntry {
    session: SharedSession,
    last_seen: Instant,
}

impl SessionEntry {
    fn new(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            last_seen: Instant::now(),
        }
    }
}

pub struct AppState {
    // In memory only, sessions are gone when the server stops or
    // once they sit idle for longer than `config.session_ttl`
    sessions: HashMap<String, SessionEntry>,
    pub client: HuggingFace,
    pub templates: Arc<Handlebars<'static>>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        Ok(Self {
            sessions: HashMap::new(),
            client: HuggingFace::from_config(&config)?,
            templates: Arc::new(ui::templates()),
            config,
        })
    }

    /// Starts a session with the default model and the configured
    /// API key and returns its ID.
    pub fn create_session(&mut self) -> String {
        let session = Session::new(default_model(), &self.config.hf_api_key);
        let id = session.id().to_string();
        self.insert_session(session);
        id
    }

    pub fn get_or_create_session(&mut self, id: &str) -> SharedSession {
        self.remove_expired_sessions();
        if let Some(entry) = self.sessions.get_mut(id) {
            entry.last_seen = Instant::now();
            return Arc::clone(&entry.session);
        }
        let session = Session::with_id(id, default_model(), &self.config.hf_api_key);
        self.insert_session(session)
    }

    /// Looks up a live session without creating one. Counts as
    /// activity so the session's idle timer restarts.
    pub fn find_session(&mut self, id: &str) -> Option<SharedSession> {
        self.remove_expired_sessions();
        let entry = self.sessions.get_mut(id)?;
        entry.last_seen = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn insert_session(&mut self, session: Session) -> SharedSession {
        self.remove_expired_sessions();
        // Make room by dropping the least recently used session
        while self.sessions.len() >= self.config.max_sessions {
            let Some(oldest) = self
                .sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            self.sessions.remove(&oldest);
            tracing::info!("Evicted chat session {} to stay under the limit", oldest);
        }

        let id = session.id().to_string();
        tracing::info!("Created chat session {}", id);
        let entry = SessionEntry::new(session);
        let shared = Arc::clone(&entry.session);
        self.sessions.insert(id, entry);
        shared
    }

    fn remove_expired_sessions(&mut self) {
        let ttl = self.config.session_ttl;
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| entry.last_seen.elapsed() < ttl);

        let removed = before - self.sessions.len();
        if removed > 0 {
            tracing::info!(
                "Dropped {} idle chat sessions, {} remaining",
                removed,
                self.session_count()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL};
    use crate::huggingface::{Endpoints, GenerationParams};

    fn test_config(session_ttl: Duration, max_sessions: usize) -> AppConfig {
        AppConfig {
            hf_api_key: "hf_default".to_string(),
            endpoints: Endpoints::default(),
            request_timeout: None,
            generation: GenerationParams::default(),
            session_ttl,
            max_sessions,
        }
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let mut state =
            AppState::new(test_config(DEFAULT_SESSION_TTL, DEFAULT_MAX_SESSIONS)).unwrap();

        let id = state.create_session();
        let other = state.get_or_create_session("other");
        assert_eq!(state.session_count(), 2);

        other.lock().await.set_api_key("changed");
        let session = state.find_session(&id).unwrap();
        assert_eq!(session.lock().await.api_key(), "hf_default");
        assert_eq!(
            state.get_or_create_session("other").lock().await.api_key(),
            "changed"
        );
        assert!(state.find_session("missing").is_none());
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let mut state = AppState::new(test_config(Duration::from_millis(50), 100)).unwrap();

        let idle = state.create_session();
        for i in 0..20 {
            state.get_or_create_session(&format!("junk-{}", i));
        }
        assert_eq!(state.session_count(), 21);

        tokio::time::sleep(Duration::from_millis(100)).await;

        let fresh = state.create_session();
        assert_eq!(state.session_count(), 1);
        assert!(state.find_session(&idle).is_none());
        assert!(state.find_session("junk-0").is_none());
        assert!(state.find_session(&fresh).is_some());

        // A recreated ID starts over with an empty transcript
        let session = state.get_or_create_session(&idle);
        assert!(session.lock().await.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_session_limit_evicts_least_recently_used() {
        let mut state = AppState::new(test_config(DEFAULT_SESSION_TTL, 3)).unwrap();

        state.get_or_create_session("a");
        tokio::time::sleep(Duration::from_millis(5)).await;
        state.get_or_create_session("b");
        tokio::time::sleep(Duration::from_millis(5)).await;
        state.get_or_create_session("c");
        tokio::time::sleep(Duration::from_millis(5)).await;
        // Touching "a" makes "b" the oldest
        state.find_session("a");
        tokio::time::sleep(Duration::from_millis(5)).await;

        state.get_or_create_session("d");
        assert_eq!(state.session_count(), 3);
        assert!(state.find_session("b").is_none());
        assert!(state.find_session("a").is_some());
        assert!(state.find_session("c").is_some());
        assert!(state.find_session("d").is_some());

        for i in 0..500 {
            state.get_or_create_session(&format!("junk-{}", i));
        }
        assert_eq!(state.session_count(), 3);
        assert!(state.find_session("junk-499").is_some());
    }
}
