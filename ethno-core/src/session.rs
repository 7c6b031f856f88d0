//! Per-conversation mutable state and the keyed store holding it.
//!
//! One `Session` per conversation: at most one active game, at most one
//! marathon/blitz run, plus navigation scratch. The store serializes all
//! access per key (one mutex per conversation) so a transport that
//! delivers events concurrently cannot interleave the read-modify-write
//! steps of the game logic. Nothing here survives a restart by design.

use crate::catalog::Category;
use crate::games::match_pairs::MatchGame;
use crate::games::quiz::QuizPayload;
use crate::games::run::RunState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Conversation key, as handed out by the transport.
pub type ChatId = i64;

/// The one game a session may have in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveGame {
    Quiz(QuizPayload),
    Pairs(MatchGame),
}

/// What the next free-text message from the user means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchMode {
    /// Search entity display names.
    Entities,
    /// Search item names across the whole catalog.
    AllItems,
    /// Search item names within one (entity, category) list.
    Scoped { entity: String, category: Category },
}

/// Per-conversation state.
#[derive(Debug, Clone)]
pub struct Session {
    pub game: Option<ActiveGame>,
    pub run: Option<RunState>,
    pub selected_entities: Vec<String>,
    pub page: usize,
    pub search_mode: Option<SearchMode>,
    pub awaiting_feedback: bool,
    last_seen: Instant,
}

impl Session {
    pub fn new() -> Self {
        Self {
            game: None,
            run: None,
            selected_entities: Vec::new(),
            page: 0,
            search_mode: None,
            awaiting_feedback: false,
            last_seen: Instant::now(),
        }
    }

    /// Drop everything back to the empty state (home navigation).
    pub fn reset(&mut self) {
        let last_seen = self.last_seen;
        *self = Self::new();
        self.last_seen = last_seen;
    }

    /// Mark the session as just used.
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_seen.elapsed()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Keyed session store with a single-writer-per-key discipline.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<ChatId, Arc<Mutex<Session>>>>,
}

fn relock<'a, T>(
    guard: Result<MutexGuard<'a, T>, PoisonError<MutexGuard<'a, T>>>,
) -> MutexGuard<'a, T> {
    // a panicked handler must not wedge every later event for the chat
    guard.unwrap_or_else(PoisonError::into_inner)
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for one conversation, created on first contact.
    pub fn get_or_create(&self, chat: ChatId) -> Arc<Mutex<Session>> {
        let mut map = relock(self.inner.lock());
        map.entry(chat)
            .or_insert_with(|| Arc::new(Mutex::new(Session::new())))
            .clone()
    }

    /// Run one atomic step against a conversation's session.
    pub fn with_session<T>(&self, chat: ChatId, f: impl FnOnce(&mut Session) -> T) -> T {
        let handle = self.get_or_create(chat);
        let mut session = relock(handle.lock());
        session.touch();
        f(&mut session)
    }

    /// Reset a conversation to the empty state, keeping its key.
    pub fn reset(&self, chat: ChatId) {
        self.with_session(chat, Session::reset);
    }

    /// Drop a conversation entirely.
    pub fn remove(&self, chat: ChatId) {
        relock(self.inner.lock()).remove(&chat);
    }

    /// Evict sessions idle beyond `max_idle`; returns how many were
    /// dropped. Sessions currently locked by a handler are kept.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut map = relock(self.inner.lock());
        let before = map.len();
        map.retain(|_, handle| match handle.try_lock() {
            Ok(session) => session.idle_for() <= max_idle,
            Err(_) => true,
        });
        before - map.len()
    }

    pub fn len(&self) -> usize {
        relock(self.inner.lock()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::run::RunKind;

    #[test]
    fn test_get_or_create_is_idempotent() {
        let store = SessionStore::new();
        let a = store.get_or_create(1);
        let b = store.get_or_create(1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_with_session_mutates_in_place() {
        let store = SessionStore::new();
        store.with_session(7, |s| s.selected_entities.push("russian".to_string()));
        let selected = store.with_session(7, |s| s.selected_entities.clone());
        assert_eq!(selected, vec!["russian"]);
    }

    #[test]
    fn test_reset_clears_state_but_keeps_key() {
        let store = SessionStore::new();
        store.with_session(3, |s| {
            s.run = Some(RunState::new(RunKind::Blitz));
            s.page = 2;
            s.awaiting_feedback = true;
        });
        store.reset(3);
        assert_eq!(store.len(), 1);
        store.with_session(3, |s| {
            assert!(s.run.is_none());
            assert_eq!(s.page, 0);
            assert!(!s.awaiting_feedback);
        });
    }

    #[test]
    fn test_evict_idle_drops_stale_sessions() {
        let store = SessionStore::new();
        store.get_or_create(1);
        store.get_or_create(2);
        assert_eq!(store.evict_idle(Duration::from_secs(3600)), 0);
        assert_eq!(store.len(), 2);
        assert_eq!(store.evict_idle(Duration::ZERO), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove() {
        let store = SessionStore::new();
        store.get_or_create(5);
        store.remove(5);
        assert!(store.is_empty());
    }
}
