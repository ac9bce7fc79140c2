//! Per-session conversation history.
//!
//! The store is injected into the chat service; classification and
//! assessment never touch it.

use chrono::{DateTime, Utc};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::brain::MessageType;

pub const DEFAULT_SESSION_CAPACITY: usize = 256;
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    Text,
    VisualAssessment,
}

/// One exchange in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub user_input: String,
    pub bot_response: String,
    pub kind: HistoryKind,
    pub message_type: Option<MessageType>,
}

impl HistoryEntry {
    pub fn text(
        user_input: impl Into<String>,
        bot_response: impl Into<String>,
        message_type: MessageType,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            user_input: user_input.into(),
            bot_response: bot_response.into(),
            kind: HistoryKind::Text,
            message_type: Some(message_type),
        }
    }

    pub fn visual_assessment(user_input: impl Into<String>, report: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            user_input: user_input.into(),
            bot_response: report.into(),
            kind: HistoryKind::VisualAssessment,
            message_type: None,
        }
    }
}

/// Storage for conversation history, keyed by session id.
pub trait SessionStore: Send + Sync + 'static {
    /// Entries for a session, oldest first. Unknown sessions yield an empty list.
    fn get(&self, session_id: &str) -> Vec<HistoryEntry>;

    fn append(&self, session_id: &str, entry: HistoryEntry);

    /// Returns true if the session existed.
    fn clear(&self, session_id: &str) -> bool;
}

/// Bounded in-memory store.
///
/// Holds at most `capacity` sessions (least recently used evicted first)
/// and at most `history_limit` entries per session (oldest dropped first).
pub struct InMemorySessionStore {
    sessions: Mutex<LruCache<String, VecDeque<HistoryEntry>>>,
    history_limit: usize,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_CAPACITY, DEFAULT_HISTORY_LIMIT)
    }
}

impl InMemorySessionStore {
    /// Zero values are raised to 1.
    pub fn new(capacity: usize, history_limit: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
            history_limit: history_limit.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, VecDeque<HistoryEntry>>> {
        // A panic while holding the lock leaves the map itself intact
        self.sessions.lock().unwrap_or_else(|poisoned| {
            warn!("Session store lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn session_count(&self) -> usize {
        self.lock().len()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, session_id: &str) -> Vec<HistoryEntry> {
        self.lock()
            .get(session_id)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn append(&self, session_id: &str, entry: HistoryEntry) {
        let mut sessions = self.lock();
        if !sessions.contains(session_id) {
            sessions.put(session_id.to_string(), VecDeque::new());
        }
        let Some(entries) = sessions.get_mut(session_id) else {
            return;
        };
        entries.push_back(entry);
        while entries.len() > self.history_limit {
            entries.pop_front();
        }
        debug!(session_id, entries = entries.len(), "History appended");
    }

    fn clear(&self, session_id: &str) -> bool {
        self.lock().pop(session_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry::text(
            format!("message {}", n),
            "reply",
            MessageType::GreetingOrGeneral,
        )
    }

    #[test]
    fn test_unknown_session_is_empty() {
        let store = InMemorySessionStore::default();
        assert!(store.get("nobody").is_empty());
        assert!(!store.clear("nobody"));
    }

    #[test]
    fn test_append_and_clear() {
        let store = InMemorySessionStore::default();
        store.append("s1", entry(1));
        store.append("s1", entry(2));
        store.append("s2", entry(3));

        let history = store.get("s1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].user_input, "message 1");

        assert!(store.clear("s1"));
        assert!(store.get("s1").is_empty());
        assert_eq!(store.get("s2").len(), 1);
    }

    #[test]
    fn test_history_limit_drops_oldest() {
        let store = InMemorySessionStore::new(4, 3);
        for n in 0..5 {
            store.append("s", entry(n));
        }
        let inputs: Vec<String> = store.get("s").into_iter().map(|e| e.user_input).collect();
        assert_eq!(inputs, vec!["message 2", "message 3", "message 4"]);
    }

    #[test]
    fn test_least_recent_session_evicted() {
        let store = InMemorySessionStore::new(2, 10);
        store.append("a", entry(1));
        store.append("b", entry(2));
        // Touch "a" so "b" becomes least recent
        store.get("a");
        store.append("c", entry(3));

        assert_eq!(store.session_count(), 2);
        assert!(store.get("b").is_empty());
        assert_eq!(store.get("a").len(), 1);
    }

    #[test]
    fn test_entry_kind_serialization() {
        let visual = HistoryEntry::visual_assessment("flooded street", "[PHOTO_ANALYSIS] ...");
        let json = serde_json::to_value(&visual).unwrap();
        assert_eq!(json["kind"], "visual_assessment");
        assert!(json["message_type"].is_null());
    }
}
