//! Per-visitor state: language, persona, chat history and favorites.
//!
//! Sessions live in memory and are keyed by a UUID carried in a signed
//! cookie. Nothing here is shared between visitors.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{ChatMessage, Language, MovieRef, Persona};

pub const SESSION_COOKIE: &str = "cimabot_session";

/// Stored turns per session; older turns are dropped first
const MAX_STORED_HISTORY: usize = 50;

/// Sessions idle longer than this are pruned
const IDLE_TTL_HOURS: i64 = 24;

/// Upper bound on stored sessions; the least recently seen is evicted first
const MAX_SESSIONS: usize = 10_000;

/// Bytes of the HMAC tag kept in the cookie
const SIGNATURE_LEN: usize = 16;

type HmacSha256 = Hmac<Sha256>;

/// Session id extracted by the session middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub language: Language,
    pub persona: Persona,
    pub history: Vec<ChatMessage>,
    pub favorites: Vec<MovieRef>,
    #[serde(skip)]
    pub last_seen: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        let language = Language::default();
        let persona = Persona::default();
        Self {
            language,
            persona,
            history: vec![ChatMessage::assistant(persona.welcome(language))],
            favorites: Vec::new(),
            last_seen: Utc::now(),
        }
    }
}

impl Session {
    /// Starts a new conversation with `persona`'s greeting.
    pub fn reset_chat(&mut self, persona: Persona) {
        self.persona = persona;
        self.history = vec![ChatMessage::assistant(persona.welcome(self.language))];
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.history.push(message);
        if self.history.len() > MAX_STORED_HISTORY {
            let excess = self.history.len() - MAX_STORED_HISTORY;
            self.history.drain(..excess);
        }
    }

    /// Returns false when a movie with the same id is already saved.
    pub fn add_favorite(&mut self, movie: MovieRef) -> bool {
        if self.favorites.iter().any(|m| m.id == movie.id) {
            return false;
        }
        self.favorites.push(movie);
        true
    }

    pub fn remove_favorite(&mut self, id: u64) {
        self.favorites.retain(|m| m.id != id);
    }
}

/// In-memory session map shared by all requests
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a stored session as active. Unknown ids stay unstored until
    /// their first change.
    pub async fn touch(&self, id: SessionId) {
        if let Some(session) = self.inner.write().await.get_mut(&id.0) {
            session.last_seen = Utc::now();
        }
    }

    /// Snapshot of a session; a default session if it does not exist.
    pub async fn get(&self, id: SessionId) -> Session {
        self.inner
            .read()
            .await
            .get(&id.0)
            .cloned()
            .unwrap_or_default()
    }

    /// Runs `f` on the session, storing it first if needed.
    ///
    /// Storing a new session prunes idle ones and keeps the store within
    /// `MAX_SESSIONS`.
    pub async fn update<R>(&self, id: SessionId, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut sessions = self.inner.write().await;
        let now = Utc::now();

        if !sessions.contains_key(&id.0) {
            make_room(&mut sessions, now);
            tracing::debug!(session_id = %id, active = sessions.len() + 1, "Session created");
        }

        let session = sessions.entry(id.0).or_default();
        session.last_seen = now;
        f(session)
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

fn make_room(sessions: &mut HashMap<Uuid, Session>, now: DateTime<Utc>) {
    let cutoff = now - Duration::hours(IDLE_TTL_HOURS);
    let before = sessions.len();
    sessions.retain(|_, s| s.last_seen > cutoff);
    let pruned = before - sessions.len();
    if pruned > 0 {
        tracing::info!(pruned, "Pruned idle sessions");
    }

    while sessions.len() >= MAX_SESSIONS {
        let Some(oldest) = sessions
            .iter()
            .min_by_key(|(_, s)| s.last_seen)
            .map(|(id, _)| *id)
        else {
            break;
        };
        sessions.remove(&oldest);
        tracing::warn!(session_id = %oldest, "Session store full, evicted least recently seen");
    }
}

/// Signs and verifies session cookie values (`<uuid>.<hex HMAC-SHA256 tag>`)
#[derive(Clone)]
pub struct SessionSigner {
    keyed: HmacSha256,
}

impl SessionSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            keyed: HmacSha256::new_from_slice(secret.as_ref())
                .expect("HMAC accepts keys of any length"),
        }
    }

    fn mac(&self, id: &Uuid) -> HmacSha256 {
        let mut mac = self.keyed.clone();
        mac.update(id.as_bytes());
        mac
    }

    pub fn sign(&self, id: &Uuid) -> String {
        let tag = self.mac(id).finalize().into_bytes();
        format!("{}.{}", id, hex::encode(&tag[..SIGNATURE_LEN]))
    }

    /// Returns the session id when the value is well formed and correctly
    /// signed. The tag is checked in constant time.
    pub fn verify(&self, value: &str) -> Option<Uuid> {
        let (id, signature) = value.split_once('.')?;
        let id = Uuid::parse_str(id).ok()?;
        let signature = hex::decode(signature).ok()?;
        if signature.len() != SIGNATURE_LEN {
            return None;
        }
        self.mac(&id)
            .verify_truncated_left(&signature)
            .ok()
            .map(|_| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaKind;

    fn movie(id: u64) -> MovieRef {
        MovieRef {
            id,
            title: format!("Movie {}", id),
            poster_path: "/p.jpg".to_string(),
            poster_url: "https://image.tmdb.org/t/p/w500/p.jpg".to_string(),
            overview: String::new(),
            media_type: MediaKind::Movie,
        }
    }

    #[test]
    fn test_new_session_starts_with_welcome() {
        let session = Session::default();
        assert_eq!(session.language, Language::En);
        assert_eq!(session.history.len(), 1);
        assert_eq!(
            session.history[0].content.text(),
            Persona::Friendly.welcome(Language::En)
        );
    }

    #[test]
    fn test_reset_chat_uses_session_language() {
        let mut session = Session {
            language: Language::De,
            ..Session::default()
        };
        session.push(ChatMessage::user("hallo"));
        session.reset_chat(Persona::Joker);

        assert_eq!(session.persona, Persona::Joker);
        assert_eq!(session.history.len(), 1);
        assert_eq!(session.history[0].content.text(), "Warum so ernst? 🤡");
    }

    #[test]
    fn test_history_is_bounded() {
        let mut session = Session::default();
        for i in 0..(MAX_STORED_HISTORY + 10) {
            session.push(ChatMessage::user(format!("{}", i)));
        }
        assert_eq!(session.history.len(), MAX_STORED_HISTORY);
        assert_eq!(
            session.history.last().unwrap().content.text(),
            format!("{}", MAX_STORED_HISTORY + 9)
        );
    }

    #[test]
    fn test_favorites_are_unique() {
        let mut session = Session::default();
        assert!(session.add_favorite(movie(1)));
        assert!(!session.add_favorite(movie(1)));
        assert!(session.add_favorite(movie(2)));

        session.remove_favorite(1);
        let ids: Vec<u64> = session.favorites.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_signer_round_trip_and_tamper() {
        let signer = SessionSigner::new("secret");
        let id = Uuid::new_v4();
        let value = signer.sign(&id);

        assert_eq!(signer.verify(&value), Some(id));

        let other = Uuid::new_v4();
        let forged = format!("{}.{}", other, value.split_once('.').unwrap().1);
        assert_eq!(signer.verify(&forged), None);

        assert_eq!(SessionSigner::new("other").verify(&value), None);
        assert_eq!(signer.verify("garbage"), None);
    }

    #[test]
    fn test_signer_rejects_truncated_tag() {
        let signer = SessionSigner::new("secret");
        let id = Uuid::new_v4();
        let value = signer.sign(&id);

        assert_eq!(value.len(), 36 + 1 + SIGNATURE_LEN * 2);
        assert_eq!(signer.verify(&value[..value.len() - 2]), None);
        assert_eq!(signer.verify(&format!("{}.zz", id)), None);
    }

    #[tokio::test]
    async fn test_store_isolates_sessions() {
        let store = SessionStore::new();
        let a = SessionId(Uuid::new_v4());
        let b = SessionId(Uuid::new_v4());

        store.update(a, |s| s.language = Language::Ar).await;
        store.update(b, |s| s.persona = Persona::Critic).await;

        assert_eq!(store.get(a).await.language, Language::Ar);
        assert_eq!(store.get(b).await.language, Language::En);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_reads_do_not_store_sessions() {
        let store = SessionStore::new();
        for _ in 0..20 {
            let id = SessionId(Uuid::new_v4());
            store.touch(id).await;
            assert_eq!(store.get(id).await.language, Language::En);
        }
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_new_session_prunes_idle_sessions() {
        let store = SessionStore::new();
        let stale = SessionId(Uuid::new_v4());
        store.update(stale, |_| ()).await;
        {
            let mut sessions = store.inner.write().await;
            if let Some(session) = sessions.get_mut(&stale.0) {
                session.last_seen = Utc::now() - Duration::hours(IDLE_TTL_HOURS + 1);
            }
        }

        let fresh = SessionId(Uuid::new_v4());
        store.update(fresh, |s| s.language = Language::De).await;

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get(fresh).await.language, Language::De);
    }

    #[test]
    fn test_full_store_evicts_least_recently_seen() {
        let now = Utc::now();
        let mut sessions = HashMap::new();
        let oldest = Uuid::new_v4();
        sessions.insert(
            oldest,
            Session {
                last_seen: now - Duration::hours(1),
                ..Session::default()
            },
        );
        while sessions.len() < MAX_SESSIONS {
            sessions.insert(Uuid::new_v4(), Session::default());
        }

        make_room(&mut sessions, now);

        assert_eq!(sessions.len(), MAX_SESSIONS - 1);
        assert!(!sessions.contains_key(&oldest));
    }
}
