//! Wizard session store
//!
//! Server-side, in-memory storage of in-progress enrollments. The browser
//! only holds an opaque session id in the `enroll_session` cookie.
//!
//! A session only takes memory once a stage is stored; ids handed to
//! browsers that never store anything sit in a bounded pending list.
//! Writes to one session are last-write-wins; there is no per-session lock.
//! Sessions idle for longer than the configured TTL are treated as absent
//! and removed by [`spawn_sweeper`].

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use enroll_common::{StageKey, StageRecord, WizardState};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::ApiError;
use crate::AppState;

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "enroll_session";

/// Opaque browser session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn generate() -> Self {
        SessionId(Uuid::new_v4())
    }

    /// `Set-Cookie` value binding this id to the browser
    pub fn cookie(&self) -> String {
        format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(SessionId)
    }
}

/// Session id attached by [`session_middleware`]
#[async_trait]
impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionId>()
            .copied()
            .ok_or_else(|| ApiError::Internal("session middleware not installed".to_string()))
    }
}

/// Upper bound on ids handed out but not yet backed by any stage data
pub const DEFAULT_PENDING_LIMIT: usize = 4096;

struct SessionEntry {
    state: WizardState,
    last_seen: Instant,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            state: WizardState::default(),
            last_seen: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_seen.elapsed() > ttl
    }
}

/// Ids sent to a browser that has not stored anything yet
///
/// Oldest first. Capacity-bounded so cookieless clients cannot grow it.
#[derive(Default)]
struct PendingIds {
    order: VecDeque<(SessionId, Instant)>,
    ids: HashSet<SessionId>,
}

impl PendingIds {
    fn issue(&mut self, id: SessionId, limit: usize) {
        while self.order.len() >= limit {
            match self.order.pop_front() {
                Some((evicted, _)) => {
                    self.ids.remove(&evicted);
                }
                None => break,
            }
        }
        if limit > 0 {
            self.order.push_back((id, Instant::now()));
            self.ids.insert(id);
        }
    }

    fn contains(&self, id: &SessionId) -> bool {
        self.ids.contains(id)
    }

    fn take(&mut self, id: &SessionId) -> bool {
        if !self.ids.remove(id) {
            return false;
        }
        self.order.retain(|(pending, _)| pending != id);
        true
    }

    /// Drop ids issued longer than `ttl` ago, returning how many
    fn prune(&mut self, ttl: Duration) -> usize {
        let mut removed = 0;
        while let Some((id, issued)) = self.order.front().copied() {
            if issued.elapsed() <= ttl {
                break;
            }
            self.order.pop_front();
            self.ids.remove(&id);
            removed += 1;
        }
        removed
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

#[derive(Default)]
struct Sessions {
    active: HashMap<SessionId, SessionEntry>,
    pending: PendingIds,
}

/// Shared handle to all live wizard sessions
///
/// A fresh id is only remembered in a bounded pending list; the session
/// itself is created by the first [`SessionStore::put`].
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Sessions>>,
    ttl: Duration,
    pending_limit: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self::with_pending_limit(ttl, DEFAULT_PENDING_LIMIT)
    }

    pub fn with_pending_limit(ttl: Duration, pending_limit: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Sessions::default())),
            ttl,
            pending_limit,
        }
    }

    /// Look up the id a browser presented, or issue a new one
    ///
    /// Returns the id to use and whether it was newly minted (and so must
    /// be sent back in a cookie). Unknown or expired ids are never reused.
    pub async fn resolve(&self, presented: Option<SessionId>) -> (SessionId, bool) {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        if let Some(id) = presented {
            if let Some(entry) = inner.active.get_mut(&id) {
                if !entry.is_expired(self.ttl) {
                    entry.last_seen = Instant::now();
                    return (id, false);
                }
                debug!("Session {} expired", id);
                inner.active.remove(&id);
            } else if inner.pending.contains(&id) {
                return (id, false);
            }
        }

        let id = SessionId::generate();
        inner.pending.issue(id, self.pending_limit);
        debug!("Issued session id {}", id);
        (id, true)
    }

    /// Store one stage's record, replacing any earlier one
    pub async fn put(&self, id: SessionId, record: StageRecord) {
        let key = record.key();
        let mut inner = self.inner.write().await;
        if inner.pending.take(&id) {
            debug!("Started session {}", id);
        }
        let entry = inner.active.entry(id).or_insert_with(SessionEntry::new);
        entry.state.put(record);
        entry.last_seen = Instant::now();
        debug!("Session {} stored {}", id, key);
    }

    /// One stage's record, if the session holds it
    pub async fn get(&self, id: SessionId, key: StageKey) -> Option<StageRecord> {
        let inner = self.inner.read().await;
        inner
            .active
            .get(&id)
            .filter(|entry| !entry.is_expired(self.ttl))
            .and_then(|entry| entry.state.get(key))
    }

    /// Copy of everything the session has accumulated
    pub async fn snapshot(&self, id: SessionId) -> WizardState {
        let inner = self.inner.read().await;
        inner
            .active
            .get(&id)
            .filter(|entry| !entry.is_expired(self.ttl))
            .map(|entry| entry.state.clone())
            .unwrap_or_default()
    }

    /// Discard all stages of a session
    pub async fn clear(&self, id: SessionId) {
        if let Some(entry) = self.inner.write().await.active.get_mut(&id) {
            entry.state.clear();
        }
    }

    /// Drop expired sessions and stale pending ids, returning how many
    /// sessions were removed
    pub async fn prune_expired(&self) -> usize {
        let mut inner = self.inner.write().await;
        let stale = inner.pending.prune(self.ttl);
        if stale > 0 {
            debug!("Forgot {} unused session ids", stale);
        }
        let before = inner.active.len();
        inner.active.retain(|_, entry| !entry.is_expired(self.ttl));
        before - inner.active.len()
    }

    /// Number of sessions holding stage data
    pub async fn len(&self) -> usize {
        self.inner.read().await.active.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of issued ids not yet backed by a session
    pub async fn pending_len(&self) -> usize {
        self.inner.read().await.pending.len()
    }
}

/// Periodically prune expired sessions
pub fn spawn_sweeper(store: SessionStore, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let removed = store.prune_expired().await;
            if removed > 0 {
                debug!("Pruned {} expired sessions", removed);
            }
        }
    })
}

/// Session id presented in the request's `Cookie` headers
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.parse().ok())
}

/// Session middleware
///
/// Resolves (or mints) the session id for every request and makes it
/// available to handlers as a [`SessionId`] extractor.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let presented = session_id_from_headers(request.headers());
    let (id, minted) = state.sessions.resolve(presented).await;
    request.extensions_mut().insert(id);

    let mut response = next.run(request).await;

    if minted {
        match HeaderValue::from_str(&id.cookie()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => warn!("Could not encode session cookie: {}", e),
        }
    }

    response
}
