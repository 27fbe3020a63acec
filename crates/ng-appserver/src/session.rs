use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::TryLockError;
use std::time::Duration;
use std::time::Instant;

use ng_source::FxDashMap;

use crate::component::ComponentInstance;
use crate::error::StateError;
use crate::page_cache::PageCache;

/// A page that can sit in the page cache under several context ids at once.
pub type Page = Arc<Mutex<ComponentInstance>>;

/// Hands out the ids responses are known by within one session.
#[derive(Debug, Default)]
pub struct ContextIds {
    last: u64,
}

impl ContextIds {
    pub fn next_id(&mut self) -> String {
        self.last += 1;
        self.last.to_string()
    }
}

#[derive(Debug)]
pub struct Session {
    id: String,
    context_ids: ContextIds,
    page_cache: PageCache<Page>,
    last_access: Instant,
}

impl Session {
    #[must_use]
    pub fn new(id: &str, page_cache_size: usize) -> Self {
        Self {
            id: id.to_string(),
            context_ids: ContextIds::default(),
            page_cache: PageCache::new(page_cache_size),
            last_access: Instant::now(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn page_cache(&self) -> &PageCache<Page> {
        &self.page_cache
    }

    pub fn page_cache_mut(&mut self) -> &mut PageCache<Page> {
        &mut self.page_cache
    }

    pub fn context_ids_mut(&mut self) -> &mut ContextIds {
        &mut self.context_ids
    }

    pub fn touch(&mut self) {
        self.last_access = Instant::now();
    }

    #[must_use]
    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.last_access.elapsed() > timeout
    }
}

/// Live sessions by id.
///
/// Each session sits behind its own mutex. A request holds that lock for all
/// three phases, so requests within one session run one at a time while
/// different sessions proceed in parallel.
#[derive(Debug)]
pub struct SessionStore {
    sessions: FxDashMap<String, Arc<Mutex<Session>>>,
    page_cache_size: usize,
    timeout: Duration,
    next_id: AtomicU64,
}

impl SessionStore {
    #[must_use]
    pub fn new(page_cache_size: usize, timeout: Duration) -> Self {
        Self {
            sessions: FxDashMap::default(),
            page_cache_size,
            timeout,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn create(&self) -> Arc<Mutex<Session>> {
        let id = format!("s{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let session = Arc::new(Mutex::new(Session::new(&id, self.page_cache_size)));
        self.sessions.insert(id.clone(), Arc::clone(&session));
        tracing::debug!(session_id = %id, "created session");
        session
    }

    pub fn get(&self, id: &str) -> Result<Arc<Mutex<Session>>, StateError> {
        self.sessions
            .get(id)
            .map(|session| Arc::clone(session.value()))
            .ok_or_else(|| StateError::UnknownSession(id.to_string()))
    }

    pub fn remove(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.remove(id).map(|(_, session)| session)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions idle for longer than the timeout. Sessions in use by a
    /// request are kept. Returns how many were removed.
    pub fn remove_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| match session.try_lock() {
            Ok(session) => !session.is_expired(self.timeout),
            Err(TryLockError::WouldBlock) => true,
            Err(TryLockError::Poisoned(_)) => false,
        });
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::info!(removed, "removed expired sessions");
        }
        removed
    }
}
