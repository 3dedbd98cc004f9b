use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use topsis_form::config::FooterConfig;
use topsis_form::form::FormController;
use topsis_form::submission::ScoringBackend;
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type SessionId = u64;

pub(crate) const SESSION_IDLE_TTL: Duration = Duration::from_secs(30 * 60);
pub(crate) const MAX_SESSIONS: usize = 1024;

struct SessionEntry {
    form: FormController,
    touched: Instant,
}

#[derive(Default)]
struct SessionTable {
    entries: HashMap<SessionId, SessionEntry>,
}

impl SessionTable {
    fn prune_idle(&mut self, idle_ttl: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.touched.elapsed() < idle_ttl);
        before - self.entries.len()
    }

    fn evict_least_recent(&mut self) -> Option<SessionId> {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.touched)
            .map(|(id, _)| *id)?;
        self.entries.remove(&oldest);
        Some(oldest)
    }
}

/// One form controller per browser session. Sessions idle longer than the
/// TTL are dropped, and the least recently used one makes room at the cap.
#[derive(Clone)]
pub(crate) struct InMemorySessionStore {
    sessions: Arc<Mutex<SessionTable>>,
    next_id: Arc<AtomicU64>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::with_limits(SESSION_IDLE_TTL, MAX_SESSIONS)
    }
}

impl InMemorySessionStore {
    pub(crate) fn with_limits(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::default(),
            next_id: Arc::default(),
            idle_ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    pub(crate) fn create(&self) -> SessionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut table = self.sessions.lock().expect("session mutex poisoned");

        let expired = table.prune_idle(self.idle_ttl);
        if expired > 0 {
            debug!(expired, "idle form sessions dropped");
        }
        while table.entries.len() >= self.max_sessions {
            match table.evict_least_recent() {
                Some(evicted) => debug!(evicted, "form session evicted at capacity"),
                None => break,
            }
        }

        table.entries.insert(
            id,
            SessionEntry {
                form: FormController::new(),
                touched: Instant::now(),
            },
        );
        id
    }

    /// Runs `f` against the session's controller; the lock is held only while `f` runs.
    pub(crate) fn with_session<R>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut FormController) -> R,
    ) -> Option<R> {
        let mut table = self.sessions.lock().expect("session mutex poisoned");
        table.entries.get_mut(&id).map(|entry| {
            entry.touched = Instant::now();
            f(&mut entry.form)
        })
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .entries
            .len()
    }
}

/// Router state for the form pages.
#[derive(Clone)]
pub(crate) struct FormState {
    pub(crate) sessions: InMemorySessionStore,
    pub(crate) backend: Arc<dyn ScoringBackend>,
    pub(crate) footer: FooterConfig,
}

impl FormState {
    pub(crate) fn new(backend: Arc<dyn ScoringBackend>, footer: FooterConfig) -> Self {
        Self {
            sessions: InMemorySessionStore::default(),
            backend,
            footer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_are_isolated() {
        let store = InMemorySessionStore::default();
        let first = store.create();
        let second = store.create();
        assert_ne!(first, second);

        store.with_session(first, |form| form.set_weights("1,1"));
        let weights = store.with_session(second, |form| form.fields().weights.clone());
        assert_eq!(weights.as_deref(), Some(""));
        assert!(store.with_session(999, |_| ()).is_none());
    }

    #[test]
    fn least_recently_used_session_is_evicted_at_capacity() {
        let store = InMemorySessionStore::with_limits(SESSION_IDLE_TTL, 2);
        let first = store.create();
        let second = store.create();
        std::thread::sleep(Duration::from_millis(5));
        store.with_session(first, |form| form.set_weights("1,1"));

        let third = store.create();
        assert_eq!(store.len(), 2);
        assert!(store.with_session(second, |_| ()).is_none());
        assert_eq!(
            store.with_session(first, |form| form.fields().weights.clone()),
            Some("1,1".to_string())
        );
        assert!(store.with_session(third, |_| ()).is_some());
    }

    #[test]
    fn idle_sessions_are_dropped_on_create() {
        let store = InMemorySessionStore::with_limits(Duration::ZERO, MAX_SESSIONS);
        let stale = store.create();
        let fresh = store.create();
        assert_eq!(store.len(), 1);
        assert!(store.with_session(stale, |_| ()).is_none());
        assert!(store.with_session(fresh, |_| ()).is_some());
    }
}
