//! Session bookkeeping for the stateful HTTP transport.
//!
//! The MCP transport itself lives in rmcp's session manager. This registry
//! only records when each session was last seen so idle ones can be closed
//! and so `/health` can report how many are live.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rmcp::transport::streamable_http_server::session::{local::LocalSessionManager, SessionManager};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Header carrying the session id on requests and on the `initialize` response.
pub const SESSION_HEADER: &str = "mcp-session-id";

#[derive(Debug, Clone, Copy)]
pub struct SessionInfo {
    pub created_at: Instant,
    pub last_seen: Instant,
    pub requests: u64,
}

/// Something that owns the live transports and can tear one down.
pub trait SessionBackend: Send + Sync + 'static {
    fn close(&self, id: &str) -> impl Future<Output = ()> + Send;
}

impl SessionBackend for LocalSessionManager {
    async fn close(&self, id: &str) {
        let session_id: Arc<str> = Arc::from(id);
        if let Err(e) = self.close_session(&session_id).await {
            // Already gone on the transport side (client DELETE or stream end).
            debug!(session_id = %id, error = %e, "session manager had no such session");
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<String, SessionInfo>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record activity on a session. Returns `true` when the id was new.
    pub async fn touch(&self, id: &str) -> bool {
        self.touch_at(id, Instant::now()).await
    }

    pub async fn touch_at(&self, id: &str, now: Instant) -> bool {
        let mut sessions = self.inner.write().await;
        match sessions.get_mut(id) {
            Some(info) => {
                info.last_seen = now;
                info.requests += 1;
                false
            }
            None => {
                sessions.insert(
                    id.to_string(),
                    SessionInfo {
                        created_at: now,
                        last_seen: now,
                        requests: 1,
                    },
                );
                true
            }
        }
    }

    pub async fn get(&self, id: &str) -> Option<SessionInfo> {
        self.inner.read().await.get(id).copied()
    }

    pub async fn remove(&self, id: &str) -> Option<SessionInfo> {
        self.inner.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Remove and return every session not seen within `idle_timeout` of `now`.
    pub async fn take_idle(&self, idle_timeout: Duration, now: Instant) -> Vec<String> {
        let mut sessions = self.inner.write().await;
        let idle: Vec<String> = sessions
            .iter()
            .filter(|(_, info)| now.saturating_duration_since(info.last_seen) > idle_timeout)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &idle {
            sessions.remove(id);
        }
        idle
    }

    /// Evict idle sessions and close their transports.
    pub async fn sweep<B: SessionBackend>(&self, backend: &B, idle_timeout: Duration) -> Vec<String> {
        let evicted = self.take_idle(idle_timeout, Instant::now()).await;
        for id in &evicted {
            backend.close(id).await;
            info!(session_id = %id, "evicted idle session");
        }
        evicted
    }

    /// Close every tracked session. Used when the server is shutting down.
    pub async fn close_all<B: SessionBackend>(&self, backend: &B) -> usize {
        let ids: Vec<String> = self.inner.write().await.drain().map(|(id, _)| id).collect();
        for id in &ids {
            backend.close(id).await;
        }
        ids.len()
    }
}

/// Spawn the periodic idle-session sweep.
#[must_use]
pub fn spawn_idle_sweeper<B: SessionBackend>(
    registry: SessionRegistry,
    backend: Arc<B>,
    idle_timeout: Duration,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; nothing can be idle yet.
        interval.tick().await;
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("session sweeper shutting down");
                    break;
                }
                _ = interval.tick() => {
                    let evicted = registry.sweep(backend.as_ref(), idle_timeout).await;
                    if !evicted.is_empty() {
                        let remaining = registry.len().await;
                        info!(count = evicted.len(), remaining, "idle sweep complete");
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBackend {
        closed: Mutex<Vec<String>>,
    }

    impl SessionBackend for RecordingBackend {
        async fn close(&self, id: &str) {
            if let Ok(mut closed) = self.closed.lock() {
                closed.push(id.to_string());
            }
        }
    }

    impl RecordingBackend {
        fn closed(&self) -> Vec<String> {
            let mut ids = self.closed.lock().map(|c| c.clone()).unwrap_or_default();
            ids.sort();
            ids
        }
    }

    #[tokio::test]
    async fn touch_creates_then_updates() {
        let registry = SessionRegistry::new();
        let start = Instant::now();

        assert!(registry.touch_at("a", start).await);
        assert!(!registry.touch_at("a", start + Duration::from_secs(5)).await);

        let info = registry.get("a").await.unwrap();
        assert_eq!(info.requests, 2);
        assert_eq!(info.created_at, start);
        assert_eq!(info.last_seen, start + Duration::from_secs(5));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn take_idle_only_removes_stale_sessions() {
        let registry = SessionRegistry::new();
        let start = Instant::now();
        registry.touch_at("old", start).await;
        registry.touch_at("fresh", start + Duration::from_secs(50)).await;

        let idle = registry
            .take_idle(Duration::from_secs(30), start + Duration::from_secs(60))
            .await;

        assert_eq!(idle, vec!["old".to_string()]);
        assert!(registry.get("old").await.is_none());
        assert!(registry.get("fresh").await.is_some());
    }

    #[tokio::test]
    async fn sweep_closes_evicted_sessions() {
        let registry = SessionRegistry::new();
        let backend = RecordingBackend::default();
        let long_ago = Instant::now() - Duration::from_secs(120);
        registry.touch_at("stale", long_ago).await;
        registry.touch("live").await;

        let evicted = registry.sweep(&backend, Duration::from_secs(60)).await;

        assert_eq!(evicted, vec!["stale".to_string()]);
        assert_eq!(backend.closed(), vec!["stale".to_string()]);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn close_all_drains_registry() {
        let registry = SessionRegistry::new();
        let backend = RecordingBackend::default();
        registry.touch("one").await;
        registry.touch("two").await;

        assert_eq!(registry.close_all(&backend).await, 2);
        assert!(registry.is_empty().await);
        assert_eq!(backend.closed(), vec!["one".to_string(), "two".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_stops_on_cancel() {
        let registry = SessionRegistry::new();
        let backend = Arc::new(RecordingBackend::default());
        let cancel = CancellationToken::new();

        let handle = spawn_idle_sweeper(
            registry,
            backend,
            Duration::from_secs(60),
            Duration::from_secs(1),
            cancel.clone(),
        );
        tokio::time::sleep(Duration::from_secs(3)).await;
        cancel.cancel();

        assert!(handle.await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_task_evicts_stale_sessions() {
        let registry = SessionRegistry::new();
        let backend = Arc::new(RecordingBackend::default());
        let cancel = CancellationToken::new();
        registry
            .touch_at("stale", Instant::now() - Duration::from_secs(120))
            .await;
        registry.touch("live").await;

        let handle = spawn_idle_sweeper(
            registry.clone(),
            Arc::clone(&backend),
            Duration::from_secs(60),
            Duration::from_secs(1),
            cancel.clone(),
        );
        tokio::time::sleep(Duration::from_secs(2)).await;
        cancel.cancel();
        assert!(handle.await.is_ok());

        assert_eq!(backend.closed(), vec!["stale".to_string()]);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn close_all_closes_local_manager_sessions() {
        let manager = LocalSessionManager::default();
        let (id, _transport) = manager.create_session().await.unwrap();
        let registry = SessionRegistry::new();
        registry.touch(&id).await;
        assert!(manager.has_session(&id).await.unwrap());

        assert_eq!(registry.close_all(&manager).await, 1);
        assert!(!manager.has_session(&id).await.unwrap());
    }
}
