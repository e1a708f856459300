use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use uuid::Uuid;

use super::CheckInFlow;

/// A live wizard instance plus the last time anything touched it; the
/// sweeper uses `touched_at` to expire abandoned flows.
#[derive(Debug)]
pub struct FlowSession {
    pub flow: CheckInFlow,
    pub touched_at: Instant,
}

impl FlowSession {
    pub fn touch(&mut self) {
        self.touched_at = Instant::now();
    }
}

/// In-memory registry of active check-in flows (single-instance deployments;
/// a flow lives and dies on the node that started it). Each session has its
/// own lock so one user's in-flight write never serializes another's, and so
/// events on a single flow apply strictly one at a time — that lock is the
/// double-submit guard.
#[derive(Clone, Default)]
pub struct FlowRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, Arc<Mutex<FlowSession>>>>>,
}

impl FlowRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn create(&self, flow: CheckInFlow) -> Uuid {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(FlowSession {
            flow,
            touched_at: Instant::now(),
        }));
        self.sessions.lock().await.insert(id, session);
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<FlowSession>>> {
        self.sessions.lock().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.lock().await.remove(&id).is_some()
    }

    /// Drop sessions idle for longer than `ttl`. Returns how many were
    /// removed. Sessions currently locked by a request count as busy and
    /// survive the sweep.
    pub async fn sweep(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(guard) => guard.touched_at.elapsed() < ttl,
            Err(_) => true,
        });
        before - sessions.len()
    }
}

/// Background task purging abandoned flows every five minutes.
pub fn spawn_flow_sweeper(registry: FlowRegistry, ttl: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            let removed = registry.sweep(ttl).await;
            if removed > 0 {
                tracing::info!(removed = removed, "Expired abandoned check-in flows");
            }
        }
    });
}
