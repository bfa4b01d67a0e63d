use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::MemorySessionStore;

struct Entry {
    store: Arc<MemorySessionStore>,
    last_seen: Instant,
}

/// 按会话 id 保存进程内会话，超过 `ttl` 未访问的会话被清除
pub struct MemorySessionRegistry {
    sessions: Mutex<HashMap<String, Entry>>,
    ttl: Duration,
}

impl MemorySessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// 取已有会话并刷新访问时间，不存在或已过期时新建
    pub fn session(&self, session_id: Option<&str>) -> (String, Arc<MemorySessionStore>) {
        self.session_at(session_id, Instant::now())
    }

    pub fn session_at(
        &self,
        session_id: Option<&str>,
        now: Instant,
    ) -> (String, Arc<MemorySessionStore>) {
        let mut sessions = self.sessions.lock();

        let before = sessions.len();
        sessions.retain(|_, entry| now.saturating_duration_since(entry.last_seen) < self.ttl);
        if sessions.len() < before {
            tracing::debug!(evicted = before - sessions.len(), "Evicted idle sessions");
        }

        if let Some(id) = session_id {
            if let Some(entry) = sessions.get_mut(id) {
                entry.last_seen = now;
                return (id.to_string(), Arc::clone(&entry.store));
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        let store = Arc::new(MemorySessionStore::new());
        sessions.insert(
            id.clone(),
            Entry {
                store: Arc::clone(&store),
                last_seen: now,
            },
        );
        tracing::debug!(sid = %id, "New session");
        (id, store)
    }

    /// 删除会话，返回是否存在
    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions.lock().remove(session_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
