use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::SessionError;

use super::SessionStore;

/// 进程内会话存储
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slots: Mutex<HashMap<String, Value>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同步读取，供宿主渲染使用
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.slots.lock().get(key).cloned()
    }

    pub fn clear(&self) {
        self.slots.lock().clear();
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, SessionError> {
        Ok(self.slots.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), SessionError> {
        self.slots.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.slots.lock().remove(key);
        Ok(())
    }
}
