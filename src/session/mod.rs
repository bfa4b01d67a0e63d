//! 会话状态：按会话隔离的少量命名槽位

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SessionError;

pub mod keys;
mod memory;
mod redis_store;
mod registry;
mod state;

pub use memory::MemorySessionStore;
pub use redis_store::RedisSessionStore;
pub use registry::MemorySessionRegistry;
pub use state::SessionState;

/// 会话槽位存储
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, SessionError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), SessionError>;

    async fn remove(&self, key: &str) -> Result<(), SessionError>;
}
