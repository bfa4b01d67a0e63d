use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};
use serde_json::Value;

use crate::error::SessionError;

use super::SessionStore;
use super::keys::session_slot_key;

/// Redis 会话存储，每个槽位一个键，写入时刷新过期时间
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: Arc<RedisClient>,
    session_id: String,
    ttl: u64,
}

impl RedisSessionStore {
    pub fn new(redis: Arc<RedisClient>, session_id: impl Into<String>, ttl: u64) -> Self {
        Self {
            redis,
            session_id: session_id.into(),
            ttl,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, SessionError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let result: Option<String> = conn.get(session_slot_key(&self.session_id, key)).await?;
        decode_slot(result)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), SessionError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let json = encode_slot(&value)?;
        let _: () = conn
            .set_ex(session_slot_key(&self.session_id, key), json, self.ttl)
            .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let _: () = conn.del(session_slot_key(&self.session_id, key)).await?;

        Ok(())
    }
}

fn encode_slot(value: &Value) -> Result<String, SessionError> {
    Ok(serde_json::to_string(value)?)
}

fn decode_slot(raw: Option<String>) -> Result<Option<Value>, SessionError> {
    match raw {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn slot_values_survive_encoding() {
        for value in [
            json!({"sAMAccountName": "jdoe", "memberOf": ["cn=a", "cn=b"]}),
            json!(true),
            Value::Null,
        ] {
            let encoded = encode_slot(&value).unwrap();
            assert_eq!(decode_slot(Some(encoded)).unwrap(), Some(value));
        }
    }

    #[test]
    fn missing_key_decodes_as_absent() {
        assert_eq!(decode_slot(None).unwrap(), None);
    }

    #[test]
    fn corrupt_slot_is_a_serde_error() {
        assert!(matches!(
            decode_slot(Some("{not json".into())),
            Err(SessionError::Serde(_))
        ));
    }
}
