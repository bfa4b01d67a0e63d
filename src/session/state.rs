use serde_json::Value;

use crate::config::SessionStateConfig;
use crate::error::SessionError;
use crate::models::UserInfo;

use super::SessionStore;

/// 会话槽位的类型化访问，读取失败一律视为缺失
pub struct SessionState<'a, S: ?Sized> {
    store: &'a S,
    config: &'a SessionStateConfig,
}

impl<'a, S: SessionStore + ?Sized> SessionState<'a, S> {
    pub fn new(store: &'a S, config: &'a SessionStateConfig) -> Self {
        Self { store, config }
    }

    async fn read(&self, key: &str) -> Option<Value> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Failed to read session slot");
                None
            }
        }
    }

    /// 当前用户；槽位不是 JSON 对象时返回 `None`
    pub async fn user(&self) -> Option<UserInfo> {
        self.read(&self.config.user).await.and_then(UserInfo::from_value)
    }

    pub async fn set_user(&self, user: Option<&UserInfo>) -> Result<(), SessionError> {
        let value = user.map(UserInfo::to_value).unwrap_or(Value::Null);
        self.store.set(&self.config.user, value).await
    }

    /// 记住我标志，缺失或类型不对时写入并返回 `true`
    pub async fn remember_me(&self) -> bool {
        if let Some(Value::Bool(remember_me)) = self.read(&self.config.remember_me).await {
            return remember_me;
        }

        if let Err(e) = self.set_remember_me(true).await {
            tracing::warn!(error = %e, "Failed to store default remember_me");
        }
        true
    }

    /// 删除上一次表单提交结果
    pub async fn clear_auth_result(&self) -> Result<(), SessionError> {
        self.store.remove(&self.config.auth_result).await
    }

    pub async fn set_remember_me(&self, remember_me: bool) -> Result<(), SessionError> {
        self.store
            .set(&self.config.remember_me, Value::Bool(remember_me))
            .await
    }
}
