use chrono::Utc;

use crate::config::CookieConfig;
use crate::error::CookieError;
use crate::models::UserInfo;
use crate::token::TokenCodec;
use crate::utils::add_days;

use super::CookieStore;

/// 重新认证 cookie 的读写
///
/// 每次写入或删除后等待 `delay_sec`，保证下一次渲染前客户端已提交变更。
pub struct ReauthCookie<'a, C: ?Sized> {
    store: &'a C,
    codec: &'a TokenCodec,
    config: &'a CookieConfig,
}

impl<'a, C: CookieStore + ?Sized> ReauthCookie<'a, C> {
    pub fn new(store: &'a C, codec: &'a TokenCodec, config: &'a CookieConfig) -> Self {
        Self {
            store,
            codec,
            config,
        }
    }

    /// cookie 中的用户，令牌缺失或无效时为 `None`
    pub async fn user(&self) -> Option<UserInfo> {
        let token = self.store.get(&self.config.name).await;
        self.codec.decode(token.as_deref())
    }

    pub async fn set_user(&self, user: &UserInfo) -> Result<(), CookieError> {
        let now = Utc::now();
        let expires = add_days(now, self.config.expiry_days).ok_or_else(|| {
            CookieError::Expiry(format!("{} days is out of range", self.config.expiry_days))
        })?;
        let token = self.codec.encode_at(user, now)?;

        self.store.set(&self.config.name, &token, expires).await?;
        tracing::debug!(name = %self.config.name, expires = %expires, "Reauthentication cookie set");

        tokio::time::sleep(self.config.delay()).await;
        Ok(())
    }

    /// 仅在 cookie 存在时删除
    pub async fn delete(&self) -> Result<(), CookieError> {
        let cookies = self.store.get_all().await;
        if !cookies.contains_key(&self.config.name) {
            return Ok(());
        }

        self.store.remove(&self.config.name).await?;
        tracing::debug!(name = %self.config.name, "Reauthentication cookie removed");

        tokio::time::sleep(self.config.delay()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::MemoryCookieStore;
    use std::time::Duration;

    fn config() -> CookieConfig {
        CookieConfig::new("reauth", "secret")
    }

    #[tokio::test(start_paused = true)]
    async fn set_then_read_user() {
        let store = MemoryCookieStore::new();
        let config = config();
        let codec = TokenCodec::new(&config);
        let cookie = ReauthCookie::new(&store, &codec, &config);

        assert!(cookie.user().await.is_none());

        let user = UserInfo::new().with("sAMAccountName", "jdoe");
        cookie.set_user(&user).await.unwrap();
        assert_eq!(cookie.user().await, Some(user));

        let expires = store.expires("reauth").unwrap();
        let remaining = expires - Utc::now();
        assert!(remaining > chrono::Duration::days(29));
    }

    #[tokio::test(start_paused = true)]
    async fn delete_only_writes_when_present() {
        let store = MemoryCookieStore::new();
        let config = config();
        let codec = TokenCodec::new(&config);
        let cookie = ReauthCookie::new(&store, &codec, &config);

        cookie.delete().await.unwrap();
        assert_eq!(store.write_count(), 0);

        cookie
            .set_user(&UserInfo::new().with("sAMAccountName", "jdoe"))
            .await
            .unwrap();
        cookie.delete().await.unwrap();
        assert_eq!(store.write_count(), 2);
        assert!(store.peek("reauth").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn writes_wait_for_propagation_delay() {
        let store = MemoryCookieStore::new();
        let config = CookieConfig {
            delay_sec: 0.25,
            ..config()
        };
        let codec = TokenCodec::new(&config);
        let cookie = ReauthCookie::new(&store, &codec, &config);

        let start = tokio::time::Instant::now();
        cookie
            .set_user(&UserInfo::new().with("sAMAccountName", "jdoe"))
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(250));

        let start = tokio::time::Instant::now();
        cookie.delete().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(250));

        // 没有 cookie 时删除不等待
        let start = tokio::time::Instant::now();
        cookie.delete().await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_range_expiry_is_reported_without_writing() {
        let store = MemoryCookieStore::new();
        let config = CookieConfig {
            expiry_days: 1.0e9,
            ..config()
        };
        let codec = TokenCodec::new(&config);
        let cookie = ReauthCookie::new(&store, &codec, &config);

        let result = cookie
            .set_user(&UserInfo::new().with("sAMAccountName", "jdoe"))
            .await;
        assert!(matches!(result, Err(CookieError::Expiry(_))));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn garbage_cookie_reads_as_absent() {
        let store = MemoryCookieStore::new();
        let config = config();
        let codec = TokenCodec::new(&config);
        store
            .set("reauth", "garbage", Utc::now() + chrono::Duration::days(1))
            .await
            .unwrap();

        let cookie = ReauthCookie::new(&store, &codec, &config);
        assert!(cookie.user().await.is_none());
    }
}
