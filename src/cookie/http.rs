use std::collections::HashMap;

use async_trait::async_trait;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use time::OffsetDateTime;

use crate::error::CookieError;

use super::CookieStore;

/// 基于 axum-extra `CookieJar` 的 cookie 存储
///
/// 读取请求中的 cookie，写入累积为响应的 `Set-Cookie`，
/// 处理结束后用 [`HttpCookieJar::into_jar`] 取回并放入响应。
pub struct HttpCookieJar {
    jar: Mutex<CookieJar>,
    secure: bool,
}

impl HttpCookieJar {
    pub fn new(jar: CookieJar) -> Self {
        Self {
            jar: Mutex::new(jar),
            secure: false,
        }
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn into_jar(self) -> CookieJar {
        self.jar.into_inner()
    }
}

#[async_trait]
impl CookieStore for HttpCookieJar {
    async fn get(&self, name: &str) -> Option<String> {
        self.jar.lock().get(name).map(|c| c.value().to_string())
    }

    async fn get_all(&self) -> HashMap<String, String> {
        self.jar
            .lock()
            .iter()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect()
    }

    async fn set(&self, name: &str, value: &str, expires: DateTime<Utc>) -> Result<(), CookieError> {
        let expires = OffsetDateTime::from_unix_timestamp(expires.timestamp())
            .map_err(|e| CookieError::Expiry(e.to_string()))?;

        let cookie = Cookie::build((name.to_string(), value.to_string()))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .expires(expires);

        let mut jar = self.jar.lock();
        *jar = jar.clone().add(cookie);
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), CookieError> {
        let cookie = Cookie::build((name.to_string(), String::new())).path("/");

        let mut jar = self.jar.lock();
        *jar = jar.clone().remove(cookie);
        Ok(())
    }
}
