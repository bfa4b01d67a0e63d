//! 客户端持久化的重新认证 cookie

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CookieError;

mod http;
mod memory;
mod reauth;

pub use http::HttpCookieJar;
pub use memory::MemoryCookieStore;
pub use reauth::ReauthCookie;

/// 客户端 cookie 读写
#[async_trait]
pub trait CookieStore: Send + Sync {
    async fn get(&self, name: &str) -> Option<String>;

    async fn get_all(&self) -> HashMap<String, String>;

    async fn set(&self, name: &str, value: &str, expires: DateTime<Utc>) -> Result<(), CookieError>;

    async fn remove(&self, name: &str) -> Result<(), CookieError>;
}
