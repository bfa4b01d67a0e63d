use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::CookieError;

use super::CookieStore;

#[derive(Debug, Clone)]
struct StoredCookie {
    value: String,
    expires: DateTime<Utc>,
}

/// 进程内 cookie 存储，过期的 cookie 对读取不可见
#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    cookies: Mutex<HashMap<String, StoredCookie>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 不计入读取次数的查看
    pub fn peek(&self, name: &str) -> Option<String> {
        self.live(name)
    }

    pub fn expires(&self, name: &str) -> Option<DateTime<Utc>> {
        self.cookies.lock().get(name).map(|c| c.expires)
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    fn live(&self, name: &str) -> Option<String> {
        let now = Utc::now();
        self.cookies
            .lock()
            .get(name)
            .filter(|c| c.expires > now)
            .map(|c| c.value.clone())
    }
}

#[async_trait]
impl CookieStore for MemoryCookieStore {
    async fn get(&self, name: &str) -> Option<String> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.live(name)
    }

    async fn get_all(&self) -> HashMap<String, String> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now();
        self.cookies
            .lock()
            .iter()
            .filter(|(_, c)| c.expires > now)
            .map(|(name, c)| (name.clone(), c.value.clone()))
            .collect()
    }

    async fn set(&self, name: &str, value: &str, expires: DateTime<Utc>) -> Result<(), CookieError> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.cookies.lock().insert(
            name.to_string(),
            StoredCookie {
                value: value.to_string(),
                expires,
            },
        );
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), CookieError> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.cookies.lock().remove(name);
        Ok(())
    }
}
