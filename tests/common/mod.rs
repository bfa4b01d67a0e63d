#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use ldap_reauth::config::{Config, CookieConfig, LdapConfig};
use ldap_reauth::directory::filter::parse_conjunction;
use ldap_reauth::directory::{Directory, DirectoryConnection, DirectoryEntry};
use ldap_reauth::error::{AuthError, DirectoryError};
use ldap_reauth::ui::Payload;
use ldap_reauth::{LoginHooks, UserInfo};
use parking_lot::Mutex;
use serde_json::json;

pub const PASSWORD: &str = "s3cret";

pub fn jdoe_entry() -> DirectoryEntry {
    DirectoryEntry::new("cn=John Doe,ou=staff,dc=corp")
        .with("objectClass", &["person"])
        .with("sAMAccountName", &["jdoe"])
        .with("userPrincipalName", &["jdoe@corp.example.com"])
        .with("displayName", &["John Doe"])
}

pub fn jdoe() -> UserInfo {
    jdoe_entry().into_user_info()
}

pub fn asmith() -> UserInfo {
    DirectoryEntry::new("cn=Alice Smith,ou=staff,dc=corp")
        .with("sAMAccountName", &["asmith"])
        .with("displayName", &["Alice Smith"])
        .into_user_info()
}

/// 记录绑定次数的目录
pub struct CountingDirectory {
    logins: HashMap<String, String>,
    entries: Vec<DirectoryEntry>,
    binds: AtomicUsize,
    unreachable: bool,
}

impl CountingDirectory {
    pub fn new() -> Self {
        let logins = HashMap::from([
            ("CORP\\jdoe".to_string(), PASSWORD.to_string()),
            ("jdoe@corp.example.com".to_string(), PASSWORD.to_string()),
        ]);
        Self {
            logins,
            entries: vec![jdoe_entry()],
            binds: AtomicUsize::new(0),
            unreachable: false,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::new()
        }
    }

    pub fn bind_count(&self) -> usize {
        self.binds.load(Ordering::SeqCst)
    }
}

pub struct StubConnection {
    entries: Vec<DirectoryEntry>,
}

#[async_trait]
impl Directory for CountingDirectory {
    type Connection = StubConnection;

    async fn bind(&self, login: &str, password: &str) -> Result<StubConnection, DirectoryError> {
        self.binds.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(DirectoryError::Unreachable("connection refused".into()));
        }
        match self.logins.get(login) {
            Some(expected) if expected == password => Ok(StubConnection {
                entries: self.entries.clone(),
            }),
            _ => Err(DirectoryError::InvalidCredentials),
        }
    }
}

#[async_trait]
impl DirectoryConnection for StubConnection {
    async fn search(
        &self,
        _base: &str,
        filter: &str,
        _attributes: &[String],
    ) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        let terms = parse_conjunction(filter)
            .ok_or_else(|| DirectoryError::Protocol(format!("bad filter {filter}")))?;
        Ok(self
            .entries
            .iter()
            .filter(|entry| {
                terms.iter().all(|(name, value)| {
                    entry
                        .attributes
                        .get(name)
                        .is_some_and(|values| values.iter().any(|v| v == value))
                })
            })
            .cloned()
            .collect())
    }
}

/// 可拒绝指定账户、可否决登录的钩子，记录附加检查是否收到连接
#[derive(Default)]
pub struct RecordingHooks {
    pub reject_account: Option<String>,
    pub veto: Option<String>,
    checks: Mutex<Vec<bool>>,
}

impl RecordingHooks {
    pub fn rejecting(account: &str) -> Self {
        Self {
            reject_account: Some(account.to_string()),
            ..Self::default()
        }
    }

    pub fn vetoing(message: &str) -> Self {
        Self {
            veto: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// 每次附加检查时连接是否存在
    pub fn checks(&self) -> Vec<bool> {
        self.checks.lock().clone()
    }
}

#[async_trait]
impl LoginHooks<CountingDirectory> for RecordingHooks {
    async fn additional_check(
        &self,
        connection: Option<&StubConnection>,
        user: &UserInfo,
    ) -> Result<(), String> {
        self.checks.lock().push(connection.is_some());
        match &self.reject_account {
            Some(account) if user.get_str("sAMAccountName") == Some(account.as_str()) => {
                Err("Account is disabled".to_string())
            }
            _ => Ok(()),
        }
    }

    async fn callback(&self, result: &Result<UserInfo, AuthError>) -> Option<String> {
        match result {
            Ok(_) => self.veto.clone(),
            Err(_) => None,
        }
    }
}

pub fn cookie_config(auto_renewal: bool) -> CookieConfig {
    CookieConfig {
        auto_renewal,
        ..CookieConfig::new("reauth", "cookie-signing-key")
    }
}

pub fn config(cookie: Option<CookieConfig>) -> Config {
    let config = Config::new(LdapConfig {
        server_path: "ldaps://dc.corp.example.com".into(),
        domain: "CORP".into(),
        search_base: "dc=corp".into(),
        attributes: vec!["sAMAccountName".into(), "displayName".into()],
        use_ssl: true,
    });
    match cookie {
        Some(cookie) => config.with_cookie(cookie),
        None => config,
    }
}

pub fn signin(username: &str, password: &str, remember: bool) -> Payload {
    Payload::Json(json!({
        "event": "signin",
        "username": username,
        "password": password,
        "remember": remember
    }))
}

pub fn signout() -> Payload {
    Payload::Json(json!({"event": "signout"}))
}
