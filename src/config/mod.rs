use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::utils::seconds;

mod forms;

pub use forms::{
    DEFAULT_LOGIN_BUSY_MESSAGE, DEFAULT_LOGOUT_BUSY_MESSAGE, DEFAULT_LOGOUT_SLEEP_SEC, LoginConfig,
    LoginForm, LogoutConfig, LogoutForm,
};

/// cookie 有效期上限（天）
pub const MAX_EXPIRY_DAYS: f64 = 36_500.0;

const DEFAULT_ATTRIBUTES: [&str; 6] = [
    "sAMAccountName",
    "distinguishedName",
    "userPrincipalName",
    "displayName",
    "manager",
    "title",
];

/// 目录服务连接参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapConfig {
    pub server_path: String,
    pub domain: String,
    pub search_base: String,
    #[serde(default = "default_attributes")]
    pub attributes: Vec<String>,
    #[serde(default = "default_true")]
    pub use_ssl: bool,
}

/// 会话状态槽位名称
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStateConfig {
    #[serde(default = "default_user_key")]
    pub user: String,
    #[serde(default = "default_remember_me_key")]
    pub remember_me: String,
    #[serde(default = "default_auth_result_key")]
    pub auth_result: String,
}

impl Default for SessionStateConfig {
    fn default() -> Self {
        Self {
            user: default_user_key(),
            remember_me: default_remember_me_key(),
            auth_result: default_auth_result_key(),
        }
    }
}

/// 重新认证 cookie 配置，缺省时禁用 cookie 重新认证
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    pub name: String,
    pub key: String,
    #[serde(default = "default_expiry_days")]
    pub expiry_days: f64,
    #[serde(default = "default_true")]
    pub auto_renewal: bool,
    #[serde(default = "default_delay_sec")]
    pub delay_sec: f64,
}

impl CookieConfig {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            expiry_days: default_expiry_days(),
            auto_renewal: true,
            delay_sec: default_delay_sec(),
        }
    }

    /// 写入或删除 cookie 后的等待时间
    pub fn delay(&self) -> Duration {
        seconds(self.delay_sec)
    }

    /// 有效期必须是有限值且不超过 [`MAX_EXPIRY_DAYS`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.expiry_days.is_finite() || self.expiry_days.abs() > MAX_EXPIRY_DAYS {
            return Err(ConfigError::Invalid {
                var: "COOKIE_EXPIRY_DAYS",
                value: self.expiry_days.to_string(),
            });
        }
        Ok(())
    }
}

/// 表单载荷加密密钥位置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptorConfig {
    pub folder_path: String,
    pub key_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub ldap: LdapConfig,
    #[serde(default)]
    pub session: SessionStateConfig,
    #[serde(default)]
    pub cookie: Option<CookieConfig>,
    #[serde(default)]
    pub encryptor: Option<EncryptorConfig>,
}

impl Config {
    pub fn new(ldap: LdapConfig) -> Self {
        Self {
            ldap,
            session: SessionStateConfig::default(),
            cookie: None,
            encryptor: None,
        }
    }

    pub fn with_cookie(mut self, cookie: CookieConfig) -> Self {
        self.cookie = Some(cookie);
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let ldap = LdapConfig {
            server_path: required("LDAP_SERVER_PATH")?,
            domain: required("LDAP_DOMAIN")?,
            search_base: required("LDAP_SEARCH_BASE")?,
            attributes: match optional("LDAP_ATTRIBUTES") {
                Some(list) => list
                    .split(',')
                    .map(str::trim)
                    .filter(|attr| !attr.is_empty())
                    .map(String::from)
                    .collect(),
                None => default_attributes(),
            },
            use_ssl: parsed("LDAP_USE_SSL", true)?,
        };

        let session = SessionStateConfig {
            user: optional("SESSION_USER_KEY").unwrap_or_else(default_user_key),
            remember_me: optional("SESSION_REMEMBER_ME_KEY").unwrap_or_else(default_remember_me_key),
            auth_result: optional("SESSION_AUTH_RESULT_KEY").unwrap_or_else(default_auth_result_key),
        };

        let cookie = match optional("COOKIE_NAME") {
            Some(name) => {
                let cookie = CookieConfig {
                    name,
                    key: required("COOKIE_KEY")?,
                    expiry_days: parsed("COOKIE_EXPIRY_DAYS", default_expiry_days())?,
                    auto_renewal: parsed("COOKIE_AUTO_RENEWAL", true)?,
                    delay_sec: parsed("COOKIE_DELAY_SEC", default_delay_sec())?,
                };
                cookie.validate()?;
                Some(cookie)
            }
            None => None,
        };

        let encryptor = match (optional("ENCRYPTOR_FOLDER_PATH"), optional("ENCRYPTOR_KEY_NAME")) {
            (Some(folder_path), Some(key_name)) => Some(EncryptorConfig {
                folder_path,
                key_name,
            }),
            _ => None,
        };

        Ok(Config {
            ldap,
            session,
            cookie,
            encryptor,
        })
    }
}

fn optional(var: &'static str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    optional(var).ok_or(ConfigError::Missing(var))
}

fn parsed<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}

fn default_attributes() -> Vec<String> {
    DEFAULT_ATTRIBUTES.iter().map(|attr| attr.to_string()).collect()
}

fn default_true() -> bool {
    true
}

fn default_user_key() -> String {
    "user".into()
}

fn default_remember_me_key() -> String {
    "remember_me".into()
}

fn default_auth_result_key() -> String {
    "authResult".into()
}

fn default_expiry_days() -> f64 {
    30.0
}

fn default_delay_sec() -> f64 {
    0.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_config_defaults_fill_missing_fields() {
        let config: CookieConfig =
            serde_json::from_str(r#"{"name": "reauth", "key": "secret"}"#).unwrap();
        assert_eq!(config.expiry_days, 30.0);
        assert!(config.auto_renewal);
        assert_eq!(config.delay(), Duration::from_millis(100));
    }

    #[test]
    fn cookie_expiry_must_be_finite_and_bounded() {
        let mut config = CookieConfig::new("reauth", "secret");
        assert!(config.validate().is_ok());

        config.expiry_days = -1.0;
        assert!(config.validate().is_ok());

        for expiry_days in [1.0e9, -1.0e9, f64::NAN, f64::INFINITY] {
            config.expiry_days = expiry_days;
            assert!(matches!(
                config.validate(),
                Err(ConfigError::Invalid {
                    var: "COOKIE_EXPIRY_DAYS",
                    ..
                })
            ));
        }
    }

    #[test]
    fn config_without_cookie_section_disables_cookie() {
        let config: Config = serde_json::from_str(
            r#"{"ldap": {"server_path": "ldap://dc", "domain": "CORP", "search_base": "dc=corp"}}"#,
        )
        .unwrap();
        assert!(config.cookie.is_none());
        assert!(config.ldap.use_ssl);
        assert_eq!(config.ldap.attributes.len(), DEFAULT_ATTRIBUTES.len());
        assert_eq!(config.session.user, "user");
        assert_eq!(config.session.remember_me, "remember_me");
    }
}
