//! 目录服务能力边界
//!
//! 协议本身由外部实现，这里只定义绑定、搜索两个能力，
//! 以及在其上构建的凭据校验 [`LdapAuthenticate`]。

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DirectoryError;
use crate::models::UserInfo;

mod file;
pub mod filter;
mod ldap;

pub use file::{FileConnection, FileDirectory};
pub use ldap::LdapAuthenticate;

/// 目录服务，负责以用户凭据建立连接
#[async_trait]
pub trait Directory: Send + Sync {
    type Connection: DirectoryConnection;

    async fn bind(&self, login: &str, password: &str) -> Result<Self::Connection, DirectoryError>;
}

/// 已绑定的目录连接
#[async_trait]
pub trait DirectoryConnection: Send + Sync {
    async fn search(
        &self,
        base: &str,
        filter: &str,
        attributes: &[String],
    ) -> Result<Vec<DirectoryEntry>, DirectoryError>;
}

/// 搜索结果条目
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryEntry {
    pub dn: String,
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl DirectoryEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, values: &[&str]) -> Self {
        self.attributes
            .insert(name.into(), values.iter().map(|v| v.to_string()).collect());
        self
    }

    /// 单值属性转为字符串，多值属性转为数组，空属性丢弃
    pub fn into_user_info(self) -> UserInfo {
        let mut user = UserInfo::new();
        for (name, mut values) in self.attributes {
            let value = match values.len() {
                0 => continue,
                1 => Value::String(values.remove(0)),
                _ => Value::Array(values.into_iter().map(Value::String).collect()),
            };
            user.insert(name, value);
        }
        user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entry_maps_single_and_multi_valued_attributes() {
        let entry = DirectoryEntry::new("cn=jdoe,dc=corp")
            .with("sAMAccountName", &["jdoe"])
            .with("memberOf", &["cn=a", "cn=b"])
            .with("manager", &[]);

        let user = entry.into_user_info();
        assert_eq!(
            user.to_value(),
            json!({"sAMAccountName": "jdoe", "memberOf": ["cn=a", "cn=b"]})
        );
    }
}
