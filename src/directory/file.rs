use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::DirectoryError;
use crate::identity::LoginIdentity;

use super::filter::parse_conjunction;
use super::{Directory, DirectoryConnection, DirectoryEntry};

/// 开发和测试用的文件目录，密码以 bcrypt 哈希保存
///
/// ```json
/// {"users": [{"dn": "cn=jdoe,dc=corp", "password_hash": "$2b$...",
///   "attributes": {"objectClass": ["person"], "sAMAccountName": ["jdoe"]}}]}
/// ```
#[derive(Debug, Clone)]
pub struct FileDirectory {
    domain: String,
    entries: Arc<Vec<FileUser>>,
}

#[derive(Debug, Clone, Deserialize)]
struct FileUser {
    dn: String,
    password_hash: String,
    #[serde(default)]
    attributes: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct FileSource {
    users: Vec<FileUser>,
}

impl FileUser {
    fn first(&self, attribute: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(attribute))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }

    fn matches(&self, attribute: &str, value: &str) -> bool {
        self.attributes
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(attribute))
            .flat_map(|(_, values)| values)
            .any(|v| v.eq_ignore_ascii_case(value))
    }

    fn to_entry(&self, requested: &[String]) -> DirectoryEntry {
        let mut entry = DirectoryEntry::new(self.dn.clone());
        for (name, values) in &self.attributes {
            if requested.is_empty() || requested.iter().any(|r| r.eq_ignore_ascii_case(name)) {
                entry.attributes.insert(name.clone(), values.clone());
            }
        }
        if requested
            .iter()
            .any(|r| r.eq_ignore_ascii_case("distinguishedName"))
        {
            entry
                .attributes
                .entry("distinguishedName".into())
                .or_insert_with(|| vec![self.dn.clone()]);
        }
        entry
    }
}

impl FileDirectory {
    pub fn from_json(domain: impl Into<String>, json: &str) -> Result<Self, DirectoryError> {
        let source: FileSource =
            serde_json::from_str(json).map_err(|e| DirectoryError::Source(e.to_string()))?;
        tracing::info!(users = source.users.len(), "Loaded file directory");
        Ok(Self {
            domain: domain.into(),
            entries: Arc::new(source.users),
        })
    }

    pub fn from_path(domain: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let json = std::fs::read_to_string(path.as_ref())
            .map_err(|e| DirectoryError::Source(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_json(domain, &json)
    }

    fn find(&self, login: &str) -> Option<&FileUser> {
        match LoginIdentity::classify(login) {
            LoginIdentity::Email(upn) => self
                .entries
                .iter()
                .find(|user| user.matches("userPrincipalName", upn)),
            LoginIdentity::Qualified { domain, name } if domain.eq_ignore_ascii_case(&self.domain) => self
                .entries
                .iter()
                .find(|user| user.matches("sAMAccountName", name)),
            _ => None,
        }
    }
}

#[async_trait]
impl Directory for FileDirectory {
    type Connection = FileConnection;

    async fn bind(&self, login: &str, password: &str) -> Result<FileConnection, DirectoryError> {
        let user = self.find(login).ok_or(DirectoryError::InvalidCredentials)?;

        match bcrypt::verify(password, &user.password_hash) {
            Ok(true) => {
                tracing::debug!(
                    login = %login,
                    account = user.first("sAMAccountName").unwrap_or_default(),
                    "File directory bind succeeded"
                );
                Ok(FileConnection {
                    entries: Arc::clone(&self.entries),
                })
            }
            Ok(false) => Err(DirectoryError::InvalidCredentials),
            Err(e) => Err(DirectoryError::Protocol(e.to_string())),
        }
    }
}

/// 文件目录的已绑定连接
#[derive(Debug, Clone)]
pub struct FileConnection {
    entries: Arc<Vec<FileUser>>,
}

#[async_trait]
impl DirectoryConnection for FileConnection {
    async fn search(
        &self,
        _base: &str,
        filter: &str,
        attributes: &[String],
    ) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        let terms = parse_conjunction(filter)
            .ok_or_else(|| DirectoryError::Protocol(format!("unsupported filter: {filter}")))?;

        Ok(self
            .entries
            .iter()
            .filter(|user| terms.iter().all(|(name, value)| user.matches(name, value)))
            .map(|user| user.to_entry(attributes))
            .collect())
    }
}
