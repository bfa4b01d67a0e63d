use crate::auth::LoginHooks;
use crate::config::LdapConfig;
use crate::error::{AuthError, DirectoryError};
use crate::identity::{IdentityNormalizer, Lookup};
use crate::models::UserInfo;

use super::filter::person_filter;
use super::{Directory, DirectoryConnection};

/// 基于目录服务的凭据校验
pub struct LdapAuthenticate<D> {
    config: LdapConfig,
    directory: D,
    identity: IdentityNormalizer,
}

impl<D: Directory> LdapAuthenticate<D> {
    pub fn new(config: LdapConfig, directory: D) -> Self {
        let identity = IdentityNormalizer::new(config.domain.clone());
        Self {
            config,
            directory,
            identity,
        }
    }

    pub fn config(&self) -> &LdapConfig {
        &self.config
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn identity(&self) -> &IdentityNormalizer {
        &self.identity
    }

    /// 绑定目录、读取用户信息并执行附加检查
    ///
    /// `raw_username` 是用户输入的原始登录名，交给 `get_info` 做查询。
    pub async fn login<H>(
        &self,
        login_name: &str,
        password: &str,
        raw_username: &str,
        hooks: &H,
    ) -> Result<UserInfo, AuthError>
    where
        H: LoginHooks<D> + ?Sized,
    {
        let connection = self
            .directory
            .bind(login_name, password)
            .await
            .map_err(|e| {
                match &e {
                    DirectoryError::InvalidCredentials => {
                        tracing::info!(login = %login_name, "Directory rejected credentials")
                    }
                    DirectoryError::Unreachable(reason) => {
                        tracing::error!(reason = %reason, "Directory server unreachable")
                    }
                    other => tracing::error!(error = %other, "Directory bind failed"),
                }
                AuthError::from(e)
            })?;

        let user = hooks
            .get_info(self, &connection, raw_username)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Directory search failed");
                AuthError::from(e)
            })?
            .ok_or(AuthError::UserInfoUnavailable)?;

        hooks
            .additional_check(Some(&connection), &user)
            .await
            .map_err(AuthError::Rejected)?;

        Ok(user)
    }

    /// 默认的用户信息查询：邮箱按主体名，其余按账户名
    pub async fn get_info(
        &self,
        connection: &D::Connection,
        raw_username: &str,
    ) -> Result<Option<UserInfo>, DirectoryError> {
        match self.identity.lookup(raw_username) {
            Lookup::UserPrincipalName(upn) => {
                self.get_info_by_user_principal_name(connection, upn).await
            }
            Lookup::SamAccountName(name) => {
                self.get_info_by_sam_account_name(connection, name).await
            }
        }
    }

    pub async fn get_info_by_sam_account_name(
        &self,
        connection: &D::Connection,
        name: &str,
    ) -> Result<Option<UserInfo>, DirectoryError> {
        self.search_person(connection, "sAMAccountName", name).await
    }

    pub async fn get_info_by_user_principal_name(
        &self,
        connection: &D::Connection,
        principal_name: &str,
    ) -> Result<Option<UserInfo>, DirectoryError> {
        self.search_person(connection, "userPrincipalName", principal_name)
            .await
    }

    async fn search_person(
        &self,
        connection: &D::Connection,
        attribute: &str,
        value: &str,
    ) -> Result<Option<UserInfo>, DirectoryError> {
        let filter = person_filter(attribute, value);
        tracing::debug!(filter = %filter, base = %self.config.search_base, "Searching directory");

        let entries = connection
            .search(&self.config.search_base, &filter, &self.config.attributes)
            .await?;

        Ok(entries.into_iter().next().map(|entry| entry.into_user_info()))
    }
}
