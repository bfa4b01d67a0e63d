use async_trait::async_trait;

use crate::directory::{Directory, LdapAuthenticate};
use crate::error::{AuthError, DirectoryError};
use crate::identity::IdentityNormalizer;
use crate::models::{SignoutEvent, UserInfo};

/// 登录流程中可由应用覆盖的策略，全部带默认实现
#[async_trait]
pub trait LoginHooks<D: Directory>: Send + Sync {
    /// 附加认证检查，`Err` 中是拒绝原因
    ///
    /// 会话和 cookie 重新认证时 `connection` 为 `None`。
    async fn additional_check(
        &self,
        _connection: Option<&D::Connection>,
        _user: &UserInfo,
    ) -> Result<(), String> {
        Ok(())
    }

    /// 把用户输入转换为目录绑定名
    fn login_user_name(&self, identity: &IdentityNormalizer, raw_username: &str) -> String {
        identity.login_user_name(raw_username)
    }

    /// 从目录读取用户信息
    async fn get_info(
        &self,
        ldap: &LdapAuthenticate<D>,
        connection: &D::Connection,
        raw_username: &str,
    ) -> Result<Option<UserInfo>, DirectoryError> {
        ldap.get_info(connection, raw_username).await
    }

    /// 登录结果回调，返回 `Some(message)` 否决本次登录
    async fn callback(&self, _result: &Result<UserInfo, AuthError>) -> Option<String> {
        None
    }
}

/// 不做任何覆盖
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl<D: Directory> LoginHooks<D> for DefaultHooks {}

/// 登出回调的决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutDecision {
    Proceed,
    Cancel,
}

/// 登出回调
pub trait LogoutCallback: Send + Sync {
    fn on_signout(&self, event: &SignoutEvent) -> LogoutDecision;
}

impl<F> LogoutCallback for F
where
    F: Fn(&SignoutEvent) -> LogoutDecision + Send + Sync,
{
    fn on_signout(&self, event: &SignoutEvent) -> LogoutDecision {
        self(event)
    }
}
