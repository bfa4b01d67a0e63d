//! 重新认证决策引擎
//!
//! 每次渲染调用一次 [`Authenticator::login`]，依次检查：
//! 会话状态 → 客户端 cookie → 登录表单。登录或登出成功后返回
//! [`Flow::Rerun`]，宿主必须重新开始渲染周期。

use std::time::Duration;

use crate::config::{
    Config, CookieConfig, EncryptorConfig, LoginConfig, LogoutConfig, SessionStateConfig,
};
use crate::cookie::{CookieStore, ReauthCookie};
use crate::directory::{Directory, LdapAuthenticate};
use crate::error::AuthError;
use crate::models::{AuthEvent, Flow, SignoutEvent, UserInfo};
use crate::session::{SessionState, SessionStore};
use crate::token::TokenCodec;
use crate::ui::{AuthUi, NoDecryptor, Payload, PayloadDecryptor, SigninDefaults};

mod context;
mod hooks;

pub use context::RenderContext;
pub use hooks::{DefaultHooks, LoginHooks, LogoutCallback, LogoutDecision};

/// 显示登录表单前的等待，避免状态尚未就绪时闪现表单
pub const LOGIN_DEBOUNCE: Duration = Duration::from_millis(500);

pub struct Authenticator<D, K = NoDecryptor> {
    session_config: SessionStateConfig,
    cookie_config: Option<CookieConfig>,
    codec: Option<TokenCodec>,
    ldap: LdapAuthenticate<D>,
    encryptor: Option<EncryptorConfig>,
    decryptor: Option<K>,
    login_debounce: Duration,
}

impl<D: Directory> Authenticator<D> {
    pub fn new(config: Config, directory: D) -> Self {
        let codec = config.cookie.as_ref().map(TokenCodec::new);
        if config.cookie.is_none() {
            tracing::info!("Cookie reauthentication disabled");
        }
        if let Some(encryptor) = &config.encryptor {
            tracing::debug!(key = %encryptor.key_name, "Form payload encryptor configured");
        }

        Self {
            session_config: config.session,
            cookie_config: config.cookie,
            codec,
            ldap: LdapAuthenticate::new(config.ldap, directory),
            encryptor: config.encryptor,
            decryptor: None,
            login_debounce: LOGIN_DEBOUNCE,
        }
    }
}

impl<D: Directory, K: PayloadDecryptor> Authenticator<D, K> {
    pub fn with_decryptor<K2: PayloadDecryptor>(self, decryptor: K2) -> Authenticator<D, K2> {
        Authenticator {
            session_config: self.session_config,
            cookie_config: self.cookie_config,
            codec: self.codec,
            ldap: self.ldap,
            encryptor: self.encryptor,
            decryptor: Some(decryptor),
            login_debounce: self.login_debounce,
        }
    }

    pub fn with_login_debounce(mut self, debounce: Duration) -> Self {
        self.login_debounce = debounce;
        self
    }

    pub fn ldap(&self) -> &LdapAuthenticate<D> {
        &self.ldap
    }

    pub fn session_configs(&self) -> &SessionStateConfig {
        &self.session_config
    }

    pub fn cookie_configs(&self) -> Option<&CookieConfig> {
        self.cookie_config.as_ref()
    }

    /// 配置了加密但没有通过 `with_decryptor` 提供解密器
    pub fn requires_decryptor(&self) -> bool {
        self.encryptor.is_some() && self.decryptor.is_none()
    }

    /// 认证当前用户，必要时渲染登录表单
    ///
    /// 返回 `Continue(Some(user))` 表示已认证，`Continue(None)` 表示本周期未认证，
    /// `Rerun` 表示刚完成登录，状态已写入，需重新渲染。
    pub async fn login<S, C, U, H>(
        &self,
        cx: &RenderContext<'_, S, C, U>,
        hooks: &H,
        config: &LoginConfig,
    ) -> Flow<Option<UserInfo>>
    where
        S: SessionStore + ?Sized,
        C: CookieStore + ?Sized,
        U: AuthUi + ?Sized,
        H: LoginHooks<D> + ?Sized,
    {
        let session = self.session(cx.session);

        if let Some(user) = session.user().await {
            if self.check_reauthentication(cx, &user, hooks).await {
                tracing::debug!("Reauthenticated from session state");
                return Flow::Continue(Some(user));
            }
        }

        if let Some(user) = self.get_cookie(cx.cookies).await {
            if self.check_reauthentication(cx, &user, hooks).await {
                tracing::debug!("Reauthenticated from cookie");
                self.set_user(cx.session, Some(&user)).await;
                return Flow::Continue(Some(user));
            }
        }

        tokio::time::sleep(self.login_debounce).await;

        let Some(user) = self.create_login_form(cx, hooks, config).await else {
            return Flow::Continue(None);
        };

        self.set_user(cx.session, Some(&user)).await;
        self.set_cookie(cx, &user).await;
        tracing::info!(account = ?user.get_str("sAMAccountName"), "User logged in");
        Flow::Rerun
    }

    /// 使用默认回调的登出
    pub async fn logout<S, C, U>(
        &self,
        cx: &RenderContext<'_, S, C, U>,
        config: &LogoutConfig,
    ) -> Flow<()>
    where
        S: SessionStore + ?Sized,
        C: CookieStore + ?Sized,
        U: AuthUi + ?Sized,
    {
        self.logout_with(cx, config, &|_: &SignoutEvent| LogoutDecision::Proceed)
            .await
    }

    /// 渲染登出表单；提交后清除会话用户、删除 cookie 并要求重新渲染
    ///
    /// 回调返回 [`LogoutDecision::Cancel`] 时状态不变。
    pub async fn logout_with<S, C, U, F>(
        &self,
        cx: &RenderContext<'_, S, C, U>,
        config: &LogoutConfig,
        callback: &F,
    ) -> Flow<()>
    where
        S: SessionStore + ?Sized,
        C: CookieStore + ?Sized,
        U: AuthUi + ?Sized,
        F: LogoutCallback + ?Sized,
    {
        let form = config.resolve();

        let Some(payload) = cx.ui.signout_form(&form.form).await else {
            return Flow::Continue(());
        };
        let Some(AuthEvent::Signout(event)) = self.read_event(cx.ui, payload) else {
            return Flow::Continue(());
        };

        cx.ui.set_busy(Some(&form.busy_message));
        if callback.on_signout(&event) == LogoutDecision::Cancel {
            tracing::info!("Logout cancelled by callback");
            cx.ui.set_busy(None);
            return Flow::Continue(());
        }

        self.set_user_none(cx.session).await;
        self.delete_cookie(cx.cookies).await;
        // 等待浏览器删除 cookie
        tokio::time::sleep(form.sleep).await;
        cx.ui.set_busy(None);
        self.clear_result(cx).await;

        tracing::info!("User logged out");
        Flow::Rerun
    }

    pub async fn set_user_none<S: SessionStore + ?Sized>(&self, store: &S) {
        self.set_user(store, None).await;
    }

    /// 删除重新认证 cookie（未启用 cookie 时无操作）
    pub async fn delete_cookie<C: CookieStore + ?Sized>(&self, store: &C) {
        let Some(cookie) = self.cookie(store) else {
            return;
        };
        if let Err(e) = cookie.delete().await {
            tracing::warn!(error = %e, "Failed to delete reauthentication cookie");
        }
    }

    /// 清除表单结果以及会话中保存的提交结果
    async fn clear_result<S, C, U>(&self, cx: &RenderContext<'_, S, C, U>)
    where
        S: SessionStore + ?Sized,
        C: CookieStore + ?Sized,
        U: AuthUi + ?Sized,
    {
        cx.ui.clear_result();
        if let Err(e) = self.session(cx.session).clear_auth_result().await {
            tracing::warn!(error = %e, "Failed to clear auth result from session state");
        }
    }

    fn session<'a, S: SessionStore + ?Sized>(&'a self, store: &'a S) -> SessionState<'a, S> {
        SessionState::new(store, &self.session_config)
    }

    fn cookie<'a, C: CookieStore + ?Sized>(&'a self, store: &'a C) -> Option<ReauthCookie<'a, C>> {
        let config = self.cookie_config.as_ref()?;
        let codec = self.codec.as_ref()?;
        Some(ReauthCookie::new(store, codec, config))
    }

    async fn get_cookie<C: CookieStore + ?Sized>(&self, store: &C) -> Option<UserInfo> {
        self.cookie(store)?.user().await
    }

    async fn set_user<S: SessionStore + ?Sized>(&self, store: &S, user: Option<&UserInfo>) {
        if let Err(e) = self.session(store).set_user(user).await {
            tracing::warn!(error = %e, "Failed to write user to session state");
        }
    }

    /// 记住我为真时写入 cookie
    async fn set_cookie<S, C, U>(&self, cx: &RenderContext<'_, S, C, U>, user: &UserInfo)
    where
        S: SessionStore + ?Sized,
        C: CookieStore + ?Sized,
        U: AuthUi + ?Sized,
    {
        let Some(cookie) = self.cookie(cx.cookies) else {
            return;
        };
        if !self.session(cx.session).remember_me().await {
            return;
        }
        if let Err(e) = cookie.set_user(user).await {
            tracing::warn!(error = %e, "Failed to set reauthentication cookie");
        }
    }

    /// 会话或 cookie 中的候选用户是否仍然有效，通过时按配置续期 cookie
    async fn check_reauthentication<S, C, U, H>(
        &self,
        cx: &RenderContext<'_, S, C, U>,
        user: &UserInfo,
        hooks: &H,
    ) -> bool
    where
        S: SessionStore + ?Sized,
        C: CookieStore + ?Sized,
        U: AuthUi + ?Sized,
        H: LoginHooks<D> + ?Sized,
    {
        if let Err(reason) = hooks.additional_check(None, user).await {
            tracing::debug!(reason = %reason, "Additional check rejected reauthentication");
            return false;
        }

        if self
            .cookie_config
            .as_ref()
            .is_some_and(|config| config.auto_renewal)
        {
            self.set_cookie(cx, user).await;
        }
        true
    }

    async fn create_login_form<S, C, U, H>(
        &self,
        cx: &RenderContext<'_, S, C, U>,
        hooks: &H,
        config: &LoginConfig,
    ) -> Option<UserInfo>
    where
        S: SessionStore + ?Sized,
        C: CookieStore + ?Sized,
        U: AuthUi + ?Sized,
        H: LoginHooks<D> + ?Sized,
    {
        let session = self.session(cx.session);
        let defaults = match self.cookie_config {
            Some(_) => Some(SigninDefaults {
                remember: session.remember_me().await,
            }),
            None => None,
        };
        let form = config.resolve(self.cookie_config.is_some());

        let payload = cx.ui.signin_form(defaults, &form.form).await?;
        let AuthEvent::Signin(event) = self.read_event(cx.ui, payload)? else {
            return None;
        };

        if let Err(e) = session.set_remember_me(event.remember).await {
            tracing::warn!(error = %e, "Failed to store remember_me");
        }

        cx.ui.set_busy(Some(&form.busy_message));
        let login_name = hooks.login_user_name(self.ldap.identity(), &event.username);
        let mut result = self
            .ldap
            .login(&login_name, &event.password, &event.username, hooks)
            .await;

        if let Some(message) = hooks.callback(&result).await {
            result = Err(AuthError::Rejected(message));
        }
        cx.ui.set_busy(None);

        match result {
            Ok(user) => {
                self.clear_result(cx).await;
                Some(user)
            }
            Err(e) => {
                tracing::info!(login = %login_name, error = %e, "Login failed");
                cx.ui.show_error(&e.to_string(), form.error_icon.as_deref());
                None
            }
        }
    }

    /// 解析表单载荷；解密失败属于集成错误，显示诊断信息
    fn read_event<U: AuthUi + ?Sized>(&self, ui: &U, payload: Payload) -> Option<AuthEvent> {
        let value = match payload {
            Payload::Json(value) => value,
            Payload::Encrypted(text) => {
                if self.requires_decryptor() {
                    tracing::warn!(
                        "Encryptor configured but no decryptor supplied, reading payload as plain JSON"
                    );
                }
                let decrypted = match &self.decryptor {
                    Some(decryptor) => decryptor.decrypt(&text),
                    None => NoDecryptor.decrypt(&text),
                };
                match decrypted {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to decrypt form payload");
                        ui.show_error(&format!("Unexpected form payload: {e}"), None);
                        return None;
                    }
                }
            }
        };

        match serde_json::from_value(value) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unrecognised form payload");
                None
            }
        }
    }
}
