use thiserror::Error;

/// 登录流程中对用户可见的错误，`Display` 文本即表单旁显示的提示
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Wrong username or password")]
    InvalidCredentials,
    #[error("Unable to connect to the directory server")]
    Unreachable,
    #[error("Directory error: {0}")]
    Directory(String),
    #[error("Unable to retrieve user information")]
    UserInfoUnavailable,
    /// 附加检查或应用回调否决
    #[error("{0}")]
    Rejected(String),
}

impl From<DirectoryError> for AuthError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::InvalidCredentials => AuthError::InvalidCredentials,
            DirectoryError::Unreachable(_) => AuthError::Unreachable,
            DirectoryError::Protocol(msg) | DirectoryError::Source(msg) => AuthError::Directory(msg),
        }
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("directory unreachable: {0}")]
    Unreachable(String),
    #[error("directory protocol error: {0}")]
    Protocol(String),
    #[error("invalid directory source: {0}")]
    Source(String),
}

/// 令牌解码失败原因，仅用于日志
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("no cookie found")]
    Missing,
    #[error("invalid token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("decoded cookie is not an object")]
    NotAnObject,
    #[error("exp_date is not found")]
    MissingExpiry,
    #[error("exp_date is not a number")]
    InvalidExpiry,
    #[error("cookie expired")]
    Expired,
    #[error("user is not found")]
    MissingUser,
    #[error("user is not an object")]
    InvalidUser,
    #[error("expiry of {0} days is out of range")]
    ExpiryOverflow(f64),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CookieError {
    #[error("failed to encode token: {0}")]
    Token(#[from] TokenError),
    #[error("invalid cookie expiry: {0}")]
    Expiry(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum DecryptError {
    #[error("payload decryption failed: {0}")]
    Failed(String),
    #[error("decrypted payload is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}
