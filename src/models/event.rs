use serde::{Deserialize, Serialize};

/// 表单提交事件，按 `event` 字段区分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum AuthEvent {
    Signin(SigninEvent),
    Signout(SignoutEvent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigninEvent {
    pub username: String,
    pub password: String,
    #[serde(default = "default_remember")]
    pub remember: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignoutEvent {}

fn default_remember() -> bool {
    true
}
