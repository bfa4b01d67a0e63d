use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::seconds;

pub const DEFAULT_LOGIN_BUSY_MESSAGE: &str = "Вход в систему...";
pub const DEFAULT_LOGOUT_BUSY_MESSAGE: &str = "Logging out...";
pub const DEFAULT_LOGOUT_SLEEP_SEC: f64 = 1.0;

/// 登录表单配置，`form` 中的其余字段原样交给表单渲染层
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub busy_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_icon: Option<String>,
    #[serde(flatten)]
    pub form: Map<String, Value>,
}

/// 解析后的登录表单参数
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub form: Map<String, Value>,
    pub busy_message: String,
    pub error_icon: Option<String>,
}

impl LoginConfig {
    /// 从宽松的 JSON 对象构建，非字符串的 busy_message / error_icon 视为未设置
    pub fn from_map(mut map: Map<String, Value>) -> Self {
        let busy_message = take_string(&mut map, "busy_message");
        let error_icon = take_string(&mut map, "error_icon");
        Self {
            busy_message,
            error_icon,
            form: map,
        }
    }

    pub fn resolve(&self, remember_enabled: bool) -> LoginForm {
        let mut form = self.form.clone();
        if remember_enabled {
            form.entry("remember")
                .or_insert_with(|| Value::Object(Map::new()));
        }

        LoginForm {
            form,
            busy_message: self
                .busy_message
                .clone()
                .unwrap_or_else(|| DEFAULT_LOGIN_BUSY_MESSAGE.to_string()),
            error_icon: self.error_icon.clone(),
        }
    }
}

/// 登出表单配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogoutConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub busy_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_sec: Option<f64>,
    #[serde(flatten)]
    pub form: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct LogoutForm {
    pub form: Map<String, Value>,
    pub busy_message: String,
    pub sleep: Duration,
}

impl LogoutConfig {
    pub fn from_map(mut map: Map<String, Value>) -> Self {
        let busy_message = take_string(&mut map, "busy_message");
        let sleep_sec = match map.remove("sleep_sec") {
            Some(Value::Number(n)) => n.as_f64(),
            _ => None,
        };
        Self {
            busy_message,
            sleep_sec,
            form: map,
        }
    }

    pub fn resolve(&self) -> LogoutForm {
        let mut form = self.form.clone();

        // 旧版配置使用 message 作为标题
        if !form.contains_key("title") {
            if let Some(Value::String(text)) = form.remove("message") {
                let mut title = Map::new();
                title.insert("text".into(), Value::String(text));
                form.insert("title".into(), Value::Object(title));
            }
        }

        LogoutForm {
            form,
            busy_message: self
                .busy_message
                .clone()
                .unwrap_or_else(|| DEFAULT_LOGOUT_BUSY_MESSAGE.to_string()),
            sleep: seconds(self.sleep_sec.unwrap_or(DEFAULT_LOGOUT_SLEEP_SEC)),
        }
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}
