//! 表单渲染能力边界

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::DecryptError;

mod memory;

pub use memory::{MemoryUi, RenderedForm};

/// 表单提交的原始载荷
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    /// 加密的载荷，需先解密；没有解密器时按 JSON 文本解析
    Encrypted(String),
}

/// 登录表单默认值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigninDefaults {
    pub remember: bool,
}

/// 宿主提供的表单渲染
#[async_trait]
pub trait AuthUi: Send + Sync {
    /// 渲染登录表单，返回本周期的提交（如有）
    async fn signin_form(
        &self,
        defaults: Option<SigninDefaults>,
        form: &Map<String, Value>,
    ) -> Option<Payload>;

    async fn signout_form(&self, form: &Map<String, Value>) -> Option<Payload>;

    fn show_error(&self, message: &str, icon: Option<&str>);

    /// `Some` 显示忙碌提示，`None` 取消
    fn set_busy(&self, message: Option<&str>);

    /// 清除本周期的表单提交结果
    fn clear_result(&self);
}

/// 表单载荷解密
pub trait PayloadDecryptor: Send + Sync {
    fn decrypt(&self, ciphertext: &str) -> Result<Value, DecryptError>;
}

/// 未配置加密时使用
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDecryptor;

impl PayloadDecryptor for NoDecryptor {
    fn decrypt(&self, ciphertext: &str) -> Result<Value, DecryptError> {
        Ok(serde_json::from_str(ciphertext)?)
    }
}
