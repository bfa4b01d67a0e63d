use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 已认证身份的目录属性记录
///
/// 始终是 JSON 对象；标量或数组在任何环节都视为“没有有效用户”。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserInfo(Map<String, Value>);

impl UserInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// 只接受 JSON 对象
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// 字符串属性
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for UserInfo {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_rejects_non_objects() {
        assert!(UserInfo::from_value(json!("jdoe")).is_none());
        assert!(UserInfo::from_value(json!(["jdoe"])).is_none());
        assert!(UserInfo::from_value(Value::Null).is_none());
        assert!(UserInfo::from_value(json!({"sAMAccountName": "jdoe"})).is_some());
    }

    #[test]
    fn deserialize_requires_object() {
        assert!(serde_json::from_value::<UserInfo>(json!(42)).is_err());
        let user: UserInfo = serde_json::from_value(json!({"displayName": "John"})).unwrap();
        assert_eq!(user.get_str("displayName"), Some("John"));
    }
}
