use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::CookieConfig;
use crate::error::TokenError;
use crate::models::UserInfo;
use crate::utils::{add_days, unix_timestamp};

/// 重新认证令牌载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReauthClaims {
    pub user: UserInfo,
    pub exp_date: f64,
}

/// HS256 签名的重新认证令牌编解码
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry_days: f64,
}

impl TokenCodec {
    pub fn new(config: &CookieConfig) -> Self {
        Self::from_secret(config.key.as_bytes(), config.expiry_days)
    }

    pub fn from_secret(secret: &[u8], expiry_days: f64) -> Self {
        // exp_date 由本模块自行校验，不使用 JWT 标准 exp 声明
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            expiry_days,
        }
    }

    pub fn encode(&self, user: &UserInfo) -> Result<String, TokenError> {
        self.encode_at(user, Utc::now())
    }

    /// 以 `now` 为签发时间编码，过期时间为 `now + expiry_days`
    pub fn encode_at(&self, user: &UserInfo, now: DateTime<Utc>) -> Result<String, TokenError> {
        let expires = add_days(now, self.expiry_days)
            .ok_or(TokenError::ExpiryOverflow(self.expiry_days))?;
        let claims = ReauthClaims {
            user: user.clone(),
            exp_date: unix_timestamp(expires),
        };
        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// 解码并校验令牌，任何失败都记录原因并返回 `None`
    pub fn decode(&self, token: Option<&str>) -> Option<UserInfo> {
        match self.try_decode(token) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(reason = %e, "Token decode error");
                None
            }
        }
    }

    pub fn try_decode(&self, token: Option<&str>) -> Result<UserInfo, TokenError> {
        self.try_decode_at(token, Utc::now())
    }

    pub fn try_decode_at(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<UserInfo, TokenError> {
        let token = token.ok_or(TokenError::Missing)?;
        let data = decode::<Value>(token, &self.decoding_key, &self.validation)?;

        let Value::Object(mut claims) = data.claims else {
            return Err(TokenError::NotAnObject);
        };

        let exp_date = claims
            .get("exp_date")
            .ok_or(TokenError::MissingExpiry)?
            .as_f64()
            .ok_or(TokenError::InvalidExpiry)?;
        if exp_date < unix_timestamp(now) {
            return Err(TokenError::Expired);
        }

        let user = claims.remove("user").ok_or(TokenError::MissingUser)?;
        UserInfo::from_value(user).ok_or(TokenError::InvalidUser)
    }
}
