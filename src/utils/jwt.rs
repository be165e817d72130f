use crate::config::AppConfig;
use actix_web::cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

// JWT Claims 结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,           // 用户 ID
    pub is_admin: bool,        // 签发时的管理员标记，仅作提示，权限以数据库为准
    pub token_type: TokenKind, // access 或 refresh
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct JwtUtils;

impl JwtUtils {
    fn secret() -> String {
        AppConfig::get().jwt.secret.clone()
    }

    pub fn access_token_ttl() -> chrono::Duration {
        chrono::Duration::minutes(AppConfig::get().jwt.access_token_expiry)
    }

    /// 记住我时使用更长的刷新有效期
    pub fn refresh_token_ttl(remember_me: bool) -> chrono::Duration {
        let jwt = &AppConfig::get().jwt;
        if remember_me {
            chrono::Duration::days(jwt.refresh_token_remember_me_expiry)
        } else {
            chrono::Duration::days(jwt.refresh_token_expiry)
        }
    }

    pub fn generate_token(
        user_id: i64,
        is_admin: bool,
        kind: TokenKind,
        ttl: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            is_admin,
            token_type: kind,
            exp: (now + ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(Self::secret().as_ref()),
        )
    }

    pub fn generate_access_token(
        user_id: i64,
        is_admin: bool,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        Self::generate_token(user_id, is_admin, TokenKind::Access, Self::access_token_ttl())
    }

    pub fn generate_token_pair(
        user_id: i64,
        is_admin: bool,
        remember_me: bool,
    ) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        Ok(TokenPair {
            access_token: Self::generate_access_token(user_id, is_admin)?,
            refresh_token: Self::generate_token(
                user_id,
                is_admin,
                TokenKind::Refresh,
                Self::refresh_token_ttl(remember_me),
            )?,
        })
    }

    /// 校验签名、过期时间与 token 类型
    pub fn verify(token: &str, expected: TokenKind) -> Result<Claims, jsonwebtoken::errors::Error> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(Self::secret().as_ref()),
            &Validation::default(),
        )?
        .claims;

        if claims.token_type != expected {
            return Err(jsonwebtoken::errors::ErrorKind::InvalidToken.into());
        }
        Ok(claims)
    }

    pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify(token, TokenKind::Access)
    }

    pub fn verify_refresh_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify(token, TokenKind::Refresh)
    }

    pub fn create_refresh_token_cookie(refresh_token: &str, remember_me: bool) -> Cookie<'static> {
        let max_age = Self::refresh_token_ttl(remember_me).num_seconds();
        Self::refresh_cookie(refresh_token.to_string(), max_age)
    }

    /// 注销时覆盖浏览器中的 cookie
    pub fn create_empty_refresh_token_cookie() -> Cookie<'static> {
        Self::refresh_cookie(String::new(), 0)
    }

    fn refresh_cookie(value: String, max_age_secs: i64) -> Cookie<'static> {
        Cookie::build(REFRESH_TOKEN_COOKIE, value)
            .path("/api/v1/auth")
            .max_age(actix_web::cookie::time::Duration::seconds(max_age_secs))
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(AppConfig::get().is_production())
            .finish()
    }

    pub fn extract_refresh_token_from_cookie(req: &actix_web::HttpRequest) -> Option<String> {
        req.cookie(REFRESH_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let pair = JwtUtils::generate_token_pair(42, true, false).unwrap();

        let access = JwtUtils::verify_access_token(&pair.access_token).unwrap();
        assert_eq!(access.user_id(), Some(42));
        assert!(access.is_admin);

        assert!(JwtUtils::verify_refresh_token(&pair.access_token).is_err());
        assert!(JwtUtils::verify_access_token(&pair.refresh_token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = JwtUtils::generate_token(
            7,
            false,
            TokenKind::Access,
            chrono::Duration::minutes(-10),
        )
        .unwrap();
        assert!(JwtUtils::verify_access_token(&token).is_err());
    }

    #[test]
    fn test_remember_me_extends_refresh_cookie() {
        let short = JwtUtils::create_refresh_token_cookie("t", false);
        let long = JwtUtils::create_refresh_token_cookie("t", true);
        assert!(long.max_age() > short.max_age());
        assert!(short.http_only().unwrap_or(false));
    }
}
