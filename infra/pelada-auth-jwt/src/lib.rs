use std::sync::Arc;

use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use pelada_app::{
    domain::{UserId, identity::UserIdentity},
    ports::authentication::{TokenError, TokenValidationPort},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    exp: usize,
}

impl Claims {
    fn into_identity(self) -> Result<UserIdentity, TokenError> {
        let user_id = uuid::Uuid::parse_str(&self.sub).map_err(|_| TokenError::Malformed)?;
        let username = self
            .username
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.sub.clone());
        Ok(UserIdentity {
            user_id: UserId(user_id),
            username,
        })
    }
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Validates HS256 bearer tokens signed with the shared secret.
pub struct JwtTokenValidator {
    keys: Arc<Keys>,
}

impl JwtTokenValidator {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            keys: Arc::new(Keys::new(secret)),
        }
    }

    fn decode_token(keys: &Keys, token: &str) -> Result<UserIdentity, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let token_data = decode::<Claims>(token, &keys.decoding, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_)
                | ErrorKind::MissingRequiredClaim(_) => TokenError::Malformed,
                _ => TokenError::Other(e.to_string()),
            })?;
        token_data.claims.into_identity()
    }

    /// Issues a token for `user`, valid for `ttl`. Token issuance belongs to
    /// the account service; this is used by tests and local tooling.
    pub fn generate_jwt(
        &self,
        user: &UserIdentity,
        ttl: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user.user_id.to_string(),
            username: Some(user.username.clone()),
            exp: (chrono::Utc::now() + ttl).timestamp().max(0) as usize,
        };
        encode(&Header::default(), &claims, &self.keys.encoding)
    }
}

#[async_trait::async_trait]
impl TokenValidationPort for JwtTokenValidator {
    async fn validate(&self, token: &str) -> Result<UserIdentity, TokenError> {
        let keys = self.keys.clone();
        let token = token.to_string();
        tokio::task::spawn_blocking(move || Self::decode_token(&keys, &token))
            .await
            .map_err(|e| TokenError::Other(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> UserIdentity {
        UserIdentity {
            user_id: UserId(uuid::Uuid::from_u128(7)),
            username: "alice".to_string(),
        }
    }

    fn raw_token(secret: &[u8], sub: &str, username: Option<&str>, exp: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            username: username.map(str::to_string),
            exp: exp as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[tokio::test]
    async fn test_valid_token() {
        let validator = JwtTokenValidator::new(b"secret");
        let token = validator
            .generate_jwt(&alice(), chrono::Duration::hours(1))
            .unwrap();
        assert_eq!(validator.validate(&token).await, Ok(alice()));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let validator = JwtTokenValidator::new(b"secret");
        let token = validator
            .generate_jwt(&alice(), chrono::Duration::hours(-2))
            .unwrap();
        assert_eq!(validator.validate(&token).await, Err(TokenError::Expired));
    }

    #[tokio::test]
    async fn test_recently_expired_token_is_rejected() {
        let validator = JwtTokenValidator::new(b"secret");
        let token = validator
            .generate_jwt(&alice(), chrono::Duration::seconds(-5))
            .unwrap();
        assert_eq!(validator.validate(&token).await, Err(TokenError::Expired));

        let token = validator
            .generate_jwt(&alice(), chrono::Duration::seconds(-30))
            .unwrap();
        assert_eq!(validator.validate(&token).await, Err(TokenError::Expired));
    }

    #[tokio::test]
    async fn test_foreign_signature() {
        let validator = JwtTokenValidator::new(b"secret");
        let forged = JwtTokenValidator::new(b"other secret")
            .generate_jwt(&alice(), chrono::Duration::hours(1))
            .unwrap();
        assert_eq!(
            validator.validate(&forged).await,
            Err(TokenError::InvalidSignature)
        );
    }

    #[tokio::test]
    async fn test_malformed_tokens() {
        let validator = JwtTokenValidator::new(b"secret");
        assert_eq!(
            validator.validate("not a token").await,
            Err(TokenError::Malformed)
        );

        let exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp();
        let not_a_uuid = raw_token(b"secret", "42", Some("bob"), exp);
        assert_eq!(
            validator.validate(&not_a_uuid).await,
            Err(TokenError::Malformed)
        );
    }

    #[tokio::test]
    async fn test_username_falls_back_to_id() {
        let validator = JwtTokenValidator::new(b"secret");
        let exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp();
        let sub = alice().user_id.to_string();
        let token = raw_token(b"secret", &sub, None, exp);

        let identity = validator.validate(&token).await.unwrap();
        assert_eq!(identity.user_id, alice().user_id);
        assert_eq!(identity.username, sub);
    }
}
