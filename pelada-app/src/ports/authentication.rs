use crate::domain::identity::UserIdentity;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,
    #[error("Token expired")]
    Expired,
    #[error("Invalid token signature")]
    InvalidSignature,
    #[error("Token validation failed: {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait TokenValidationPort {
    async fn validate(&self, token: &str) -> Result<UserIdentity, TokenError>;
}
