use std::sync::Arc;

use crate::{domain::identity::Identity, ports::authentication::TokenValidationPort};

#[async_trait::async_trait]
pub trait ConnectionAuthenticator {
    /// Never fails: anything that does not validate resolves to `Anonymous`.
    async fn authenticate(&self, raw_token: Option<&str>) -> Identity;
}

pub struct ConnectionAuthenticatorImpl<T: TokenValidationPort> {
    token_validation_port: Arc<T>,
}

impl<T: TokenValidationPort> ConnectionAuthenticatorImpl<T> {
    pub fn new(token_validation_port: Arc<T>) -> Self {
        Self {
            token_validation_port,
        }
    }
}

#[async_trait::async_trait]
impl<T: TokenValidationPort + Send + Sync + 'static> ConnectionAuthenticator
    for ConnectionAuthenticatorImpl<T>
{
    async fn authenticate(&self, raw_token: Option<&str>) -> Identity {
        let Some(token) = raw_token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Identity::Anonymous;
        };
        match self.token_validation_port.validate(token).await {
            Ok(user) => Identity::User(user),
            Err(e) => {
                log::debug!("Token rejected, continuing as anonymous: {}", e);
                Identity::Anonymous
            }
        }
    }
}
