use axum::{RequestPartsExt, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use pelada_app::{
    domain::identity::UserIdentity, ports::authentication::TokenValidationPort,
};

use crate::{AppState, ServiceError};

/// The caller identified by the `Authorization: Bearer` header.
pub struct Auth(pub UserIdentity);

impl FromRequestParts<AppState> for Auth {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        app: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| ServiceError::Unauthorized("Missing bearer token".to_string()))?;

        match app.auth.validate(bearer.token()).await {
            Ok(user) => Ok(Auth(user)),
            Err(e) => {
                log::debug!("Rejected bearer token: {}", e);
                Err(ServiceError::Unauthorized(
                    "Invalid or expired authentication token".to_string(),
                ))
            }
        }
    }
}
