use crate::{error::AppError, AppState};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use core_types::UserRole;
use std::sync::Arc;
use uuid::Uuid;

use super::token;

/// Bearer token extracted from the `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Access token required".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthorized(
                "Invalid authorization format. Expected 'Bearer <token>'".to_string(),
            )
        })?;

        if token.is_empty() {
            return Err(AppError::Unauthorized("Access token required".to_string()));
        }

        Ok(Self(token.to_string()))
    }
}

/// An authenticated back-office user, resolved from a bearer token.
///
/// Verifies the token, then re-loads the user so that a deactivated or
/// deleted account is locked out immediately rather than at token expiry.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let bearer = BearerToken::from_request_parts(parts, state).await?;

        let claims = token::verify(&bearer.0, &state.jwt_secret)
            .map_err(|err| AppError::Unauthorized(err.to_string()))?;

        let user = state
            .db_repo
            .find_user_by_id(claims.sub)
            .await?
            .filter(|user| user.active)
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

        Ok(Self {
            id: user.id,
            email: user.email,
            role: user.role,
        })
    }
}

/// Admin gate. Use as a handler parameter to restrict a route to
/// administrators; non-admin users are answered with 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        if user.role != UserRole::Admin {
            return Err(AppError::Forbidden(
                "Only administrators can perform this action".to_string(),
            ));
        }

        Ok(Self(user))
    }
}
