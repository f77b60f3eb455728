use crate::{
    auth::{password, token, AdminUser},
    error::AppError,
    AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use core_types::UserRole;
use database::{NewUser, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserPublic,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Option<UserRole>,
}

/// A user as exposed over the API: everything except the credential hash.
#[derive(Debug, Serialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        UserPublic {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// # POST /api/auth/login
///
/// Unknown email, wrong password and deactivated account all answer with
/// the same 401 so the response doesn't reveal which part was wrong.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = state
        .db_repo
        .find_user_by_email(&request.email)
        .await?
        .filter(|user| user.active)
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !password::verify(&request.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = token::issue(
        user.id,
        &user.email,
        &state.jwt_secret,
        state.config.auth.token_ttl_hours,
    )?;

    tracing::info!(user_id = %user.id, "User logged in.");

    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

/// # POST /api/auth/register
///
/// Creates a back-office account. Admin-gated; the very first admin is
/// bootstrapped with the `create-admin` CLI command instead.
pub async fn register(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserPublic>), AppError> {
    if request.password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let password_hash = password::hash(&request.password, state.config.auth.bcrypt_cost)?;

    let user = state
        .db_repo
        .create_user(NewUser {
            name: request.name,
            email: request.email,
            password_hash,
            phone: request.phone,
            address: request.address,
            role: request.role.unwrap_or(UserRole::Admin),
        })
        .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "User registered.");

    Ok((StatusCode::CREATED, Json(user.into())))
}
