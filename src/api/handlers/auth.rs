//! Registration, login and profile.

use crate::{
    api::{AppState, AuthenticatedUser, JsonBody},
    core::{charities, users},
    entities::{CharityModel, UserModel},
    errors::{Error, Result},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

/// Login body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Password
    pub password: String,
}

/// Token plus the account it was issued for.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Bearer token
    pub token: String,
    /// The account
    pub user: UserModel,
}

/// The caller's account and, for charity accounts, their charity.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// The account
    pub user: UserModel,
    /// Charity owned by the account
    pub charity: Option<CharityModel>,
}

/// `POST /auth/register`
pub async fn register(
    State(state): State<AppState>,
    JsonBody(new_user): JsonBody<users::NewUser>,
) -> Result<impl IntoResponse> {
    let user = users::register_user(&state.db, new_user).await?;
    let token = state.tokens.issue(&user)?;
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let user = users::authenticate(&state.db, &request.email, &request.password).await?;
    let token = state.tokens.issue(&user)?;
    Ok(Json(AuthResponse { token, user }))
}

/// `GET /auth/profile`
pub async fn profile(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<ProfileResponse>> {
    let user = users::get_user(&state.db, principal.user_id)
        .await?
        .ok_or_else(|| Error::not_found("User", principal.user_id))?;
    let charity = charities::get_charity_by_owner(&state.db, user.id).await?;
    Ok(Json(ProfileResponse { user, charity }))
}
