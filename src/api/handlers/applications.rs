//! Charity application routes.

use crate::{
    api::{AppState, AuthenticatedUser, JsonBody},
    core::applications::{self, ApprovalResult, NewApplication},
    entities::{ApplicationStatus, CharityApplicationModel},
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

/// Query string for the application list.
#[derive(Debug, Default, Deserialize)]
pub struct ApplicationFilter {
    /// Only applications in this state
    pub status: Option<ApplicationStatus>,
}

/// `POST /applications`
pub async fn submit_application(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    JsonBody(new_application): JsonBody<NewApplication>,
) -> Result<impl IntoResponse> {
    let application =
        applications::submit_application(&state.db, &principal, new_application).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// `GET /applications`
pub async fn list_applications(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Query(filter): Query<ApplicationFilter>,
) -> Result<Json<Vec<CharityApplicationModel>>> {
    Ok(Json(
        applications::list_applications(&state.db, &principal, filter.status).await?,
    ))
}

/// `GET /applications/mine`
pub async fn my_applications(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<Vec<CharityApplicationModel>>> {
    Ok(Json(
        applications::get_my_applications(&state.db, &principal).await?,
    ))
}

/// `POST /applications/:id/approve`
pub async fn approve_application(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<ApprovalResult>> {
    Ok(Json(
        applications::approve_application(&state.db, &principal, id).await?,
    ))
}

/// `POST /applications/:id/reject`
pub async fn reject_application(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<CharityApplicationModel>> {
    Ok(Json(
        applications::reject_application(&state.db, &principal, id).await?,
    ))
}
