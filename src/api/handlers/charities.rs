//! Charity profile routes.

use crate::{
    api::{AppState, AuthenticatedUser, JsonBody, handlers::MessageResponse},
    core::charities::{self, CharitySummary, CharityUpdate, NewCharity},
    entities::CharityModel,
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

/// Query string for the charity list.
#[derive(Debug, Default, Deserialize)]
pub struct CharityFilter {
    /// Only charities in this category
    pub category: Option<String>,
}

/// `GET /charities` - approved charities with their totals.
pub async fn list_charities(
    State(state): State<AppState>,
    Query(filter): Query<CharityFilter>,
) -> Result<Json<Vec<CharitySummary>>> {
    let listed = charities::list_charities(&state.db, filter.category.as_deref()).await?;
    let mut summaries = Vec::with_capacity(listed.len());
    for charity in listed {
        summaries.push(charities::summarize(&state.db, charity).await?);
    }
    Ok(Json(summaries))
}

/// `POST /charities`
pub async fn create_charity(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    JsonBody(new_charity): JsonBody<NewCharity>,
) -> Result<impl IntoResponse> {
    let charity = charities::create_charity(&state.db, &principal, new_charity).await?;
    Ok((StatusCode::CREATED, Json(charity)))
}

/// `GET /charities/:id`
pub async fn get_charity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CharitySummary>> {
    Ok(Json(charities::charity_summary(&state.db, id).await?))
}

/// `PUT /charities/:id`
pub async fn update_charity(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i64>,
    JsonBody(update): JsonBody<CharityUpdate>,
) -> Result<Json<CharityModel>> {
    Ok(Json(
        charities::update_charity(&state.db, &principal, id, update).await?,
    ))
}

/// `DELETE /charities/:id`
pub async fn delete_charity(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    charities::delete_charity(&state.db, &principal, id).await?;
    Ok(Json(MessageResponse::new("Charity deleted")))
}
