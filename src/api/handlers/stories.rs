//! Story routes.

use crate::{
    api::{AppState, AuthenticatedUser, JsonBody, handlers::MessageResponse},
    core::stories::{self, StoryUpdate},
    entities::StoryModel,
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

/// Query string for the story list.
#[derive(Debug, Default, Deserialize)]
pub struct StoryFilter {
    /// Only stories of this charity
    pub charity_id: Option<i64>,
}

/// Body for a new story.
#[derive(Debug, Deserialize)]
pub struct NewStory {
    /// Headline
    pub title: String,
    /// Body text
    pub content: String,
}

/// `GET /stories`
pub async fn list_stories(
    State(state): State<AppState>,
    Query(filter): Query<StoryFilter>,
) -> Result<Json<Vec<StoryModel>>> {
    Ok(Json(stories::list_stories(&state.db, filter.charity_id).await?))
}

/// `GET /stories/:id`
pub async fn get_story(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StoryModel>> {
    Ok(Json(stories::get_story(&state.db, id).await?))
}

/// `POST /charities/:id/stories`
pub async fn create_story(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(charity_id): Path<i64>,
    JsonBody(story): JsonBody<NewStory>,
) -> Result<impl IntoResponse> {
    let story =
        stories::create_story(&state.db, &principal, charity_id, &story.title, &story.content)
            .await?;
    Ok((StatusCode::CREATED, Json(story)))
}

/// `PUT /stories/:id`
pub async fn update_story(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i64>,
    JsonBody(update): JsonBody<StoryUpdate>,
) -> Result<Json<StoryModel>> {
    Ok(Json(stories::update_story(&state.db, &principal, id, update).await?))
}

/// `DELETE /stories/:id`
pub async fn delete_story(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    stories::delete_story(&state.db, &principal, id).await?;
    Ok(Json(MessageResponse::new("Story deleted")))
}
