//! Story business logic - updates published by charities.

use crate::{
    auth::Principal,
    core::charities::{ensure_owner, ensure_owner_or_admin, require_charity, required_text},
    entities::{Story, StoryModel, story},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Partial update; `None` keeps the current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoryUpdate {
    /// New title
    pub title: Option<String>,
    /// New content
    pub content: Option<String>,
}

/// Lists stories newest first, optionally for one charity.
pub async fn list_stories(
    db: &DatabaseConnection,
    charity_id: Option<i64>,
) -> Result<Vec<StoryModel>> {
    let mut query = Story::find();
    if let Some(charity_id) = charity_id {
        query = query.filter(story::Column::CharityId.eq(charity_id));
    }
    query
        .order_by_desc(story::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads a story or fails with [`Error::NotFound`].
pub async fn get_story(db: &DatabaseConnection, story_id: i64) -> Result<StoryModel> {
    Story::find_by_id(story_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Story", story_id))
}

/// Publishes a story for a charity. Owner only.
pub async fn create_story(
    db: &DatabaseConnection,
    principal: &Principal,
    charity_id: i64,
    title: &str,
    content: &str,
) -> Result<StoryModel> {
    let charity = require_charity(db, charity_id).await?;
    ensure_owner(principal, &charity)?;

    let story = story::ActiveModel {
        charity_id: Set(charity.id),
        title: Set(required_text(title, "Title")?),
        content: Set(required_text(content, "Content")?),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(story_id = story.id, charity_id, "Story published");
    Ok(story)
}

/// Edits a story. Owner only.
pub async fn update_story(
    db: &DatabaseConnection,
    principal: &Principal,
    story_id: i64,
    update: StoryUpdate,
) -> Result<StoryModel> {
    let story = get_story(db, story_id).await?;
    let charity = require_charity(db, story.charity_id).await?;
    ensure_owner(principal, &charity)?;

    let mut active: story::ActiveModel = story.into();
    if let Some(title) = update.title {
        active.title = Set(required_text(&title, "Title")?);
    }
    if let Some(content) = update.content {
        active.content = Set(required_text(&content, "Content")?);
    }
    Ok(active.update(db).await?)
}

/// Deletes a story. Owner or admin.
pub async fn delete_story(
    db: &DatabaseConnection,
    principal: &Principal,
    story_id: i64,
) -> Result<()> {
    let story = get_story(db, story_id).await?;
    let charity = require_charity(db, story.charity_id).await?;
    ensure_owner_or_admin(principal, &charity)?;

    Story::delete_by_id(story.id).exec(db).await?;
    Ok(())
}
