//! Charity business logic - profiles, review and fundraising summaries.
//!
//! Only `approved` charities are listed publicly or accept donations. A charity-role
//! user may own one charity; ownership checks for charity-scoped content live here
//! and are shared by the stories, beneficiaries, inventory and donations modules.

use crate::{
    auth::{Principal, authorize},
    entities::{Charity, CharityModel, CharityStatus, Donation, DonationStatus, Role, charity, donation},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, instrument};

/// Location used when none is supplied.
pub const DEFAULT_LOCATION: &str = "Kenya";
/// Category used when none is supplied.
pub const DEFAULT_CATEGORY: &str = "Health";
/// Fundraising goal used when none is supplied.
pub const DEFAULT_GOAL: f64 = 10_000.0;

/// Input for a charity profile registered directly by a charity-role user.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCharity {
    /// Public name
    pub name: String,
    /// Mission statement
    pub description: String,
    /// Defaults to [`DEFAULT_LOCATION`]
    #[serde(default)]
    pub location: Option<String>,
    /// Defaults to [`DEFAULT_CATEGORY`]
    #[serde(default)]
    pub category: Option<String>,
    /// Defaults to [`DEFAULT_GOAL`]
    #[serde(default)]
    pub goal: Option<f64>,
}

/// Partial update; `None` keeps the current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharityUpdate {
    /// New name
    pub name: Option<String>,
    /// New mission statement
    pub description: Option<String>,
    /// New location
    pub location: Option<String>,
    /// New category
    pub category: Option<String>,
    /// New goal
    pub goal: Option<f64>,
}

/// A charity with its fundraising totals.
#[derive(Debug, Clone, Serialize)]
pub struct CharitySummary {
    /// The charity row
    #[serde(flatten)]
    pub charity: CharityModel,
    /// Sum of `complete` donations
    pub raised: f64,
    /// Distinct donors with a `complete` donation
    pub donors: u64,
}

/// Trims a required text field.
pub(crate) fn required_text(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::invalid(format!("{field} cannot be empty")));
    }
    Ok(value.to_string())
}

/// Returns the value or the default when absent or blank.
pub(crate) fn text_or_default(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Validates an optional goal, falling back to [`DEFAULT_GOAL`].
pub(crate) fn goal_or_default(goal: Option<f64>) -> Result<f64> {
    match goal {
        None => Ok(DEFAULT_GOAL),
        Some(goal) if goal.is_finite() && goal > 0.0 => Ok(goal),
        Some(goal) => Err(Error::invalid(format!("Goal must be positive, got {goal}"))),
    }
}

/// Loads a charity or fails with [`Error::NotFound`].
pub async fn require_charity<C>(db: &C, charity_id: i64) -> Result<CharityModel>
where
    C: ConnectionTrait,
{
    Charity::find_by_id(charity_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Charity", charity_id))
}

/// Charity-role principal that owns `charity`.
pub(crate) fn ensure_owner(principal: &Principal, charity: &CharityModel) -> Result<()> {
    authorize(principal, &[Role::Charity])?;
    if charity.owner_id == principal.user_id {
        Ok(())
    } else {
        Err(Error::forbidden("You do not manage this charity"))
    }
}

/// Owner of `charity`, or any admin.
pub(crate) fn ensure_owner_or_admin(principal: &Principal, charity: &CharityModel) -> Result<()> {
    if principal.is_admin() {
        Ok(())
    } else {
        ensure_owner(principal, charity)
    }
}

/// Finds a charity by id, returning None if it does not exist.
pub async fn get_charity(db: &DatabaseConnection, charity_id: i64) -> Result<Option<CharityModel>> {
    Charity::find_by_id(charity_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds the charity owned by a user.
pub async fn get_charity_by_owner<C>(db: &C, owner_id: i64) -> Result<Option<CharityModel>>
where
    C: ConnectionTrait,
{
    Charity::find()
        .filter(charity::Column::OwnerId.eq(owner_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists approved charities ordered by name, optionally filtered by category.
pub async fn list_charities(
    db: &DatabaseConnection,
    category: Option<&str>,
) -> Result<Vec<CharityModel>> {
    let mut query = Charity::find().filter(charity::Column::Status.eq(CharityStatus::Approved));
    if let Some(category) = category.map(str::trim).filter(|c| !c.is_empty()) {
        query = query.filter(charity::Column::Category.eq(category));
    }
    query
        .order_by_asc(charity::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists charities awaiting review, oldest first. Admin only.
pub async fn list_pending_charities(
    db: &DatabaseConnection,
    principal: &Principal,
) -> Result<Vec<CharityModel>> {
    authorize(principal, &[Role::Admin])?;
    Charity::find()
        .filter(charity::Column::Status.eq(CharityStatus::Pending))
        .order_by_asc(charity::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds fundraising totals to a charity.
pub async fn summarize(db: &DatabaseConnection, charity: CharityModel) -> Result<CharitySummary> {
    let completed = Donation::find()
        .filter(donation::Column::CharityId.eq(charity.id))
        .filter(donation::Column::Status.eq(DonationStatus::Complete))
        .all(db)
        .await?;

    let raised = completed.iter().map(|d| d.amount).sum();
    let donors = completed.iter().map(|d| d.user_id).collect::<HashSet<_>>().len() as u64;

    Ok(CharitySummary {
        charity,
        raised,
        donors,
    })
}

/// Returns a charity with its fundraising totals.
pub async fn charity_summary(db: &DatabaseConnection, charity_id: i64) -> Result<CharitySummary> {
    let charity = require_charity(db, charity_id).await?;
    summarize(db, charity).await
}

/// Registers a charity profile for the calling charity-role user, in `pending`.
#[instrument(skip(db, new_charity), fields(user_id = principal.user_id))]
pub async fn create_charity(
    db: &DatabaseConnection,
    principal: &Principal,
    new_charity: NewCharity,
) -> Result<CharityModel> {
    authorize(principal, &[Role::Charity])?;

    let name = required_text(&new_charity.name, "Charity name")?;
    let description = required_text(&new_charity.description, "Description")?;
    let goal = goal_or_default(new_charity.goal)?;

    if get_charity_by_owner(db, principal.user_id).await?.is_some() {
        return Err(Error::conflict("You already manage a charity"));
    }

    let charity = charity::ActiveModel {
        owner_id: Set(principal.user_id),
        name: Set(name),
        description: Set(description),
        location: Set(text_or_default(new_charity.location.as_deref(), DEFAULT_LOCATION)),
        category: Set(text_or_default(new_charity.category.as_deref(), DEFAULT_CATEGORY)),
        goal: Set(goal),
        status: Set(CharityStatus::Pending),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(charity_id = charity.id, "Charity profile submitted for review");
    Ok(charity)
}

async fn review_charity(
    db: &DatabaseConnection,
    principal: &Principal,
    charity_id: i64,
    decision: CharityStatus,
) -> Result<CharityModel> {
    authorize(principal, &[Role::Admin])?;

    let charity = require_charity(db, charity_id).await?;
    if charity.status != CharityStatus::Pending {
        return Err(Error::conflict(format!(
            "Charity {charity_id} has already been reviewed"
        )));
    }

    let mut active: charity::ActiveModel = charity.into();
    active.status = Set(decision);
    Ok(active.update(db).await?)
}

/// Approves a pending charity. Admin only.
#[instrument(skip(db), fields(admin_id = principal.user_id))]
pub async fn approve_charity(
    db: &DatabaseConnection,
    principal: &Principal,
    charity_id: i64,
) -> Result<CharityModel> {
    let charity = review_charity(db, principal, charity_id, CharityStatus::Approved).await?;
    info!("Approved charity {}", charity.name);
    Ok(charity)
}

/// Rejects a pending charity. Admin only; the reason is logged.
#[instrument(skip(db, reason), fields(admin_id = principal.user_id))]
pub async fn reject_charity(
    db: &DatabaseConnection,
    principal: &Principal,
    charity_id: i64,
    reason: Option<&str>,
) -> Result<CharityModel> {
    let charity = review_charity(db, principal, charity_id, CharityStatus::Rejected).await?;
    info!(
        "Rejected charity {}: {}",
        charity.name,
        reason.unwrap_or("no reason given")
    );
    Ok(charity)
}

/// Applies a partial update. Owner or admin.
pub async fn update_charity(
    db: &DatabaseConnection,
    principal: &Principal,
    charity_id: i64,
    update: CharityUpdate,
) -> Result<CharityModel> {
    let charity = require_charity(db, charity_id).await?;
    ensure_owner_or_admin(principal, &charity)?;

    let mut active: charity::ActiveModel = charity.into();
    if let Some(name) = update.name {
        active.name = Set(required_text(&name, "Charity name")?);
    }
    if let Some(description) = update.description {
        active.description = Set(required_text(&description, "Description")?);
    }
    if let Some(location) = update.location {
        active.location = Set(required_text(&location, "Location")?);
    }
    if let Some(category) = update.category {
        active.category = Set(required_text(&category, "Category")?);
    }
    if let Some(goal) = update.goal {
        active.goal = Set(goal_or_default(Some(goal))?);
    }

    Ok(active.update(db).await?)
}

/// Deletes a charity and, by cascade, its donations and content. Owner or admin.
#[instrument(skip(db), fields(user_id = principal.user_id))]
pub async fn delete_charity(
    db: &DatabaseConnection,
    principal: &Principal,
    charity_id: i64,
) -> Result<()> {
    let charity = require_charity(db, charity_id).await?;
    ensure_owner_or_admin(principal, &charity)?;

    Charity::delete_by_id(charity.id).exec(db).await?;
    info!("Deleted charity {}", charity.name);
    Ok(())
}
