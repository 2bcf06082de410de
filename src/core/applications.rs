//! Charity application business logic.
//!
//! A donor applies to become a charity; an admin approves or rejects the application.
//! Approval is a single transaction that marks the application, creates the charity
//! and promotes the applicant, so either all three happen or none do.

use crate::{
    auth::{Principal, authorize},
    core::{
        charities::{
            DEFAULT_CATEGORY, DEFAULT_LOCATION, get_charity_by_owner, goal_or_default,
            required_text, text_or_default,
        },
        users,
    },
    entities::{
        ApplicationStatus, CharityApplication, CharityApplicationModel, CharityModel,
        CharityStatus, Role, charity, charity_application,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Input for a new application.
#[derive(Debug, Clone, Deserialize)]
pub struct NewApplication {
    /// Name the charity will carry
    pub organization_name: String,
    /// Becomes the charity description
    pub mission: String,
    /// Defaults to the charity default location
    #[serde(default)]
    pub location: Option<String>,
    /// Defaults to the charity default category
    #[serde(default)]
    pub category: Option<String>,
    /// Defaults to the charity default goal
    #[serde(default)]
    pub goal: Option<f64>,
}

/// Result of approving an application.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalResult {
    /// The application, now `approved`
    pub application: CharityApplicationModel,
    /// The charity created from it
    pub charity: CharityModel,
}

fn require_pending(application: &CharityApplicationModel) -> Result<()> {
    if application.status == ApplicationStatus::Pending {
        Ok(())
    } else {
        Err(Error::conflict(format!(
            "Application {} has already been reviewed",
            application.id
        )))
    }
}

async fn require_application<C>(db: &C, application_id: i64) -> Result<CharityApplicationModel>
where
    C: ConnectionTrait,
{
    CharityApplication::find_by_id(application_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("CharityApplication", application_id))
}

/// Submits an application for the calling donor.
///
/// A donor may have only one pending application at a time.
#[instrument(skip(db, new_application), fields(user_id = principal.user_id))]
pub async fn submit_application(
    db: &DatabaseConnection,
    principal: &Principal,
    new_application: NewApplication,
) -> Result<CharityApplicationModel> {
    authorize(principal, &[Role::Donor])?;

    let organization_name = required_text(&new_application.organization_name, "Organization name")?;
    let mission = required_text(&new_application.mission, "Mission")?;
    let goal = goal_or_default(new_application.goal)?;

    let pending = CharityApplication::find()
        .filter(charity_application::Column::UserId.eq(principal.user_id))
        .filter(charity_application::Column::Status.eq(ApplicationStatus::Pending))
        .one(db)
        .await?;
    if pending.is_some() {
        return Err(Error::conflict("You already have a pending application"));
    }

    let application = charity_application::ActiveModel {
        user_id: Set(principal.user_id),
        organization_name: Set(organization_name),
        mission: Set(mission),
        location: Set(text_or_default(new_application.location.as_deref(), DEFAULT_LOCATION)),
        category: Set(text_or_default(new_application.category.as_deref(), DEFAULT_CATEGORY)),
        goal: Set(goal),
        status: Set(ApplicationStatus::Pending),
        submitted_at: Set(Utc::now()),
        reviewed_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(application_id = application.id, "Charity application submitted");
    Ok(application)
}

/// Lists applications newest first, optionally by status. Admin only.
pub async fn list_applications(
    db: &DatabaseConnection,
    principal: &Principal,
    status: Option<ApplicationStatus>,
) -> Result<Vec<CharityApplicationModel>> {
    authorize(principal, &[Role::Admin])?;

    let mut query = CharityApplication::find();
    if let Some(status) = status {
        query = query.filter(charity_application::Column::Status.eq(status));
    }
    query
        .order_by_desc(charity_application::Column::SubmittedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the caller's own applications, newest first.
pub async fn get_my_applications(
    db: &DatabaseConnection,
    principal: &Principal,
) -> Result<Vec<CharityApplicationModel>> {
    CharityApplication::find()
        .filter(charity_application::Column::UserId.eq(principal.user_id))
        .order_by_desc(charity_application::Column::SubmittedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Approves a pending application. Admin only.
///
/// In one transaction: marks the application approved, creates an approved charity
/// from it and promotes the applicant to the charity role.
///
/// # Errors
/// * [`Error::NotFound`] if the application or the applicant does not exist
/// * [`Error::Conflict`] if the application is not pending or the applicant already
///   owns a charity
#[instrument(skip(db), fields(admin_id = principal.user_id))]
pub async fn approve_application(
    db: &DatabaseConnection,
    principal: &Principal,
    application_id: i64,
) -> Result<ApprovalResult> {
    authorize(principal, &[Role::Admin])?;

    let txn = db.begin().await?;

    let application = require_application(&txn, application_id).await?;
    require_pending(&application)?;

    if get_charity_by_owner(&txn, application.user_id).await?.is_some() {
        return Err(Error::conflict("Applicant already manages a charity"));
    }

    let now = Utc::now();
    let mut active: charity_application::ActiveModel = application.into();
    active.status = Set(ApplicationStatus::Approved);
    active.reviewed_at = Set(Some(now));
    let application = active.update(&txn).await?;

    let charity = charity::ActiveModel {
        owner_id: Set(application.user_id),
        name: Set(application.organization_name.clone()),
        description: Set(application.mission.clone()),
        location: Set(application.location.clone()),
        category: Set(application.category.clone()),
        goal: Set(application.goal),
        status: Set(CharityStatus::Approved),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    users::set_role(&txn, application.user_id, Role::Charity).await?;

    txn.commit().await?;

    info!(
        application_id = application.id,
        charity_id = charity.id,
        "Approved application for {}",
        charity.name
    );
    Ok(ApprovalResult {
        application,
        charity,
    })
}

/// Rejects a pending application. Admin only.
#[instrument(skip(db), fields(admin_id = principal.user_id))]
pub async fn reject_application(
    db: &DatabaseConnection,
    principal: &Principal,
    application_id: i64,
) -> Result<CharityApplicationModel> {
    authorize(principal, &[Role::Admin])?;

    let application = require_application(db, application_id).await?;
    require_pending(&application)?;

    let mut active: charity_application::ActiveModel = application.into();
    active.status = Set(ApplicationStatus::Rejected);
    active.reviewed_at = Set(Some(Utc::now()));
    let application = active.update(db).await?;

    info!(application_id = application.id, "Rejected application");
    Ok(application)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::{Charity, User};
    use crate::errors::ErrorKind;
    use crate::test_utils::*;
    use sea_orm::PaginatorTrait;

    fn helping_hands() -> NewApplication {
        NewApplication {
            organization_name: "Helping Hands".to_string(),
            mission: "Feeding families".to_string(),
            location: Some("Mombasa".to_string()),
            category: None,
            goal: Some(2500.0),
        }
    }

    #[tokio::test]
    async fn test_submit_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let donor = principal_of(&create_test_user(&db, "donor@example.com", Role::Donor).await?);

        let mut blank = helping_hands();
        blank.organization_name = "   ".to_string();
        let err = submit_application(&db, &donor, blank).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let mut bad_goal = helping_hands();
        bad_goal.goal = Some(-1.0);
        let err = submit_application(&db, &donor, bad_goal).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let charity = Principal::new(2, Role::Charity);
        let err = submit_application(&db, &charity, helping_hands())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        assert_eq!(CharityApplication::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_one_pending_application_per_user() -> Result<()> {
        let db = setup_test_db().await?;
        let donor = create_test_user(&db, "donor@example.com", Role::Donor).await?;

        let application = submit_application(&db, &principal_of(&donor), helping_hands()).await?;
        assert_eq!(application.status, ApplicationStatus::Pending);
        assert_eq!(application.category, DEFAULT_CATEGORY);

        let err = submit_application(&db, &principal_of(&donor), helping_hands())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let mine = get_my_applications(&db, &principal_of(&donor)).await?;
        assert_eq!(mine.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_approve_creates_charity_and_promotes() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let donor = create_test_user(&db, "donor@example.com", Role::Donor).await?;
        let application = submit_application(&db, &principal_of(&donor), helping_hands()).await?;

        let result = approve_application(&db, &admin, application.id).await?;
        assert_eq!(result.application.status, ApplicationStatus::Approved);
        assert!(result.application.reviewed_at.is_some());
        assert_eq!(result.charity.name, "Helping Hands");
        assert_eq!(result.charity.description, "Feeding families");
        assert_eq!(result.charity.location, "Mombasa");
        assert_eq!(result.charity.goal, 2500.0);
        assert_eq!(result.charity.status, CharityStatus::Approved);
        assert_eq!(result.charity.owner_id, donor.id);

        let promoted = User::find_by_id(donor.id).one(&db).await?.unwrap();
        assert_eq!(promoted.role, Role::Charity);
        Ok(())
    }

    #[tokio::test]
    async fn test_reapproval_conflicts_without_second_charity() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let donor = create_test_user(&db, "donor@example.com", Role::Donor).await?;
        let application = submit_application(&db, &principal_of(&donor), helping_hands()).await?;

        approve_application(&db, &admin, application.id).await?;
        let err = approve_application(&db, &admin, application.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err = reject_application(&db, &admin, application.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        assert_eq!(Charity::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_approval_rolls_back_when_applicant_missing() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let donor = create_test_user(&db, "donor@example.com", Role::Donor).await?;
        let application = submit_application(&db, &principal_of(&donor), helping_hands()).await?;

        // Remove the applicant without cascading to the application
        db.execute_unprepared("PRAGMA foreign_keys = OFF").await?;
        User::delete_by_id(donor.id).exec(&db).await?;

        let err = approve_application(&db, &admin, application.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        assert_eq!(Charity::find().count(&db).await?, 0);
        let unchanged = CharityApplication::find_by_id(application.id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(unchanged.status, ApplicationStatus::Pending);
        assert!(unchanged.reviewed_at.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_reject_and_admin_only() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db).await?;
        let donor = create_test_user(&db, "donor@example.com", Role::Donor).await?;
        let application = submit_application(&db, &principal_of(&donor), helping_hands()).await?;

        let err = approve_application(&db, &principal_of(&donor), application.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let rejected = reject_application(&db, &admin, application.id).await?;
        assert_eq!(rejected.status, ApplicationStatus::Rejected);
        assert_eq!(Charity::find().count(&db).await?, 0);

        let pending = list_applications(&db, &admin, Some(ApplicationStatus::Pending)).await?;
        assert!(pending.is_empty());
        assert_eq!(list_applications(&db, &admin, None).await?.len(), 1);

        let err = approve_application(&db, &admin, 404).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        Ok(())
    }
}
