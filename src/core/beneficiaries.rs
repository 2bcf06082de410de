//! Beneficiary business logic - people a charity supports.
//!
//! Beneficiaries are private to their charity: only the owner and admins can see them.

use crate::{
    auth::Principal,
    core::charities::{ensure_owner, ensure_owner_or_admin, require_charity, required_text},
    entities::{Beneficiary, BeneficiaryModel, Inventory, beneficiary, inventory},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;

/// Input for a new beneficiary.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBeneficiary {
    /// Full name
    pub name: String,
    /// Age in years
    #[serde(default)]
    pub age: Option<i32>,
    /// School attended
    #[serde(default)]
    pub school: Option<String>,
    /// Free-form notes
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update; `None` keeps the current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BeneficiaryUpdate {
    /// New name
    pub name: Option<String>,
    /// New age
    pub age: Option<i32>,
    /// New school
    pub school: Option<String>,
    /// New notes
    pub description: Option<String>,
    /// Setting this to `true` stamps `received_at`
    pub received_support: Option<bool>,
}

fn validate_age(age: Option<i32>) -> Result<Option<i32>> {
    match age {
        Some(age) if age < 0 => Err(Error::invalid(format!("Age cannot be negative, got {age}"))),
        _ => Ok(age),
    }
}

/// Loads a beneficiary or fails with [`Error::NotFound`].
pub(crate) async fn require_beneficiary<C>(db: &C, beneficiary_id: i64) -> Result<BeneficiaryModel>
where
    C: ConnectionTrait,
{
    Beneficiary::find_by_id(beneficiary_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Beneficiary", beneficiary_id))
}

/// Lists a charity's beneficiaries by name. Owner or admin.
pub async fn list_beneficiaries(
    db: &DatabaseConnection,
    principal: &Principal,
    charity_id: i64,
) -> Result<Vec<BeneficiaryModel>> {
    let charity = require_charity(db, charity_id).await?;
    ensure_owner_or_admin(principal, &charity)?;

    Beneficiary::find()
        .filter(beneficiary::Column::CharityId.eq(charity_id))
        .order_by_asc(beneficiary::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns one beneficiary. Owner or admin.
pub async fn get_beneficiary(
    db: &DatabaseConnection,
    principal: &Principal,
    beneficiary_id: i64,
) -> Result<BeneficiaryModel> {
    let beneficiary = require_beneficiary(db, beneficiary_id).await?;
    let charity = require_charity(db, beneficiary.charity_id).await?;
    ensure_owner_or_admin(principal, &charity)?;
    Ok(beneficiary)
}

/// Adds a beneficiary to a charity. Owner only.
pub async fn create_beneficiary(
    db: &DatabaseConnection,
    principal: &Principal,
    charity_id: i64,
    new_beneficiary: NewBeneficiary,
) -> Result<BeneficiaryModel> {
    let charity = require_charity(db, charity_id).await?;
    ensure_owner(principal, &charity)?;

    beneficiary::ActiveModel {
        charity_id: Set(charity.id),
        name: Set(required_text(&new_beneficiary.name, "Name")?),
        age: Set(validate_age(new_beneficiary.age)?),
        school: Set(new_beneficiary.school),
        description: Set(new_beneficiary.description),
        received_support: Set(false),
        received_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Edits a beneficiary. Owner only.
///
/// Marking support as received stamps `received_at` the first time; unmarking clears it.
pub async fn update_beneficiary(
    db: &DatabaseConnection,
    principal: &Principal,
    beneficiary_id: i64,
    update: BeneficiaryUpdate,
) -> Result<BeneficiaryModel> {
    let beneficiary = require_beneficiary(db, beneficiary_id).await?;
    let charity = require_charity(db, beneficiary.charity_id).await?;
    ensure_owner(principal, &charity)?;

    let already_received = beneficiary.received_support;
    let mut active: beneficiary::ActiveModel = beneficiary.into();
    if let Some(name) = update.name {
        active.name = Set(required_text(&name, "Name")?);
    }
    if update.age.is_some() {
        active.age = Set(validate_age(update.age)?);
    }
    if update.school.is_some() {
        active.school = Set(update.school);
    }
    if update.description.is_some() {
        active.description = Set(update.description);
    }
    match update.received_support {
        Some(true) if !already_received => {
            active.received_support = Set(true);
            active.received_at = Set(Some(Utc::now()));
        }
        Some(false) => {
            active.received_support = Set(false);
            active.received_at = Set(None);
        }
        _ => {}
    }

    Ok(active.update(db).await?)
}

/// Removes a beneficiary. Items handed to it become unassigned and undistributed.
/// Owner or admin.
pub async fn delete_beneficiary(
    db: &DatabaseConnection,
    principal: &Principal,
    beneficiary_id: i64,
) -> Result<()> {
    let beneficiary = require_beneficiary(db, beneficiary_id).await?;
    let charity = require_charity(db, beneficiary.charity_id).await?;
    ensure_owner_or_admin(principal, &charity)?;

    let txn = db.begin().await?;
    Inventory::update_many()
        .set(inventory::ActiveModel {
            beneficiary_id: Set(None),
            distributed_at: Set(None),
            ..Default::default()
        })
        .filter(inventory::Column::BeneficiaryId.eq(beneficiary.id))
        .exec(&txn)
        .await?;
    Beneficiary::delete_by_id(beneficiary.id).exec(&txn).await?;
    txn.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::Role;
    use crate::errors::ErrorKind;
    use crate::test_utils::*;

    fn amina() -> NewBeneficiary {
        NewBeneficiary {
            name: "Amina".to_string(),
            age: Some(11),
            school: Some("Kibera Primary".to_string()),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_received_support_stamps_time() -> Result<()> {
        let db = setup_test_db().await?;
        let (owner, charity) = create_approved_charity(&db, "org@example.com", "Books For All").await?;
        let owner = principal_of(&owner);

        let beneficiary = create_beneficiary(&db, &owner, charity.id, amina()).await?;
        assert!(!beneficiary.received_support);
        assert!(beneficiary.received_at.is_none());

        let received = update_beneficiary(
            &db,
            &owner,
            beneficiary.id,
            BeneficiaryUpdate {
                received_support: Some(true),
                ..Default::default()
            },
        )
        .await?;
        assert!(received.received_support);
        let stamped = received.received_at.unwrap();

        // Marking again keeps the original stamp
        let again = update_beneficiary(
            &db,
            &owner,
            beneficiary.id,
            BeneficiaryUpdate {
                name: Some("Amina W.".to_string()),
                received_support: Some(true),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(again.name, "Amina W.");
        assert_eq!(again.received_at, Some(stamped));
        Ok(())
    }

    #[tokio::test]
    async fn test_beneficiaries_are_private() -> Result<()> {
        let db = setup_test_db().await?;
        let (owner, charity) = create_approved_charity(&db, "org@example.com", "Books For All").await?;
        let donor = create_test_user(&db, "donor@example.com", Role::Donor).await?;
        let beneficiary = create_beneficiary(&db, &principal_of(&owner), charity.id, amina()).await?;

        let err = list_beneficiaries(&db, &principal_of(&donor), charity.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err = create_beneficiary(&db, &principal_of(&donor), charity.id, amina())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let admin = create_test_admin(&db).await?;
        assert_eq!(list_beneficiaries(&db, &admin, charity.id).await?.len(), 1);
        get_beneficiary(&db, &admin, beneficiary.id).await?;

        delete_beneficiary(&db, &admin, beneficiary.id).await?;
        let err = get_beneficiary(&db, &admin, beneficiary.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_beneficiary_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let (owner, charity) = create_approved_charity(&db, "org@example.com", "Books For All").await?;

        let mut negative = amina();
        negative.age = Some(-3);
        let err = create_beneficiary(&db, &principal_of(&owner), charity.id, negative)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        Ok(())
    }
}
