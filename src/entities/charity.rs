//! Charity entity - A fundraising organization owned by one user.
//!
//! Charities are created either by approving an application (status `approved`) or by a
//! charity-role user registering a profile (status `pending`). Deleting a charity
//! cascades to its donations, stories, beneficiaries and inventory.

use super::sea_orm_active_enums::CharityStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Charity database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "charities")]
pub struct Model {
    /// Unique identifier for the charity
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user; one charity per user
    #[sea_orm(unique)]
    pub owner_id: i64,
    /// Public name
    pub name: String,
    /// Mission statement
    pub description: String,
    /// Where the charity operates
    pub location: String,
    /// Cause category (e.g. "Health", "Education")
    pub category: String,
    /// Fundraising goal
    pub goal: f64,
    /// Review state
    pub status: CharityStatus,
    /// When the charity was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Charity and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each charity belongs to its owner
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
    /// Donations made to this charity
    #[sea_orm(has_many = "super::donation::Entity")]
    Donations,
    /// Stories published by this charity
    #[sea_orm(has_many = "super::story::Entity")]
    Stories,
    /// People supported by this charity
    #[sea_orm(has_many = "super::beneficiary::Entity")]
    Beneficiaries,
    /// Items held or distributed by this charity
    #[sea_orm(has_many = "super::inventory::Entity")]
    Inventory,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::donation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donations.def()
    }
}

impl Related<super::story::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stories.def()
    }
}

impl Related<super::beneficiary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Beneficiaries.def()
    }
}

impl Related<super::inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inventory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
