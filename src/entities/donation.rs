//! Donation entity - A pledge of money from a user to a charity.
//!
//! A donation is `pending` until a payment settles it. `recurring` marks donations whose
//! donor receives monthly reminders; `is_anonymous` hides the donor from the charity.

use super::sea_orm_active_enums::DonationStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Donation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "donations")]
pub struct Model {
    /// Unique identifier for the donation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Donor
    pub user_id: i64,
    /// Receiving charity
    pub charity_id: i64,
    /// Donated amount, always positive
    pub amount: f64,
    /// Whether the donor asked for monthly reminders
    pub recurring: bool,
    /// Whether the donor is hidden from the charity
    pub is_anonymous: bool,
    /// Payment state
    pub status: DonationStatus,
    /// When the donation was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Donation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each donation belongs to its donor
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each donation belongs to one charity
    #[sea_orm(
        belongs_to = "super::charity::Entity",
        from = "Column::CharityId",
        to = "super::charity::Column::Id",
        on_delete = "Cascade"
    )]
    Charity,
    /// Payment attempts for this donation
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::charity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Charity.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
