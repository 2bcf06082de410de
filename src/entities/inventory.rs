//! Inventory entity - Goods held by a charity, optionally handed to a beneficiary.
//!
//! `distributed_at` is set exactly when `beneficiary_id` is set.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Inventory database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning charity
    pub charity_id: i64,
    /// Item description (e.g. "School uniforms")
    pub item_name: String,
    /// Number of units
    pub quantity: i32,
    /// Recipient, once distributed
    pub beneficiary_id: Option<i64>,
    /// When the item was handed out
    pub distributed_at: Option<DateTimeUtc>,
}

/// Defines relationships between Inventory and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one charity
    #[sea_orm(
        belongs_to = "super::charity::Entity",
        from = "Column::CharityId",
        to = "super::charity::Column::Id",
        on_delete = "Cascade"
    )]
    Charity,
    /// Optional recipient
    #[sea_orm(
        belongs_to = "super::beneficiary::Entity",
        from = "Column::BeneficiaryId",
        to = "super::beneficiary::Column::Id",
        on_delete = "SetNull"
    )]
    Beneficiary,
}

impl Related<super::charity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Charity.def()
    }
}

impl Related<super::beneficiary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Beneficiary.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
