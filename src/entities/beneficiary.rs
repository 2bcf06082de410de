//! Beneficiary entity - A person supported by a charity.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Beneficiary database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "beneficiaries")]
pub struct Model {
    /// Unique identifier for the beneficiary
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Supporting charity
    pub charity_id: i64,
    /// Full name
    pub name: String,
    /// Age in years, if known
    pub age: Option<i32>,
    /// School attended, if relevant
    pub school: Option<String>,
    /// Free-form notes
    pub description: Option<String>,
    /// Whether support has been delivered
    pub received_support: bool,
    /// When support was first marked as delivered
    pub received_at: Option<DateTimeUtc>,
}

/// Defines relationships between Beneficiary and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each beneficiary belongs to one charity
    #[sea_orm(
        belongs_to = "super::charity::Entity",
        from = "Column::CharityId",
        to = "super::charity::Column::Id",
        on_delete = "Cascade"
    )]
    Charity,
    /// Inventory items handed to this beneficiary
    #[sea_orm(has_many = "super::inventory::Entity")]
    Inventory,
}

impl Related<super::charity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Charity.def()
    }
}

impl Related<super::inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inventory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
