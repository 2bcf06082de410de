//! Story entity - Impact stories published by a charity.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Story database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stories")]
pub struct Model {
    /// Unique identifier for the story
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Publishing charity
    pub charity_id: i64,
    /// Headline
    pub title: String,
    /// Body text
    #[sea_orm(column_type = "Text")]
    pub content: String,
    /// When the story was published
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Story and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each story belongs to one charity
    #[sea_orm(
        belongs_to = "super::charity::Entity",
        from = "Column::CharityId",
        to = "super::charity::Column::Id",
        on_delete = "Cascade"
    )]
    Charity,
}

impl Related<super::charity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Charity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
