//! Charity application entity - A donor's request to become a charity.

use super::sea_orm_active_enums::ApplicationStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Charity application database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "charity_applications")]
pub struct Model {
    /// Unique identifier for the application
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Applicant
    pub user_id: i64,
    /// Proposed charity name
    pub organization_name: String,
    /// Proposed charity description
    pub mission: String,
    /// Where the organization operates
    pub location: String,
    /// Cause category
    pub category: String,
    /// Fundraising goal
    pub goal: f64,
    /// Review state
    pub status: ApplicationStatus,
    /// When the application was submitted
    pub submitted_at: DateTimeUtc,
    /// When an admin approved or rejected it
    pub reviewed_at: Option<DateTimeUtc>,
}

/// Defines relationships between `CharityApplication` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each application belongs to its applicant
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
