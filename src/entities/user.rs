//! User entity - Every account on the platform.
//!
//! The role column drives authorization; the password hash is an Argon2 PHC string
//! and is never serialized.

use super::sea_orm_active_enums::Role;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (organization name for charity registrations)
    pub name: String,
    /// Login email, stored trimmed and lowercased
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role used by the authorization guard
    pub role: Role,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A user owns at most one charity
    #[sea_orm(has_many = "super::charity::Entity")]
    Charities,
    /// A user may submit charity applications
    #[sea_orm(has_many = "super::charity_application::Entity")]
    CharityApplications,
    /// A user makes donations
    #[sea_orm(has_many = "super::donation::Entity")]
    Donations,
}

impl Related<super::charity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Charities.def()
    }
}

impl Related<super::charity_application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CharityApplications.def()
    }
}

impl Related<super::donation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
