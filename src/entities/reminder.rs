//! Reminder entity - A scheduled nudge for a recurring donor.
//!
//! Reminders reference a user and a charity by id only; existence is checked when a
//! reminder is created, so there are no foreign keys. A reminder that is sent spawns
//! its successor 30 days later.

use super::sea_orm_active_enums::ReminderStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reminder database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reminders")]
pub struct Model {
    /// Unique identifier for the reminder
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Donor to remind
    pub user_id: i64,
    /// Charity the donation goes to
    pub charity_id: i64,
    /// Suggested amount
    pub amount: f64,
    /// When the reminder becomes due
    pub scheduled_time: DateTimeUtc,
    /// Delivery state
    pub status: ReminderStatus,
}

/// Reminders have no enforced relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
