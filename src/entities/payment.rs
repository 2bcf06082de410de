//! Payment entity - One settlement attempt for a donation.
//!
//! `gateway_reference` is the id the gateway issued when the payment was initiated and
//! never changes. `transaction_id` starts equal to it and is rewritten to the gateway's
//! receipt number once the payment succeeds.

use super::sea_orm_active_enums::PaymentStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Donation being paid
    pub donation_id: i64,
    /// Payment method, e.g. `"mpesa"`
    pub method: String,
    /// Reference issued by the gateway at initiation
    pub gateway_reference: String,
    /// Gateway transaction id or receipt number
    pub transaction_id: String,
    /// Settlement state
    pub status: PaymentStatus,
    /// When the payment succeeded
    pub paid_at: Option<DateTimeUtc>,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one donation
    #[sea_orm(
        belongs_to = "super::donation::Entity",
        from = "Column::DonationId",
        to = "super::donation::Column::Id",
        on_delete = "Cascade"
    )]
    Donation,
}

impl Related<super::donation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
