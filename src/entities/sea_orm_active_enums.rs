//! String-backed enums shared by several entities.
//!
//! Stored as short lowercase strings so the database stays readable and the JSON
//! representation matches the column value.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role carried by every user; drives authorization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular donor (default on registration)
    #[sea_orm(string_value = "donor")]
    Donor,
    /// Owner of a charity profile
    #[sea_orm(string_value = "charity")]
    Charity,
    /// Platform administrator
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// Review state of a charity profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum CharityStatus {
    /// Waiting for an admin decision
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Visible and accepting donations
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Refused by an admin
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Review state of a charity application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Submitted, not yet reviewed
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved; a charity was created from it
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Lifecycle of a donation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    /// Awaiting payment
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Paid
    #[sea_orm(string_value = "complete")]
    Complete,
    /// Payment failed
    #[sea_orm(string_value = "failed")]
    Failed,
}

/// Lifecycle of a payment attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Waiting for the gateway callback
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Confirmed by the gateway
    #[sea_orm(string_value = "success")]
    Success,
    /// Declined or cancelled
    #[sea_orm(string_value = "failed")]
    Failed,
}

/// Delivery state of a reminder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    /// Not yet delivered
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Delivered
    #[sea_orm(string_value = "sent")]
    Sent,
    /// Delivery failed; not retried
    #[sea_orm(string_value = "failed")]
    Failed,
}
