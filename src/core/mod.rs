//! Core business logic - framework-agnostic workflows for the donation platform.
//!
//! Every function takes an explicit database handle and, where the operation is
//! guarded, the calling [`crate::auth::Principal`]. Nothing here knows about HTTP.

/// Admin totals and activity feed
pub mod admin;
/// Charity applications and their review
pub mod applications;
/// People supported by charities
pub mod beneficiaries;
/// Charity profiles, review and summaries
pub mod charities;
/// Donations through the simulated and gateway paths
pub mod donations;
/// Items held and distributed by charities
pub mod inventory;
/// Gateway callback handling
pub mod payments;
/// Recurring donation reminders
pub mod reminders;
/// Charity stories
pub mod stories;
/// Accounts and credentials
pub mod users;
