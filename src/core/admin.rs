//! Admin reporting - platform totals and a recent activity feed.

use crate::{
    auth::{Principal, authorize},
    entities::{
        ApplicationStatus, Charity, CharityApplication, CharityStatus, Donation, DonationStatus,
        Role, User, charity, charity_application, donation,
    },
    errors::Result,
};
use sea_orm::{ActiveEnum, PaginatorTrait, QueryOrder, QuerySelect, prelude::*};
use serde::Serialize;

/// Entries taken from each source for the activity feed.
const ACTIVITY_SOURCE_LIMIT: u64 = 10;
/// Maximum entries in the activity feed.
const ACTIVITY_FEED_LIMIT: usize = 20;

/// Platform totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    /// All accounts
    pub total_users: u64,
    /// Charities in any state
    pub total_charities: u64,
    /// Charities accepting donations
    pub approved_charities: u64,
    /// Applications awaiting review
    pub pending_applications: u64,
    /// Completed donations
    pub completed_donations: u64,
    /// Sum of completed donations
    pub total_raised: f64,
}

/// Source of an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A completed donation
    Donation,
    /// A charity application
    Application,
}

/// One entry of the activity feed.
#[derive(Debug, Clone, Serialize)]
pub struct Activity {
    /// Where it came from
    pub kind: ActivityKind,
    /// Id of the donation or application
    pub id: i64,
    /// Human-readable description
    pub message: String,
    /// When it happened
    pub timestamp: DateTimeUtc,
    /// Donation amount
    pub amount: Option<f64>,
    /// Current status, as stored
    pub status: String,
}

/// Platform totals. Admin only.
pub async fn dashboard_stats(db: &DatabaseConnection, principal: &Principal) -> Result<DashboardStats> {
    authorize(principal, &[Role::Admin])?;

    let completed = Donation::find()
        .filter(donation::Column::Status.eq(DonationStatus::Complete))
        .all(db)
        .await?;

    Ok(DashboardStats {
        total_users: User::find().count(db).await?,
        total_charities: Charity::find().count(db).await?,
        approved_charities: Charity::find()
            .filter(charity::Column::Status.eq(CharityStatus::Approved))
            .count(db)
            .await?,
        pending_applications: CharityApplication::find()
            .filter(charity_application::Column::Status.eq(ApplicationStatus::Pending))
            .count(db)
            .await?,
        completed_donations: completed.len() as u64,
        total_raised: completed.iter().map(|d| d.amount).sum(),
    })
}

/// Latest completed donations and applications, newest first. Admin only.
pub async fn recent_activities(db: &DatabaseConnection, principal: &Principal) -> Result<Vec<Activity>> {
    authorize(principal, &[Role::Admin])?;

    let donations = Donation::find()
        .filter(donation::Column::Status.eq(DonationStatus::Complete))
        .order_by_desc(donation::Column::CreatedAt)
        .limit(ACTIVITY_SOURCE_LIMIT)
        .find_also_related(Charity)
        .all(db)
        .await?;

    let applications = CharityApplication::find()
        .order_by_desc(charity_application::Column::SubmittedAt)
        .limit(ACTIVITY_SOURCE_LIMIT)
        .all(db)
        .await?;

    let mut activities: Vec<Activity> = donations
        .into_iter()
        .map(|(donation, charity)| Activity {
            kind: ActivityKind::Donation,
            id: donation.id,
            message: format!(
                "Donation of {:.2} to {}",
                donation.amount,
                charity.map_or_else(|| "a removed charity".to_string(), |c| c.name)
            ),
            timestamp: donation.created_at,
            amount: Some(donation.amount),
            status: donation.status.to_value(),
        })
        .chain(applications.into_iter().map(|application| Activity {
            kind: ActivityKind::Application,
            id: application.id,
            message: format!("Application from {}", application.organization_name),
            timestamp: application.submitted_at,
            amount: None,
            status: application.status.to_value(),
        }))
        .collect();

    activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    activities.truncate(ACTIVITY_FEED_LIMIT);
    Ok(activities)
}
