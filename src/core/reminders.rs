//! Reminder business logic - recurring donation prompts.
//!
//! A delivered reminder is marked `sent` and chained to exactly one successor
//! [`RECURRENCE_INTERVAL_DAYS`] days later. A failed delivery is marked `failed` and
//! not retried. Old terminal reminders are purged after a retention period.

use crate::{
    entities::{
        Charity, CharityModel, Reminder, ReminderModel, ReminderStatus, User, UserModel, reminder,
    },
    errors::{Error, Result},
    services::Notifier,
};
use chrono::Duration;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use std::fmt::Write;
use tracing::{error, info, instrument, warn};

/// Days between two reminders of a recurring pledge.
pub const RECURRENCE_INTERVAL_DAYS: i64 = 30;

/// Default age after which sent and failed reminders are purged.
pub const DEFAULT_RETENTION_DAYS: i64 = 180;

/// Counts from one [`process_due_reminders`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReminderRunResult {
    /// Reminders that were due
    pub due: usize,
    /// Delivered and chained
    pub sent: usize,
    /// Delivery failed
    pub failed: usize,
    /// Already handled elsewhere
    pub skipped: usize,
    /// Storage errors; the reminder stays pending
    pub errors: usize,
    /// Ids of the successor reminders created
    pub successors: Vec<i64>,
}

enum Delivery {
    Sent { successor_id: i64 },
    Failed,
    Skipped,
}

/// Schedules a reminder. User and charity must exist.
pub async fn create_reminder(
    db: &DatabaseConnection,
    user_id: i64,
    charity_id: i64,
    amount: f64,
    scheduled_time: DateTimeUtc,
) -> Result<ReminderModel> {
    if !(amount.is_finite() && amount > 0.0) {
        return Err(Error::invalid(format!("Amount must be positive, got {amount}")));
    }
    if User::find_by_id(user_id).one(db).await?.is_none() {
        return Err(Error::not_found("User", user_id));
    }
    if Charity::find_by_id(charity_id).one(db).await?.is_none() {
        return Err(Error::not_found("Charity", charity_id));
    }

    reminder::ActiveModel {
        user_id: Set(user_id),
        charity_id: Set(charity_id),
        amount: Set(amount),
        scheduled_time: Set(scheduled_time),
        status: Set(ReminderStatus::Pending),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Pending reminders scheduled at or before `now`, oldest first.
pub async fn get_due_reminders(
    db: &DatabaseConnection,
    now: DateTimeUtc,
) -> Result<Vec<ReminderModel>> {
    Reminder::find()
        .filter(reminder::Column::Status.eq(ReminderStatus::Pending))
        .filter(reminder::Column::ScheduledTime.lte(now))
        .order_by_asc(reminder::Column::ScheduledTime)
        .all(db)
        .await
        .map_err(Into::into)
}

fn reminder_message(user: &UserModel, charity: &CharityModel, amount: f64) -> (String, String) {
    let subject = format!("Your monthly donation to {}", charity.name);
    let body = format!(
        "Hi {},\n\nThis is a reminder of your recurring donation of {:.2} to {}. \
         Thank you for your continued support.",
        user.name, amount, charity.name
    );
    (subject, body)
}

async fn deliver(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    due: &ReminderModel,
) -> Result<Delivery> {
    let user = User::find_by_id(due.user_id).one(db).await?;
    let charity = Charity::find_by_id(due.charity_id).one(db).await?;

    let delivered = match (&user, &charity) {
        (Some(user), Some(charity)) => {
            let (subject, body) = reminder_message(user, charity, due.amount);
            notifier.send(&user.email, &subject, &body).await
        }
        _ => {
            warn!(reminder_id = due.id, "Reminder refers to a missing user or charity");
            false
        }
    };

    let txn = db.begin().await?;

    let marked = Reminder::update_many()
        .set(reminder::ActiveModel {
            status: Set(if delivered {
                ReminderStatus::Sent
            } else {
                ReminderStatus::Failed
            }),
            ..Default::default()
        })
        .filter(reminder::Column::Id.eq(due.id))
        .filter(reminder::Column::Status.eq(ReminderStatus::Pending))
        .exec(&txn)
        .await?;

    if marked.rows_affected == 0 {
        return Ok(Delivery::Skipped);
    }

    if !delivered {
        txn.commit().await?;
        return Ok(Delivery::Failed);
    }

    let successor = reminder::ActiveModel {
        user_id: Set(due.user_id),
        charity_id: Set(due.charity_id),
        amount: Set(due.amount),
        scheduled_time: Set(due.scheduled_time + Duration::days(RECURRENCE_INTERVAL_DAYS)),
        status: Set(ReminderStatus::Pending),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    Ok(Delivery::Sent {
        successor_id: successor.id,
    })
}

/// Delivers every reminder due at `now`.
///
/// Each reminder is handled independently: a storage error is logged and counted and
/// the run moves on to the next one.
#[instrument(skip(db, notifier))]
pub async fn process_due_reminders(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    now: DateTimeUtc,
) -> Result<ReminderRunResult> {
    let due = get_due_reminders(db, now).await?;
    let mut result = ReminderRunResult {
        due: due.len(),
        ..Default::default()
    };

    for reminder in &due {
        match deliver(db, notifier, reminder).await {
            Ok(Delivery::Sent { successor_id }) => {
                result.sent += 1;
                result.successors.push(successor_id);
            }
            Ok(Delivery::Failed) => result.failed += 1,
            Ok(Delivery::Skipped) => result.skipped += 1,
            Err(e) => {
                error!(reminder_id = reminder.id, "Failed to process reminder: {}", e);
                result.errors += 1;
            }
        }
    }

    if result.due > 0 {
        info!(
            sent = result.sent,
            failed = result.failed,
            skipped = result.skipped,
            errors = result.errors,
            "Processed {} due reminders",
            result.due
        );
    }
    Ok(result)
}

/// Deletes sent and failed reminders scheduled more than `retention_days` before `now`.
/// Returns the number deleted.
pub async fn purge_terminal_reminders(
    db: &DatabaseConnection,
    now: DateTimeUtc,
    retention_days: i64,
) -> Result<u64> {
    let cutoff = now - Duration::days(retention_days);
    let deleted = Reminder::delete_many()
        .filter(reminder::Column::Status.is_in([ReminderStatus::Sent, ReminderStatus::Failed]))
        .filter(reminder::Column::ScheduledTime.lt(cutoff))
        .exec(db)
        .await?;
    Ok(deleted.rows_affected)
}

/// Human-readable summary of a reminder run.
#[must_use]
pub fn format_reminder_run_summary(result: &ReminderRunResult) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Reminder run: {} due", result.due);
    let _ = writeln!(output, "  Sent: {}", result.sent);
    let _ = writeln!(output, "  Failed: {}", result.failed);
    if result.skipped > 0 {
        let _ = writeln!(output, "  Skipped: {}", result.skipped);
    }
    if result.errors > 0 {
        let _ = writeln!(output, "  Errors: {}", result.errors);
    }
    output
}
