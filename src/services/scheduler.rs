//! Periodic reminder job.
//!
//! Runs [`process_due_reminders`] and [`purge_terminal_reminders`] on a fixed interval.
//! Only one worker may run against a database: there is no claim step, so two workers
//! could notify the same donor twice for one cycle.

use crate::{
    core::reminders::{
        ReminderRunResult, format_reminder_run_summary, process_due_reminders,
        purge_terminal_reminders,
    },
    errors::Result,
    services::Notifier,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

/// Runs one reminder cycle: deliver due reminders, then purge old terminal ones.
pub async fn run_reminder_cycle(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    retention_days: i64,
) -> Result<(ReminderRunResult, u64)> {
    let now = Utc::now();
    let result = process_due_reminders(db, notifier, now).await?;
    let purged = purge_terminal_reminders(db, now, retention_days).await?;
    Ok((result, purged))
}

/// Loops forever, running a reminder cycle every `interval`. Cycle errors are logged
/// and the loop continues.
pub async fn run_reminder_worker(
    db: DatabaseConnection,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    retention_days: i64,
) {
    info!("Reminder worker started, interval {:?}", interval);
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;
        match run_reminder_cycle(&db, notifier.as_ref(), retention_days).await {
            Ok((result, purged)) => {
                if result.due > 0 || purged > 0 {
                    info!(
                        "{}Purged {} old reminders",
                        format_reminder_run_summary(&result),
                        purged
                    );
                }
            }
            Err(e) => error!("Reminder cycle failed: {}", e),
        }
    }
}
