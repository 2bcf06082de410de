//! Admin routes.

use crate::{
    api::{AppState, AuthenticatedUser},
    auth::authorize,
    core::{
        admin::{self, Activity, DashboardStats},
        charities,
        reminders::{
            ReminderRunResult, format_reminder_run_summary, process_due_reminders,
            purge_terminal_reminders,
        },
    },
    entities::{CharityModel, Role},
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Optional body for a rejection.
#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    /// Why the charity was rejected
    pub reason: Option<String>,
}

/// Result of a manual reminder run.
#[derive(Debug, Serialize)]
pub struct ReminderRunResponse {
    /// Counts
    pub result: ReminderRunResult,
    /// Same counts as text
    pub summary: String,
}

/// `GET /admin/dashboard`
pub async fn dashboard(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<DashboardStats>> {
    Ok(Json(admin::dashboard_stats(&state.db, &principal).await?))
}

/// `GET /admin/activities`
pub async fn activities(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<Vec<Activity>>> {
    Ok(Json(admin::recent_activities(&state.db, &principal).await?))
}

/// `GET /admin/charities/pending`
pub async fn pending_charities(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<Vec<CharityModel>>> {
    Ok(Json(
        charities::list_pending_charities(&state.db, &principal).await?,
    ))
}

/// `POST /admin/charities/:id/approve`
pub async fn approve_charity(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<CharityModel>> {
    Ok(Json(
        charities::approve_charity(&state.db, &principal, id).await?,
    ))
}

/// `POST /admin/charities/:id/reject`
pub async fn reject_charity(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i64>,
    body: Option<Json<RejectRequest>>,
) -> Result<Json<CharityModel>> {
    let reason = body.and_then(|Json(request)| request.reason);
    Ok(Json(
        charities::reject_charity(&state.db, &principal, id, reason.as_deref()).await?,
    ))
}

/// `POST /admin/reminders/run` - processes due reminders now.
pub async fn run_reminders(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<ReminderRunResponse>> {
    authorize(&principal, &[Role::Admin])?;
    let result = process_due_reminders(&state.db, state.notifier.as_ref(), Utc::now()).await?;
    let summary = format_reminder_run_summary(&result);
    Ok(Json(ReminderRunResponse { result, summary }))
}

/// `POST /admin/reminders/purge` - deletes old sent and failed reminders.
pub async fn purge_reminders(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<Value>> {
    authorize(&principal, &[Role::Admin])?;
    let purged =
        purge_terminal_reminders(&state.db, Utc::now(), state.reminder_retention_days).await?;
    Ok(Json(json!({ "purged": purged })))
}
