//! Donation routes.

use crate::{
    api::{AppState, AuthenticatedUser, JsonBody},
    core::donations::{self, CharityDonationView, NewDonation},
    entities::{DonationModel, PaymentModel},
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

/// Body for a recurring pledge.
#[derive(Debug, Deserialize)]
pub struct RecurringRequest {
    /// Target charity
    pub charity_id: i64,
    /// Amount per cycle
    pub amount: f64,
}

/// A donation with its payments.
#[derive(Debug, Serialize)]
pub struct DonationDetail {
    /// The donation
    pub donation: DonationModel,
    /// Its payment attempts
    pub payments: Vec<PaymentModel>,
}

/// `POST /donations`
pub async fn create_donation(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    JsonBody(new_donation): JsonBody<NewDonation>,
) -> Result<impl IntoResponse> {
    let receipt = donations::create_donation(&state.db, &principal, new_donation).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// `POST /donations/recurring`
pub async fn setup_recurring(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    JsonBody(request): JsonBody<RecurringRequest>,
) -> Result<impl IntoResponse> {
    let setup =
        donations::setup_recurring(&state.db, &principal, request.charity_id, request.amount)
            .await?;
    Ok((StatusCode::CREATED, Json(setup)))
}

/// `GET /donations/mine`
pub async fn my_donations(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<Vec<DonationModel>>> {
    Ok(Json(donations::list_my_donations(&state.db, &principal).await?))
}

/// `GET /donations/:id`
pub async fn get_donation(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<DonationDetail>> {
    let (donation, payments) = donations::get_donation(&state.db, &principal, id).await?;
    Ok(Json(DonationDetail { donation, payments }))
}

/// `GET /charities/:id/donations`
pub async fn list_charity_donations(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(charity_id): Path<i64>,
) -> Result<Json<Vec<CharityDonationView>>> {
    Ok(Json(
        donations::list_charity_donations(&state.db, &principal, charity_id).await?,
    ))
}
