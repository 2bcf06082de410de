//! Gateway payment routes.

use crate::{
    api::{AppState, AuthenticatedUser, JsonBody},
    core::{
        donations::{self, GatewayDonation},
        payments,
    },
    errors::{ErrorKind, Result},
    services::{PaymentCallback, gateway::StkCallbackEnvelope},
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::{error, warn};

/// `POST /payments/mpesa` - starts an STK push for a new donation.
pub async fn initiate_mpesa(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    JsonBody(request): JsonBody<GatewayDonation>,
) -> Result<impl IntoResponse> {
    let receipt =
        donations::initiate_donation(&state.db, state.gateway.as_ref(), &principal, request)
            .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// `POST /payments/verify` - gateway callback.
///
/// Always answers with a JSON body; an unreadable payload is a handled `400` and an
/// unknown payment a handled `404`.
pub async fn verify(
    State(state): State<AppState>,
    body: std::result::Result<Json<StkCallbackEnvelope>, JsonRejection>,
) -> impl IntoResponse {
    let callback = match body {
        Ok(Json(envelope)) => PaymentCallback::from(envelope),
        Err(rejection) => {
            warn!("Unreadable payment callback: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"success": false, "message": "Invalid callback payload"})),
            );
        }
    };

    match payments::handle_payment_callback(&state.db, &callback).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({"success": true, "result": outcome})),
        ),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Callback for unknown payment {}", callback.transaction_id);
            (
                StatusCode::NOT_FOUND,
                Json(json!({"success": false, "message": "Payment record not found"})),
            )
        }
        Err(e) => {
            error!("Callback processing failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false, "message": "Callback processing failed"})),
            )
        }
    }
}
