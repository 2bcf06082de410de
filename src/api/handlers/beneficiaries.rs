//! Beneficiary routes.

use crate::{
    api::{AppState, AuthenticatedUser, JsonBody, handlers::MessageResponse},
    core::beneficiaries::{self, BeneficiaryUpdate, NewBeneficiary},
    entities::BeneficiaryModel,
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

/// `GET /charities/:id/beneficiaries`
pub async fn list_beneficiaries(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(charity_id): Path<i64>,
) -> Result<Json<Vec<BeneficiaryModel>>> {
    Ok(Json(
        beneficiaries::list_beneficiaries(&state.db, &principal, charity_id).await?,
    ))
}

/// `POST /charities/:id/beneficiaries`
pub async fn create_beneficiary(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(charity_id): Path<i64>,
    JsonBody(new_beneficiary): JsonBody<NewBeneficiary>,
) -> Result<impl IntoResponse> {
    let beneficiary =
        beneficiaries::create_beneficiary(&state.db, &principal, charity_id, new_beneficiary)
            .await?;
    Ok((StatusCode::CREATED, Json(beneficiary)))
}

/// `GET /beneficiaries/:id`
pub async fn get_beneficiary(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<BeneficiaryModel>> {
    Ok(Json(
        beneficiaries::get_beneficiary(&state.db, &principal, id).await?,
    ))
}

/// `PUT /beneficiaries/:id`
pub async fn update_beneficiary(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i64>,
    JsonBody(update): JsonBody<BeneficiaryUpdate>,
) -> Result<Json<BeneficiaryModel>> {
    Ok(Json(
        beneficiaries::update_beneficiary(&state.db, &principal, id, update).await?,
    ))
}

/// `DELETE /beneficiaries/:id`
pub async fn delete_beneficiary(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    beneficiaries::delete_beneficiary(&state.db, &principal, id).await?;
    Ok(Json(MessageResponse::new("Beneficiary deleted")))
}
