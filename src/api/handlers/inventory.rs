//! Inventory routes.

use crate::{
    api::{AppState, AuthenticatedUser, JsonBody, handlers::MessageResponse},
    core::inventory::{self, InventoryUpdate, NewInventoryItem},
    entities::InventoryModel,
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

/// `GET /charities/:id/inventory`
pub async fn list_inventory(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(charity_id): Path<i64>,
) -> Result<Json<Vec<InventoryModel>>> {
    Ok(Json(
        inventory::list_inventory(&state.db, &principal, charity_id).await?,
    ))
}

/// `POST /charities/:id/inventory`
pub async fn create_inventory_item(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(charity_id): Path<i64>,
    JsonBody(new_item): JsonBody<NewInventoryItem>,
) -> Result<impl IntoResponse> {
    let item =
        inventory::create_inventory_item(&state.db, &principal, charity_id, new_item).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// `GET /inventory/:id`
pub async fn get_inventory_item(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<InventoryModel>> {
    Ok(Json(
        inventory::get_inventory_item(&state.db, &principal, id).await?,
    ))
}

/// `PUT /inventory/:id`
pub async fn update_inventory_item(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i64>,
    JsonBody(update): JsonBody<InventoryUpdate>,
) -> Result<Json<InventoryModel>> {
    Ok(Json(
        inventory::update_inventory_item(&state.db, &principal, id, update).await?,
    ))
}

/// `DELETE /inventory/:id`
pub async fn delete_inventory_item(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    inventory::delete_inventory_item(&state.db, &principal, id).await?;
    Ok(Json(MessageResponse::new("Inventory item deleted")))
}
