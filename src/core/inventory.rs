//! Inventory business logic - items a charity holds and hands out.
//!
//! An item is distributed iff it is assigned to a beneficiary; `distributed_at` is
//! stamped on assignment and cleared when the assignment is removed.

use crate::{
    auth::Principal,
    core::{
        beneficiaries::require_beneficiary,
        charities::{ensure_owner, ensure_owner_or_admin, require_charity, required_text},
    },
    entities::{Inventory, InventoryModel, inventory},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Deserializer};

/// Input for a new item.
#[derive(Debug, Clone, Deserialize)]
pub struct NewInventoryItem {
    /// What the item is
    pub item_name: String,
    /// How many, zero or more
    pub quantity: i32,
    /// Beneficiary it was handed to, if any
    #[serde(default)]
    pub beneficiary_id: Option<i64>,
}

/// Partial update.
///
/// `beneficiary_id`: absent keeps the assignment, `null` clears it, a number assigns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryUpdate {
    /// New name
    #[serde(default)]
    pub item_name: Option<String>,
    /// New quantity
    #[serde(default)]
    pub quantity: Option<i32>,
    /// Assignment change
    #[serde(default, deserialize_with = "present")]
    pub beneficiary_id: Option<Option<i64>>,
}

/// Distinguishes an explicit `null` from an absent field.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

fn validate_quantity(quantity: i32) -> Result<i32> {
    if quantity < 0 {
        return Err(Error::invalid(format!(
            "Quantity cannot be negative, got {quantity}"
        )));
    }
    Ok(quantity)
}

/// Checks that a beneficiary exists and belongs to `charity_id`.
async fn check_beneficiary(db: &DatabaseConnection, charity_id: i64, beneficiary_id: i64) -> Result<()> {
    let beneficiary = require_beneficiary(db, beneficiary_id).await?;
    if beneficiary.charity_id != charity_id {
        return Err(Error::not_found("Beneficiary", beneficiary_id));
    }
    Ok(())
}

async fn require_item(db: &DatabaseConnection, item_id: i64) -> Result<InventoryModel> {
    Inventory::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("InventoryItem", item_id))
}

/// Lists a charity's items by name. Owner or admin.
pub async fn list_inventory(
    db: &DatabaseConnection,
    principal: &Principal,
    charity_id: i64,
) -> Result<Vec<InventoryModel>> {
    let charity = require_charity(db, charity_id).await?;
    ensure_owner_or_admin(principal, &charity)?;

    Inventory::find()
        .filter(inventory::Column::CharityId.eq(charity_id))
        .order_by_asc(inventory::Column::ItemName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns one item. Owner or admin.
pub async fn get_inventory_item(
    db: &DatabaseConnection,
    principal: &Principal,
    item_id: i64,
) -> Result<InventoryModel> {
    let item = require_item(db, item_id).await?;
    let charity = require_charity(db, item.charity_id).await?;
    ensure_owner_or_admin(principal, &charity)?;
    Ok(item)
}

/// Adds an item to a charity's inventory. Owner only.
pub async fn create_inventory_item(
    db: &DatabaseConnection,
    principal: &Principal,
    charity_id: i64,
    new_item: NewInventoryItem,
) -> Result<InventoryModel> {
    let charity = require_charity(db, charity_id).await?;
    ensure_owner(principal, &charity)?;

    let item_name = required_text(&new_item.item_name, "Item name")?;
    let quantity = validate_quantity(new_item.quantity)?;
    if let Some(beneficiary_id) = new_item.beneficiary_id {
        check_beneficiary(db, charity.id, beneficiary_id).await?;
    }

    inventory::ActiveModel {
        charity_id: Set(charity.id),
        item_name: Set(item_name),
        quantity: Set(quantity),
        beneficiary_id: Set(new_item.beneficiary_id),
        distributed_at: Set(new_item.beneficiary_id.map(|_| Utc::now())),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Edits an item. Owner only.
pub async fn update_inventory_item(
    db: &DatabaseConnection,
    principal: &Principal,
    item_id: i64,
    update: InventoryUpdate,
) -> Result<InventoryModel> {
    let item = require_item(db, item_id).await?;
    let charity = require_charity(db, item.charity_id).await?;
    ensure_owner(principal, &charity)?;

    let mut active: inventory::ActiveModel = item.into();
    if let Some(item_name) = update.item_name {
        active.item_name = Set(required_text(&item_name, "Item name")?);
    }
    if let Some(quantity) = update.quantity {
        active.quantity = Set(validate_quantity(quantity)?);
    }
    match update.beneficiary_id {
        Some(Some(beneficiary_id)) => {
            check_beneficiary(db, charity.id, beneficiary_id).await?;
            active.beneficiary_id = Set(Some(beneficiary_id));
            active.distributed_at = Set(Some(Utc::now()));
        }
        Some(None) => {
            active.beneficiary_id = Set(None);
            active.distributed_at = Set(None);
        }
        None => {}
    }

    Ok(active.update(db).await?)
}

/// Removes an item. Owner or admin.
pub async fn delete_inventory_item(
    db: &DatabaseConnection,
    principal: &Principal,
    item_id: i64,
) -> Result<()> {
    let item = require_item(db, item_id).await?;
    let charity = require_charity(db, item.charity_id).await?;
    ensure_owner_or_admin(principal, &charity)?;

    Inventory::delete_by_id(item.id).exec(db).await?;
    Ok(())
}
