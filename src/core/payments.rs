//! Payment callback handling.
//!
//! Gateways report results asynchronously and may deliver the same callback more than
//! once. A payment leaves `pending` exactly once: replays of a settled payment are
//! reported as [`CallbackOutcome::AlreadyProcessed`] and change nothing.

use crate::{
    entities::{DonationStatus, Payment, PaymentModel, PaymentStatus, donation, payment},
    errors::{Error, Result},
    services::PaymentCallback,
};
use chrono::Utc;
use sea_orm::{Condition, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// What a callback did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CallbackOutcome {
    /// Payment succeeded; the donation is complete
    Completed {
        /// Settled donation
        donation_id: i64,
        /// Settled payment
        payment_id: i64,
        /// Final transaction id (the gateway receipt when provided)
        transaction_id: String,
    },
    /// Payment failed; the donation is failed
    Failed {
        /// Failed donation
        donation_id: i64,
        /// Failed payment
        payment_id: i64,
        /// Gateway's description
        reason: String,
    },
    /// The payment was already settled; nothing changed
    AlreadyProcessed {
        /// The payment
        payment_id: i64,
        /// Its current status
        status: PaymentStatus,
    },
}

/// Finds a payment by transaction id or gateway reference.
pub async fn find_payment_by_reference<C>(db: &C, reference: &str) -> Result<Option<PaymentModel>>
where
    C: ConnectionTrait,
{
    Payment::find()
        .filter(
            Condition::any()
                .add(payment::Column::TransactionId.eq(reference))
                .add(payment::Column::GatewayReference.eq(reference)),
        )
        .one(db)
        .await
        .map_err(Into::into)
}

/// Applies a gateway callback to its payment and donation.
///
/// The payment is moved with a conditional update on `status = pending`, so two
/// concurrent deliveries of the same callback settle it once.
///
/// # Errors
/// Returns [`Error::NotFound`] when no payment matches the callback's id.
#[instrument(skip(db, callback), fields(transaction_id = %callback.transaction_id, result_code = callback.result_code))]
pub async fn handle_payment_callback(
    db: &DatabaseConnection,
    callback: &PaymentCallback,
) -> Result<CallbackOutcome> {
    let payment = find_payment_by_reference(db, &callback.transaction_id)
        .await?
        .ok_or_else(|| Error::not_found("Payment", &callback.transaction_id))?;

    if payment.status != PaymentStatus::Pending {
        info!(payment_id = payment.id, "Ignoring replayed callback");
        return Ok(CallbackOutcome::AlreadyProcessed {
            payment_id: payment.id,
            status: payment.status,
        });
    }

    let success = callback.is_success();
    let mut changes = payment::ActiveModel {
        status: Set(if success {
            PaymentStatus::Success
        } else {
            PaymentStatus::Failed
        }),
        ..Default::default()
    };
    let transaction_id = if success {
        let receipt = callback
            .receipt_number()
            .unwrap_or_else(|| payment.transaction_id.clone());
        changes.transaction_id = Set(receipt.clone());
        changes.paid_at = Set(Some(Utc::now()));
        receipt
    } else {
        payment.transaction_id.clone()
    };

    let txn = db.begin().await?;

    let moved = Payment::update_many()
        .set(changes)
        .filter(payment::Column::Id.eq(payment.id))
        .filter(payment::Column::Status.eq(PaymentStatus::Pending))
        .exec(&txn)
        .await?;

    if moved.rows_affected == 0 {
        // Settled by a concurrent delivery between the read and the update
        let current = Payment::find_by_id(payment.id)
            .one(&txn)
            .await?
            .map_or(payment.status, |p| p.status);
        return Ok(CallbackOutcome::AlreadyProcessed {
            payment_id: payment.id,
            status: current,
        });
    }

    let donation_status = if success {
        DonationStatus::Complete
    } else {
        DonationStatus::Failed
    };
    donation::Entity::update_many()
        .set(donation::ActiveModel {
            status: Set(donation_status),
            ..Default::default()
        })
        .filter(donation::Column::Id.eq(payment.donation_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    if success {
        info!(donation_id = payment.donation_id, "Payment confirmed");
        Ok(CallbackOutcome::Completed {
            donation_id: payment.donation_id,
            payment_id: payment.id,
            transaction_id,
        })
    } else {
        warn!(
            donation_id = payment.donation_id,
            "Payment failed: {}", callback.result_desc
        );
        Ok(CallbackOutcome::Failed {
            donation_id: payment.donation_id,
            payment_id: payment.id,
            reason: callback.result_desc.clone(),
        })
    }
}
