//! Donation business logic - simulated payments, gateway payments and recurring pledges.
//!
//! A donation is `complete` iff exactly one `success` payment exists for it. The
//! simulated path collects immediately; the gateway path leaves both rows pending until
//! [`crate::core::payments::handle_payment_callback`] settles them.

use crate::{
    auth::{Principal, authorize},
    core::{
        charities::{ensure_owner_or_admin, require_charity},
        reminders::RECURRENCE_INTERVAL_DAYS,
    },
    entities::{
        CharityModel, CharityStatus, Donation, DonationModel, DonationStatus, Payment,
        PaymentModel, PaymentStatus, ReminderModel, ReminderStatus, Role, donation, payment,
        reminder,
    },
    errors::{Error, Result},
    services::{PaymentGateway, PaymentRequest},
};
use chrono::{Duration, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

fn default_method() -> String {
    "card".to_string()
}

/// Input for a donation collected immediately.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDonation {
    /// Target charity
    pub charity_id: i64,
    /// Positive amount
    pub amount: f64,
    /// Payment method label, e.g. `card` or `mpesa`
    #[serde(default = "default_method")]
    pub method: String,
    /// External transaction id; a `SIM-` id is generated when absent
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// Marks the donation as part of a recurring pledge
    #[serde(default)]
    pub recurring: bool,
    /// Hides the donor from the charity
    #[serde(default)]
    pub is_anonymous: bool,
}

/// Input for a donation collected through the payment gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayDonation {
    /// Target charity
    pub charity_id: i64,
    /// Positive amount
    pub amount: f64,
    /// Payer phone number
    pub phone_number: String,
    /// Marks the donation as part of a recurring pledge
    #[serde(default)]
    pub recurring: bool,
    /// Hides the donor from the charity
    #[serde(default)]
    pub is_anonymous: bool,
}

/// A donation with the payment that settled it.
#[derive(Debug, Clone, Serialize)]
pub struct DonationReceipt {
    /// The donation
    pub donation: DonationModel,
    /// Its payment
    pub payment: PaymentModel,
}

/// A recurring pledge.
#[derive(Debug, Clone, Serialize)]
pub struct RecurringSetup {
    /// The pledged donation, `pending`
    pub donation: DonationModel,
    /// The first reminder
    pub reminder: ReminderModel,
}

/// Donation as shown to a charity; anonymous donations carry no donor id.
#[derive(Debug, Clone, Serialize)]
pub struct CharityDonationView {
    /// Donation id
    pub id: i64,
    /// Donor, unless anonymous
    pub user_id: Option<i64>,
    /// Amount
    pub amount: f64,
    /// Part of a recurring pledge
    pub recurring: bool,
    /// Donor asked to stay anonymous
    pub is_anonymous: bool,
    /// Current status
    pub status: DonationStatus,
    /// When it was made
    pub created_at: DateTimeUtc,
}

impl From<DonationModel> for CharityDonationView {
    fn from(donation: DonationModel) -> Self {
        Self {
            id: donation.id,
            user_id: (!donation.is_anonymous).then_some(donation.user_id),
            amount: donation.amount,
            recurring: donation.recurring,
            is_anonymous: donation.is_anonymous,
            status: donation.status,
            created_at: donation.created_at,
        }
    }
}

/// Rejects non-finite and non-positive amounts.
pub fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(format!("Amount must be positive, got {amount}")))
    }
}

/// Loads a charity that can receive donations.
async fn donatable_charity<C>(db: &C, charity_id: i64) -> Result<CharityModel>
where
    C: ConnectionTrait,
{
    let charity = require_charity(db, charity_id).await?;
    if charity.status != CharityStatus::Approved {
        return Err(Error::conflict(format!(
            "Charity {charity_id} is not accepting donations"
        )));
    }
    Ok(charity)
}

fn pending_donation(
    principal: &Principal,
    charity_id: i64,
    amount: f64,
    recurring: bool,
    is_anonymous: bool,
) -> donation::ActiveModel {
    donation::ActiveModel {
        user_id: Set(principal.user_id),
        charity_id: Set(charity_id),
        amount: Set(amount),
        recurring: Set(recurring),
        is_anonymous: Set(is_anonymous),
        status: Set(DonationStatus::Pending),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
}

/// Creates a donation and collects it immediately with a simulated payment.
///
/// The donation, its `success` payment and the move to `complete` happen in one
/// transaction.
#[instrument(skip(db, new_donation), fields(user_id = principal.user_id, charity_id = new_donation.charity_id))]
pub async fn create_donation(
    db: &DatabaseConnection,
    principal: &Principal,
    new_donation: NewDonation,
) -> Result<DonationReceipt> {
    authorize(principal, &[Role::Donor, Role::Admin])?;
    validate_amount(new_donation.amount)?;
    let method = new_donation.method.trim();
    if method.is_empty() {
        return Err(Error::invalid("Payment method is required"));
    }

    let txn = db.begin().await?;
    donatable_charity(&txn, new_donation.charity_id).await?;

    let donation = pending_donation(
        principal,
        new_donation.charity_id,
        new_donation.amount,
        new_donation.recurring,
        new_donation.is_anonymous,
    )
    .insert(&txn)
    .await?;

    let transaction_id = new_donation
        .transaction_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("SIM-{}", uuid::Uuid::new_v4().simple()));

    let payment = payment::ActiveModel {
        donation_id: Set(donation.id),
        method: Set(method.to_string()),
        gateway_reference: Set(transaction_id.clone()),
        transaction_id: Set(transaction_id),
        status: Set(PaymentStatus::Success),
        paid_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut active: donation::ActiveModel = donation.into();
    active.status = Set(DonationStatus::Complete);
    let donation = active.update(&txn).await?;

    txn.commit().await?;

    info!(
        donation_id = donation.id,
        "Donation of {:.2} completed", donation.amount
    );
    Ok(DonationReceipt { donation, payment })
}

/// Creates a donation and starts a gateway payment for it.
///
/// On success the donation and a `pending` payment keyed by the gateway's checkout id
/// are stored. If the gateway refuses or fails the donation is removed again and
/// nothing is kept. No transaction is held open across the gateway call.
///
/// # Errors
/// Returns [`Error::Internal`] when the gateway refuses or fails.
#[instrument(skip(db, gateway, request), fields(user_id = principal.user_id, charity_id = request.charity_id))]
pub async fn initiate_donation(
    db: &DatabaseConnection,
    gateway: &dyn PaymentGateway,
    principal: &Principal,
    request: GatewayDonation,
) -> Result<DonationReceipt> {
    authorize(principal, &[Role::Donor, Role::Admin])?;
    validate_amount(request.amount)?;
    let phone_number = request.phone_number.trim();
    if phone_number.is_empty() {
        return Err(Error::invalid("Phone number is required"));
    }

    let charity = donatable_charity(db, request.charity_id).await?;

    let donation = pending_donation(
        principal,
        charity.id,
        request.amount,
        request.recurring,
        request.is_anonymous,
    )
    .insert(db)
    .await?;

    let payment_request = PaymentRequest {
        phone_number: phone_number.to_string(),
        amount: request.amount,
        reference: format!("DONATION_{}", donation.id),
        description: format!("Donation to {}", charity.name),
    };

    let checkout_request_id = match gateway.initiate(&payment_request).await {
        Ok(response) => match response.checkout_request_id {
            Some(id) if response.success => id,
            _ => {
                error!("Payment gateway refused request: {}", response.message);
                discard_donation(db, donation.id).await;
                return Err(Error::Internal {
                    message: format!("Payment gateway refused request: {}", response.message),
                });
            }
        },
        Err(e) => {
            error!("Payment gateway call failed: {}", e);
            discard_donation(db, donation.id).await;
            return Err(Error::Internal {
                message: format!("Payment gateway call failed: {e}"),
            });
        }
    };

    let inserted = payment::ActiveModel {
        donation_id: Set(donation.id),
        method: Set(gateway.method().to_string()),
        gateway_reference: Set(checkout_request_id.clone()),
        transaction_id: Set(checkout_request_id),
        status: Set(PaymentStatus::Pending),
        paid_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await;

    let payment = match inserted {
        Ok(payment) => payment,
        Err(e) => {
            discard_donation(db, donation.id).await;
            return Err(e.into());
        }
    };

    info!(
        donation_id = donation.id,
        checkout_request_id = %payment.gateway_reference,
        "Gateway payment initiated"
    );
    Ok(DonationReceipt { donation, payment })
}

/// Removes a donation whose gateway payment never started.
async fn discard_donation(db: &DatabaseConnection, donation_id: i64) {
    if let Err(e) = Donation::delete_by_id(donation_id).exec(db).await {
        error!(donation_id, "Failed to discard donation: {}", e);
    }
}

/// Pledges a recurring donation: a `pending` donation plus a first reminder in
/// [`RECURRENCE_INTERVAL_DAYS`] days. No payment is collected.
#[instrument(skip(db), fields(user_id = principal.user_id))]
pub async fn setup_recurring(
    db: &DatabaseConnection,
    principal: &Principal,
    charity_id: i64,
    amount: f64,
) -> Result<RecurringSetup> {
    authorize(principal, &[Role::Donor, Role::Admin])?;
    validate_amount(amount)?;

    let txn = db.begin().await?;
    donatable_charity(&txn, charity_id).await?;

    let donation = pending_donation(principal, charity_id, amount, true, false)
        .insert(&txn)
        .await?;

    let reminder = reminder::ActiveModel {
        user_id: Set(principal.user_id),
        charity_id: Set(charity_id),
        amount: Set(amount),
        scheduled_time: Set(donation.created_at + Duration::days(RECURRENCE_INTERVAL_DAYS)),
        status: Set(ReminderStatus::Pending),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
        donation_id = donation.id,
        reminder_id = reminder.id,
        "Recurring donation set up"
    );
    Ok(RecurringSetup { donation, reminder })
}

/// Lists the caller's donations, newest first.
pub async fn list_my_donations(
    db: &DatabaseConnection,
    principal: &Principal,
) -> Result<Vec<DonationModel>> {
    Donation::find()
        .filter(donation::Column::UserId.eq(principal.user_id))
        .order_by_desc(donation::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists a charity's donations, newest first. Owner or admin.
pub async fn list_charity_donations(
    db: &DatabaseConnection,
    principal: &Principal,
    charity_id: i64,
) -> Result<Vec<CharityDonationView>> {
    let charity = require_charity(db, charity_id).await?;
    ensure_owner_or_admin(principal, &charity)?;

    let donations = Donation::find()
        .filter(donation::Column::CharityId.eq(charity_id))
        .order_by_desc(donation::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(donations.into_iter().map(Into::into).collect())
}

/// Returns one donation with its payments. Visible to the donor, the owning charity
/// and admins.
pub async fn get_donation(
    db: &DatabaseConnection,
    principal: &Principal,
    donation_id: i64,
) -> Result<(DonationModel, Vec<PaymentModel>)> {
    let donation = Donation::find_by_id(donation_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Donation", donation_id))?;

    if donation.user_id != principal.user_id {
        let charity = require_charity(db, donation.charity_id).await?;
        ensure_owner_or_admin(principal, &charity)?;
    }

    let payments = Payment::find()
        .filter(payment::Column::DonationId.eq(donation.id))
        .all(db)
        .await?;
    Ok((donation, payments))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::Reminder;
    use crate::errors::ErrorKind;
    use crate::services::{GatewayResponse, SimulatedGateway};
    use crate::test_utils::*;
    use async_trait::async_trait;
    use sea_orm::PaginatorTrait;

    /// Gateway that writes to the database while the request is in flight.
    struct BusyGateway {
        db: DatabaseConnection,
    }

    #[async_trait]
    impl PaymentGateway for BusyGateway {
        async fn initiate(&self, _request: &PaymentRequest) -> Result<GatewayResponse> {
            let pending = Donation::find().count(&self.db).await?;
            assert_eq!(pending, 1);

            tokio::time::timeout(
                std::time::Duration::from_secs(5),
                create_test_user(&self.db, "bystander@example.com", Role::Donor),
            )
            .await
            .map_err(|_| Error::Internal {
                message: "database locked during gateway call".to_string(),
            })??;

            Ok(GatewayResponse {
                success: true,
                checkout_request_id: Some("ws_CO_busy".to_string()),
                message: "accepted".to_string(),
            })
        }
    }

    fn donation_to(charity_id: i64, amount: f64) -> NewDonation {
        NewDonation {
            charity_id,
            amount,
            method: "card".to_string(),
            transaction_id: None,
            recurring: false,
            is_anonymous: false,
        }
    }

    fn mpesa_to(charity_id: i64, amount: f64) -> GatewayDonation {
        GatewayDonation {
            charity_id,
            amount,
            phone_number: "254712345678".to_string(),
            recurring: false,
            is_anonymous: false,
        }
    }

    #[tokio::test]
    async fn test_simulated_donation_completes_with_one_payment() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, charity) = create_approved_charity(&db, "org@example.com", "Books For All").await?;
        let donor = create_test_user(&db, "donor@example.com", Role::Donor).await?;

        let receipt = create_donation(&db, &principal_of(&donor), donation_to(charity.id, 100.50)).await?;
        assert_eq!(receipt.donation.amount, 100.50);
        assert_eq!(receipt.donation.status, DonationStatus::Complete);
        assert_eq!(receipt.payment.status, PaymentStatus::Success);
        assert!(receipt.payment.transaction_id.starts_with("SIM-"));
        assert!(receipt.payment.paid_at.is_some());

        let successes = Payment::find()
            .filter(payment::Column::DonationId.eq(receipt.donation.id))
            .filter(payment::Column::Status.eq(PaymentStatus::Success))
            .count(&db)
            .await?;
        assert_eq!(successes, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_donation_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let (owner, charity) = create_approved_charity(&db, "org@example.com", "Books For All").await?;
        let donor = principal_of(&create_test_user(&db, "donor@example.com", Role::Donor).await?);

        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = create_donation(&db, &donor, donation_to(charity.id, amount))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }

        let mut no_method = donation_to(charity.id, 10.0);
        no_method.method = " ".to_string();
        let err = create_donation(&db, &donor, no_method).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = create_donation(&db, &donor, donation_to(999, 10.0))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = create_donation(&db, &principal_of(&owner), donation_to(charity.id, 10.0))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        assert_eq!(Donation::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_pending_charity_rejects_donations() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, charity) =
            create_test_charity(&db, "org@example.com", "Later", CharityStatus::Pending).await?;
        let donor = create_test_user(&db, "donor@example.com", Role::Donor).await?;

        let err = create_donation(&db, &principal_of(&donor), donation_to(charity.id, 10.0))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        Ok(())
    }

    #[tokio::test]
    async fn test_gateway_donation_stays_pending() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, charity) = create_approved_charity(&db, "org@example.com", "Books For All").await?;
        let donor = create_test_user(&db, "donor@example.com", Role::Donor).await?;

        let receipt = initiate_donation(
            &db,
            &SimulatedGateway::accepting(),
            &principal_of(&donor),
            mpesa_to(charity.id, 250.0),
        )
        .await?;

        assert_eq!(receipt.donation.status, DonationStatus::Pending);
        assert_eq!(receipt.payment.status, PaymentStatus::Pending);
        assert_eq!(receipt.payment.method, "mpesa");
        assert!(receipt.payment.gateway_reference.starts_with("ws_CO_"));
        assert_eq!(receipt.payment.gateway_reference, receipt.payment.transaction_id);
        Ok(())
    }

    #[tokio::test]
    async fn test_gateway_refusal_stores_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, charity) = create_approved_charity(&db, "org@example.com", "Books For All").await?;
        let donor = create_test_user(&db, "donor@example.com", Role::Donor).await?;

        let err = initiate_donation(
            &db,
            &SimulatedGateway::declining(),
            &principal_of(&donor),
            mpesa_to(charity.id, 250.0),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);

        assert_eq!(Donation::find().count(&db).await?, 0);
        assert_eq!(Payment::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_gateway_call_does_not_hold_database() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, charity) = create_approved_charity(&db, "org@example.com", "Books For All").await?;
        let donor = create_test_user(&db, "donor@example.com", Role::Donor).await?;

        let gateway = BusyGateway { db: db.clone() };
        let receipt = initiate_donation(
            &db,
            &gateway,
            &principal_of(&donor),
            mpesa_to(charity.id, 75.0),
        )
        .await?;

        assert_eq!(receipt.payment.gateway_reference, "ws_CO_busy");
        assert!(
            crate::core::users::get_user_by_email(&db, "bystander@example.com")
                .await?
                .is_some()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_setup_recurring_schedules_reminder() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, charity) = create_approved_charity(&db, "org@example.com", "Books For All").await?;
        let donor = create_test_user(&db, "donor@example.com", Role::Donor).await?;

        let setup = setup_recurring(&db, &principal_of(&donor), charity.id, 15.0).await?;
        assert!(setup.donation.recurring);
        assert_eq!(setup.donation.status, DonationStatus::Pending);
        assert_eq!(setup.reminder.status, ReminderStatus::Pending);
        assert_eq!(
            setup.reminder.scheduled_time,
            setup.donation.created_at + Duration::days(RECURRENCE_INTERVAL_DAYS)
        );
        assert_eq!(Payment::find().count(&db).await?, 0);
        assert_eq!(Reminder::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_charity_listing_hides_anonymous_donors() -> Result<()> {
        let db = setup_test_db().await?;
        let (owner, charity) = create_approved_charity(&db, "org@example.com", "Books For All").await?;
        let donor = principal_of(&create_test_user(&db, "donor@example.com", Role::Donor).await?);

        create_donation(&db, &donor, donation_to(charity.id, 10.0)).await?;
        let mut anonymous = donation_to(charity.id, 20.0);
        anonymous.is_anonymous = true;
        create_donation(&db, &donor, anonymous).await?;

        let views = list_charity_donations(&db, &principal_of(&owner), charity.id).await?;
        assert_eq!(views.len(), 2);
        for view in &views {
            if view.is_anonymous {
                assert!(view.user_id.is_none());
            } else {
                assert_eq!(view.user_id, Some(donor.user_id));
            }
        }

        let err = list_charity_donations(&db, &donor, charity.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_donation_visibility() -> Result<()> {
        let db = setup_test_db().await?;
        let (owner, charity) = create_approved_charity(&db, "org@example.com", "Books For All").await?;
        let donor = principal_of(&create_test_user(&db, "donor@example.com", Role::Donor).await?);
        let stranger = principal_of(&create_test_user(&db, "x@example.com", Role::Donor).await?);

        let receipt = create_donation(&db, &donor, donation_to(charity.id, 10.0)).await?;
        let id = receipt.donation.id;

        let (_, payments) = get_donation(&db, &donor, id).await?;
        assert_eq!(payments.len(), 1);
        get_donation(&db, &principal_of(&owner), id).await?;

        let err = get_donation(&db, &stranger, id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        assert_eq!(list_my_donations(&db, &donor).await?.len(), 1);
        assert!(list_my_donations(&db, &stranger).await?.is_empty());
        Ok(())
    }
}
