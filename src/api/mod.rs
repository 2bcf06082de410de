//! HTTP surface - axum router over the core workflows.
//!
//! Handlers are thin: they extract the principal and the JSON body, call one
//! [`crate::core`] function and serialize the result. Error-to-status mapping lives
//! in [`error`].

/// Error responses
pub mod error;
/// Request extractors
pub mod extract;
/// Route handlers, one module per resource
pub mod handlers;

use crate::{
    auth::TokenService,
    services::{Notifier, PaymentGateway},
};
use axum::{
    Router,
    routing::{get, post},
};
use handlers::{
    admin, applications, auth, beneficiaries, charities, donations, health, inventory, payments,
    stories,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use extract::{AuthenticatedUser, JsonBody};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database handle
    pub db: DatabaseConnection,
    /// Token issuing and verification
    pub tokens: TokenService,
    /// Mobile-money gateway
    pub gateway: Arc<dyn PaymentGateway>,
    /// Reminder delivery
    pub notifier: Arc<dyn Notifier>,
    /// Age at which terminal reminders are purged
    pub reminder_retention_days: i64,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        // Accounts
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/profile", get(auth::profile))
        // Charities
        .route(
            "/charities",
            get(charities::list_charities).post(charities::create_charity),
        )
        .route(
            "/charities/:id",
            get(charities::get_charity)
                .put(charities::update_charity)
                .delete(charities::delete_charity),
        )
        .route("/charities/:id/donations", get(donations::list_charity_donations))
        .route("/charities/:id/stories", post(stories::create_story))
        .route(
            "/charities/:id/beneficiaries",
            get(beneficiaries::list_beneficiaries).post(beneficiaries::create_beneficiary),
        )
        .route(
            "/charities/:id/inventory",
            get(inventory::list_inventory).post(inventory::create_inventory_item),
        )
        // Applications
        .route(
            "/applications",
            get(applications::list_applications).post(applications::submit_application),
        )
        .route("/applications/mine", get(applications::my_applications))
        .route("/applications/:id/approve", post(applications::approve_application))
        .route("/applications/:id/reject", post(applications::reject_application))
        // Donations and payments
        .route("/donations", post(donations::create_donation))
        .route("/donations/mine", get(donations::my_donations))
        .route("/donations/recurring", post(donations::setup_recurring))
        .route("/donations/:id", get(donations::get_donation))
        .route("/payments/mpesa", post(payments::initiate_mpesa))
        .route("/payments/verify", post(payments::verify))
        // Content
        .route("/stories", get(stories::list_stories))
        .route(
            "/stories/:id",
            get(stories::get_story)
                .put(stories::update_story)
                .delete(stories::delete_story),
        )
        .route(
            "/beneficiaries/:id",
            get(beneficiaries::get_beneficiary)
                .put(beneficiaries::update_beneficiary)
                .delete(beneficiaries::delete_beneficiary),
        )
        .route(
            "/inventory/:id",
            get(inventory::get_inventory_item)
                .put(inventory::update_inventory_item)
                .delete(inventory::delete_inventory_item),
        )
        // Admin
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/activities", get(admin::activities))
        .route("/admin/charities/pending", get(admin::pending_charities))
        .route("/admin/charities/:id/approve", post(admin::approve_charity))
        .route("/admin/charities/:id/reject", post(admin::reject_charity))
        .route("/admin/reminders/run", post(admin::run_reminders))
        .route("/admin/reminders/purge", post(admin::purge_reminders))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        entities::Role,
        errors::Result,
        services::{LogNotifier, SimulatedGateway},
        test_utils::*,
    };
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_app() -> Result<(Router, AppState)> {
        let state = AppState {
            db: setup_test_db().await?,
            tokens: test_tokens(),
            gateway: Arc::new(SimulatedGateway::accepting()),
            notifier: Arc::new(LogNotifier),
            reminder_retention_days: 180,
        };
        Ok((router(state.clone()), state))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() -> Result<()> {
        let (app, _) = test_app().await?;
        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        Ok(())
    }

    #[tokio::test]
    async fn test_register_login_profile() -> Result<()> {
        let (app, _) = test_app().await?;

        let (status, body) = send(
            &app,
            "POST",
            "/auth/register",
            None,
            Some(json!({"name": "Jane", "email": "jane@example.com", "password": "password123"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["role"], "donor");
        assert!(body["user"].get("password_hash").is_none());

        let (status, body) = send(
            &app,
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "jane@example.com", "password": "password123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();

        let (status, body) = send(&app, "GET", "/auth/profile", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["email"], "jane@example.com");

        let (status, body) = send(
            &app,
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "jane@example.com", "password": "wrong-password"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn test_guarded_routes_map_auth_errors() -> Result<()> {
        let (app, state) = test_app().await?;
        let (_, charity) = create_approved_charity(&state.db, "org@example.com", "Books For All").await?;
        let donor = create_test_user(&state.db, "donor@example.com", Role::Donor).await?;
        let donor_token = state.tokens.issue(&donor)?;
        let uri = format!("/charities/{}/inventory", charity.id);
        let item = json!({"item_name": "Books", "quantity": 3});

        let (status, _) = send(&app, "POST", &uri, None, Some(item.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, "POST", &uri, Some("garbage"), Some(item.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, "POST", &uri, Some(&donor_token), Some(item)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn test_donation_routes() -> Result<()> {
        let (app, state) = test_app().await?;
        let (_, charity) = create_approved_charity(&state.db, "org@example.com", "Books For All").await?;
        let donor = create_test_user(&state.db, "donor@example.com", Role::Donor).await?;
        let token = state.tokens.issue(&donor)?;

        let (status, _) = send(
            &app,
            "POST",
            "/donations",
            Some(&token),
            Some(json!({"charity_id": charity.id, "amount": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            "POST",
            "/donations",
            Some(&token),
            Some(json!({"charity_id": charity.id + 100, "amount": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            &app,
            "POST",
            "/donations",
            Some(&token),
            Some(json!({"charity_id": charity.id, "amount": 100.5})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["donation"]["status"], "complete");
        assert_eq!(body["payment"]["status"], "success");

        let (status, body) = send(&app, "GET", &format!("/charities/{}", charity.id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Books For All");
        assert_eq!(body["raised"], 100.5);
        assert_eq!(body["donors"], 1);

        let (status, body) = send(&app, "GET", "/donations/mine", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_bodies_are_bad_requests() -> Result<()> {
        let (app, state) = test_app().await?;
        let (_, charity) = create_approved_charity(&state.db, "org@example.com", "Books For All").await?;
        let donor = create_test_user(&state.db, "donor@example.com", Role::Donor).await?;
        let token = state.tokens.issue(&donor)?;

        let (status, body) = send(
            &app,
            "POST",
            "/donations",
            Some(&token),
            Some(json!({"charity_id": charity.id})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("amount"));

        let (status, body) = send(
            &app,
            "POST",
            "/auth/register",
            None,
            Some(json!({"email": 42, "password": "password123"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = send(&app, "POST", "/payments/verify", None, Some(json!({"Body": {}}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        Ok(())
    }

    #[tokio::test]
    async fn test_mpesa_flow_and_callback() -> Result<()> {
        let (app, state) = test_app().await?;
        let (_, charity) = create_approved_charity(&state.db, "org@example.com", "Books For All").await?;
        let donor = create_test_user(&state.db, "donor@example.com", Role::Donor).await?;
        let token = state.tokens.issue(&donor)?;

        let (status, body) = send(
            &app,
            "POST",
            "/payments/mpesa",
            Some(&token),
            Some(json!({"charity_id": charity.id, "amount": 20, "phone_number": "254712345678"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let checkout_id = body["payment"]["gateway_reference"].as_str().unwrap().to_string();

        let callback = json!({
            "Body": {"stkCallback": {
                "CheckoutRequestID": checkout_id,
                "ResultCode": 0,
                "ResultDesc": "Success",
                "CallbackMetadata": {"Item": [{"Name": "MpesaReceiptNumber", "Value": "QWE123"}]}
            }}
        });
        let (status, body) = send(&app, "POST", "/payments/verify", None, Some(callback.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["outcome"], "completed");

        let (status, body) = send(&app, "POST", "/payments/verify", None, Some(callback)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["outcome"], "already_processed");

        let unknown = json!({
            "Body": {"stkCallback": {"CheckoutRequestID": "ws_CO_nope", "ResultCode": 0, "ResultDesc": "Success"}}
        });
        let (status, body) = send(&app, "POST", "/payments/verify", None, Some(unknown)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        Ok(())
    }

    #[tokio::test]
    async fn test_application_approval_over_http() -> Result<()> {
        let (app, state) = test_app().await?;
        let admin = create_test_user(&state.db, "admin@example.com", Role::Admin).await?;
        let applicant = create_test_user(&state.db, "grace@example.com", Role::Donor).await?;
        let admin_token = state.tokens.issue(&admin)?;
        let applicant_token = state.tokens.issue(&applicant)?;

        let (status, body) = send(
            &app,
            "POST",
            "/applications",
            Some(&applicant_token),
            Some(json!({"organization_name": "Helping Hands", "mission": "Feeding families"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_i64().unwrap();

        let approve = format!("/applications/{id}/approve");
        let (status, _) = send(&app, "POST", &approve, Some(&applicant_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&app, "POST", &approve, Some(&admin_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["charity"]["status"], "approved");

        let (status, _) = send(&app, "POST", &approve, Some(&admin_token), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(&app, "GET", "/auth/profile", Some(&applicant_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["role"], "charity");
        assert_eq!(body["charity"]["name"], "Helping Hands");
        Ok(())
    }
}
