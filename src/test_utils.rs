//! Shared test utilities for donation-hub.
//!
//! This module provides helpers for setting up an in-memory database and creating
//! users and charities with sensible defaults. Users are inserted directly with a
//! placeholder password hash so tests do not pay for Argon2 on every fixture.

#![allow(clippy::unwrap_used)]

use crate::{
    auth::{Principal, TokenService},
    entities::{CharityModel, CharityStatus, Role, UserModel, charity, user},
    errors::Result,
    services::Notifier,
};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::sync::Mutex;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Token service with a fixed secret and a one hour lifetime.
pub fn test_tokens() -> TokenService {
    TokenService::new("test-secret", 1)
}

/// Inserts a user with the given email and role.
///
/// # Defaults
/// * `name`: the part of the email before `@`
/// * `password_hash`: a placeholder that no password verifies against
pub async fn create_test_user(
    db: &DatabaseConnection,
    email: &str,
    role: Role,
) -> Result<UserModel> {
    let name = email.split('@').next().unwrap_or(email).to_string();
    let user = user::ActiveModel {
        name: Set(name),
        email: Set(email.to_string()),
        password_hash: Set("not-a-hash".to_string()),
        role: Set(role),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    Ok(user.insert(db).await?)
}

/// Principal for an existing user.
pub const fn principal_of(user: &UserModel) -> Principal {
    Principal::new(user.id, user.role)
}

/// Creates an admin and returns its principal.
pub async fn create_test_admin(db: &DatabaseConnection) -> Result<Principal> {
    let admin = create_test_user(db, "admin@example.com", Role::Admin).await?;
    Ok(principal_of(&admin))
}

/// Creates a charity-role owner and a charity in the given state.
///
/// # Defaults
/// * `description`: "Test mission"
/// * `location`: "Nairobi"
/// * `category`: "Education"
/// * `goal`: 5000.0
pub async fn create_test_charity(
    db: &DatabaseConnection,
    owner_email: &str,
    name: &str,
    status: CharityStatus,
) -> Result<(UserModel, CharityModel)> {
    let owner = create_test_user(db, owner_email, Role::Charity).await?;
    let charity = charity::ActiveModel {
        owner_id: Set(owner.id),
        name: Set(name.to_string()),
        description: Set("Test mission".to_string()),
        location: Set("Nairobi".to_string()),
        category: Set("Education".to_string()),
        goal: Set(5000.0),
        status: Set(status),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok((owner, charity))
}

/// Creates an approved charity with its owner.
pub async fn create_approved_charity(
    db: &DatabaseConnection,
    owner_email: &str,
    name: &str,
) -> Result<(UserModel, CharityModel)> {
    create_test_charity(db, owner_email, name, CharityStatus::Approved).await
}

/// Notifier that records every message and answers with a fixed outcome.
pub struct RecordingNotifier {
    succeed: bool,
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    /// A notifier whose deliveries all succeed.
    pub const fn succeeding() -> Self {
        Self {
            succeed: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// A notifier whose deliveries all fail.
    pub const fn failing() -> Self {
        Self {
            succeed: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// `(recipient, subject)` of every attempted delivery.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient_email: &str, subject: &str, _body: &str) -> bool {
        self.sent
            .lock()
            .unwrap()
            .push((recipient_email.to_string(), subject.to_string()));
        self.succeed
    }
}
