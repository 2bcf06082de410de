//! Account business logic - registration, login and role changes.
//!
//! Emails are stored trimmed and lowercased so lookups are case-insensitive.

use crate::{
    auth::{hash_password, verify_password},
    entities::{Role, User, UserModel, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, SqlErr, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument, warn};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Same message for unknown email and wrong password.
const BAD_CREDENTIALS: &str = "Invalid email or password";

/// Registration input.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Login email
    pub email: String,
    /// Plain-text password, hashed before storage
    pub password: String,
    /// When present the account is a charity account with this name
    #[serde(default)]
    pub charity_name: Option<String>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if email.is_empty() || password.is_empty() {
        return Err(Error::invalid("Email and password are required"));
    }
    if !email.contains('@') {
        return Err(Error::invalid("Email address is not valid"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::invalid(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Finds a user by email, ignoring case and surrounding whitespace.
pub async fn get_user_by_email<C>(db: &C, email: &str) -> Result<Option<UserModel>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by id.
pub async fn get_user<C>(db: &C, user_id: i64) -> Result<Option<UserModel>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Inserts a user with an explicit role after validating the credentials.
///
/// Duplicate emails are rejected with [`Error::Conflict`].
pub async fn create_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<UserModel> {
    let email = normalize_email(email);
    validate_credentials(&email, password)?;

    let name = name.trim();
    if name.is_empty() {
        return Err(Error::invalid("Name cannot be empty"));
    }

    if get_user_by_email(db, &email).await?.is_some() {
        return Err(Error::conflict("Email is already registered"));
    }

    let user = user::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email),
        password_hash: Set(hash_password(password)?),
        role: Set(role),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    insert_user(db, user).await
}

/// Inserts a prepared user row. A concurrent registration that wins the race on the
/// unique email index surfaces as [`Error::Conflict`].
async fn insert_user<C>(db: &C, user: user::ActiveModel) -> Result<UserModel>
where
    C: ConnectionTrait,
{
    user.insert(db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            warn!("Duplicate registration rejected by index: {}", detail);
            Error::conflict("Email is already registered")
        }
        _ => e.into(),
    })
}

/// Registers a donor, or a charity account when `charity_name` is given.
///
/// Administrators are never created here.
#[instrument(skip(db, new_user), fields(email = %new_user.email))]
pub async fn register_user(db: &DatabaseConnection, new_user: NewUser) -> Result<UserModel> {
    let charity_name = new_user
        .charity_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let (name, role) = match charity_name {
        Some(charity_name) => (charity_name, Role::Charity),
        None => (new_user.name.as_str(), Role::Donor),
    };

    let user = create_user(db, name, &new_user.email, &new_user.password, role).await?;
    info!(user_id = user.id, role = ?user.role, "Registered new user");
    Ok(user)
}

/// Checks an email/password pair and returns the matching user.
///
/// # Errors
/// Returns [`Error::Unauthorized`] with the same message whether the email is
/// unknown or the password is wrong.
#[instrument(skip(db, password))]
pub async fn authenticate(db: &DatabaseConnection, email: &str, password: &str) -> Result<UserModel> {
    let Some(user) = get_user_by_email(db, email).await? else {
        warn!("Login attempt for unknown email");
        return Err(Error::unauthorized(BAD_CREDENTIALS));
    };

    if !verify_password(password, &user.password_hash) {
        warn!(user_id = user.id, "Login attempt with wrong password");
        return Err(Error::unauthorized(BAD_CREDENTIALS));
    }

    Ok(user)
}

/// Changes a user's role. Works inside a transaction.
///
/// # Errors
/// Returns [`Error::NotFound`] when the user does not exist.
pub async fn set_role<C>(db: &C, user_id: i64, role: Role) -> Result<UserModel>
where
    C: ConnectionTrait,
{
    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("User", user_id))?;

    if user.role == role {
        return Ok(user);
    }

    let mut active: user::ActiveModel = user.into();
    active.role = Set(role);
    Ok(active.update(db).await?)
}
