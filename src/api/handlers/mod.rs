//! Route handlers, grouped by resource.

pub mod admin;
pub mod applications;
pub mod auth;
pub mod beneficiaries;
pub mod charities;
pub mod donations;
pub mod health;
pub mod inventory;
pub mod payments;
pub mod stories;

use serde::Serialize;

/// Body for operations that return no resource.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// What happened
    pub message: String,
}

impl MessageResponse {
    /// Wraps a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
