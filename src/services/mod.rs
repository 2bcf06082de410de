//! External collaborators and background work.
//!
//! The payment gateway and the notification sender are traits so the workflows in
//! [`crate::core`] can run against simulated implementations in development and tests.

/// Mobile-money payment gateway and its callback payload
pub mod gateway;
/// Reminder notification delivery
pub mod notifier;
/// Periodic reminder job
pub mod scheduler;

pub use gateway::{GatewayResponse, PaymentCallback, PaymentGateway, PaymentRequest, SimulatedGateway};
pub use notifier::{LogNotifier, Notifier};
