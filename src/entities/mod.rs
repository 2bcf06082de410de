//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod beneficiary;
pub mod charity;
pub mod charity_application;
pub mod donation;
pub mod inventory;
pub mod payment;
pub mod reminder;
pub mod sea_orm_active_enums;
pub mod story;
pub mod user;

// Re-export specific types to avoid conflicts
pub use beneficiary::{
    Column as BeneficiaryColumn, Entity as Beneficiary, Model as BeneficiaryModel,
};
pub use charity::{Column as CharityColumn, Entity as Charity, Model as CharityModel};
pub use charity_application::{
    Column as CharityApplicationColumn, Entity as CharityApplication,
    Model as CharityApplicationModel,
};
pub use donation::{Column as DonationColumn, Entity as Donation, Model as DonationModel};
pub use inventory::{Column as InventoryColumn, Entity as Inventory, Model as InventoryModel};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
pub use reminder::{Column as ReminderColumn, Entity as Reminder, Model as ReminderModel};
pub use sea_orm_active_enums::{
    ApplicationStatus, CharityStatus, DonationStatus, PaymentStatus, ReminderStatus, Role,
};
pub use story::{Column as StoryColumn, Entity as Story, Model as StoryModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
