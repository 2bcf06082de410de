//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs (including foreign keys and cascade rules
//! declared on the relations) without hand-written SQL.

use crate::entities::{
    Beneficiary, Charity, CharityApplication, Donation, Inventory, Payment, Reminder, Story, User,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info};

/// Default database location used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://donation_hub.sqlite?mode=rwc";

/// Establishes a connection to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables, parents before children so foreign keys resolve.
///
/// Safe to call on every start; existing tables are left untouched.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, User).await?;
    create_table(db, &schema, Charity).await?;
    create_table(db, &schema, CharityApplication).await?;
    create_table(db, &schema, Donation).await?;
    create_table(db, &schema, Payment).await?;
    create_table(db, &schema, Story).await?;
    create_table(db, &schema, Beneficiary).await?;
    create_table(db, &schema, Inventory).await?;
    create_table(db, &schema, Reminder).await?;

    info!("Database tables ensured");
    Ok(())
}

/// Connects and ensures the schema exists. Used by `main` at startup.
pub async fn init_database(database_url: &str) -> Result<DatabaseConnection> {
    let db = create_connection(database_url).await?;
    create_tables(&db).await?;
    Ok(db)
}
