//! Database configuration module for the mess ledger.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`;
//! the composite uniqueness rules the ledgers rely on (one meal entry per member per day,
//! one contribution per member per period, one settlement per mess per period) are added
//! as unique indexes on top.

use crate::entities::{
    Contribution, ContributionColumn, Meal, MealColumn, MembershipRequest, Mess, MessMember,
    MessMemberColumn, Settlement, SettlementColumn, SettlementRow, SettlementRowColumn, User,
};
use crate::errors::Result;
use sea_orm::sea_query::{Index, IndexCreateStatement, TableCreateStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/mess_ledger.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL` environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    ensure_sqlite_dir(&database_url)?;
    debug!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates the directory holding a file-backed `SQLite` database, if any.
fn ensure_sqlite_dir(database_url: &str) -> Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let file = path.split('?').next().unwrap_or_default();
    if let Some(parent) = std::path::Path::new(file).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn table_for<E: EntityTrait>(schema: &Schema, entity: E) -> TableCreateStatement {
    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    table
}

fn unique_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("idx_mess_members_unique")
            .table(MessMember)
            .col(MessMemberColumn::MessId)
            .col(MessMemberColumn::UserId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_meals_unique_day")
            .table(Meal)
            .col(MealColumn::MessId)
            .col(MealColumn::MemberId)
            .col(MealColumn::Date)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_contributions_unique_period")
            .table(Contribution)
            .col(ContributionColumn::MessId)
            .col(ContributionColumn::MemberId)
            .col(ContributionColumn::Period)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_settlements_unique_period")
            .table(Settlement)
            .col(SettlementColumn::MessId)
            .col(SettlementColumn::Period)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_settlement_rows_unique_member")
            .table(SettlementRow)
            .col(SettlementRowColumn::SettlementId)
            .col(SettlementRowColumn::MemberId)
            .unique()
            .if_not_exists()
            .to_owned(),
    ]
}

/// Creates all necessary database tables and unique indexes.
///
/// Safe to call on every start: every statement is `IF NOT EXISTS`.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        table_for(&schema, User),
        table_for(&schema, Mess),
        table_for(&schema, MessMember),
        table_for(&schema, Meal),
        table_for(&schema, Contribution),
        table_for(&schema, Settlement),
        table_for(&schema, SettlementRow),
        table_for(&schema, MembershipRequest),
    ];

    for table in &tables {
        db.execute(builder.build(table)).await?;
    }

    for index in &unique_indexes() {
        db.execute(builder.build(index)).await?;
    }

    info!("Database tables and unique indexes ensured");
    Ok(())
}
