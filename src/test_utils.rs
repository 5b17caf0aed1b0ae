//! Shared test utilities for the mess ledger.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.
#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        group::{self, ManagerAccess},
        meal, user,
    },
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::str::FromStr;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Routes `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates a user with only a name.
pub async fn create_test_user(db: &DatabaseConnection, name: &str) -> Result<entities::user::Model> {
    user::create_user(db, name.to_string(), None, None).await
}

/// Sets up a database with one mess owned by a fresh user.
/// Returns `(db, mess, owner)`.
pub async fn setup_with_group() -> Result<(
    DatabaseConnection,
    entities::mess::Model,
    entities::user::Model,
)> {
    let db = setup_test_db().await?;
    let owner = create_test_user(&db, "Owner").await?;
    let mess = group::create_group(
        &db,
        owner.id,
        "Test Mess".to_string(),
        "Mess for tests".to_string(),
    )
    .await?;
    Ok((db, mess, owner))
}

/// Creates a user and adds them to `mess` as a plain member.
pub async fn add_test_member(
    db: &DatabaseConnection,
    mess: &entities::mess::Model,
    name: &str,
) -> Result<entities::user::Model> {
    let member = create_test_user(db, name).await?;
    let access = group::authorize_manager(db, mess.id, mess.owner_id).await?;
    group::add_member(db, &access, member.id).await?;
    Ok(member)
}

/// Records `(day_of_march_2024, count)` meal entries for a member.
pub async fn record_test_meals(
    db: &DatabaseConnection,
    access: &ManagerAccess,
    member_id: i64,
    entries: &[(u32, i32)],
) -> Result<()> {
    for &(day_of_month, count) in entries {
        meal::record_meal(db, access, member_id, day(2024, 3, day_of_month), count).await?;
    }
    Ok(())
}

/// Parses a decimal literal, e.g. `money("666.67")`.
#[must_use]
pub fn money(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

/// Builds a calendar date.
#[must_use]
pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
