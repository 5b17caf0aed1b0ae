//! Monthly settlement engine.
//!
//! Splits a period's bazaar cost (the sum of member contributions) plus an extra cost
//! across members in proportion to the meals they ate:
//!
//! 1. `bazaar_cost = Σ contribution.amount`, `total_cost = bazaar_cost + extra_cost`
//! 2. `total_meals = Σ meals` over every member with a meal entry in the period
//! 3. `cost_per_meal = total_cost / total_meals`, or zero when nothing was eaten
//! 4. per member: `total_cost = meals × cost_per_meal`,
//!    `balance = contributed - total_cost` (positive: gets money back)
//!
//! All arithmetic is exact decimal. Stored money has two fractional digits, rounded half
//! away from zero; member costs are rounded from the unrounded per-meal cost, so the sum
//! of balances always equals contributed minus attributed exactly.
//!
//! [`compute_settlement`] validates everything before it writes, then replaces the
//! period's contributions and settlement inside a single transaction.

use crate::{
    config::settings::SettlementSettings,
    core::{
        contribution::{self, ContributionInput},
        group::{self, ManagerAccess, MemberAccess},
        meal,
        period::Period,
        settlement_store::{self, NewSettlement, NewSettlementRow, SettlementSheet},
        user,
    },
    errors::{Error, Result, ValidationErrors},
};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, instrument};

/// Fractional digits kept for stored money.
pub const MONEY_SCALE: u32 = 2;

/// Which members get a balance row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContributorPolicy {
    /// Only members who have meal entries in the period. A contributor who ate
    /// nothing keeps their contribution on record but gets no balance row.
    #[default]
    MealsOnly,
    /// Members with meal entries plus every contributor, the latter with zero meals.
    IncludeAllContributors,
}

impl From<&SettlementSettings> for ContributorPolicy {
    fn from(settings: &SettlementSettings) -> Self {
        if settings.include_non_eating_contributors {
            Self::IncludeAllContributors
        } else {
            Self::MealsOnly
        }
    }
}

/// Input of a settlement calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementRequest {
    /// Period to settle
    pub period: Period,
    /// Cost on top of the contributions
    pub extra_cost: Decimal,
    /// Every member's contribution for the period
    pub contributions: Vec<ContributionInput>,
}

fn has_excess_precision(amount: Decimal) -> bool {
    amount.normalize().scale() > MONEY_SCALE
}

impl SettlementRequest {
    /// Checks the request shape, reporting every offending field at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();

        if self.extra_cost < Decimal::ZERO {
            errors.push("extra_cost", "must not be negative");
        } else if has_excess_precision(self.extra_cost) {
            errors.push("extra_cost", "must have at most 2 decimal places");
        }

        if self.contributions.is_empty() {
            errors.push("contributions", "at least one member contribution is required");
        }

        let mut seen = BTreeSet::new();
        for (index, entry) in self.contributions.iter().enumerate() {
            if entry.amount < Decimal::ZERO {
                errors.push(format!("contributions[{index}].amount"), "must not be negative");
            } else if has_excess_precision(entry.amount) {
                errors.push(
                    format!("contributions[{index}].amount"),
                    "must have at most 2 decimal places",
                );
            }
            if !seen.insert(entry.member_id) {
                errors.push(
                    format!("contributions[{index}].member_id"),
                    format!("member {} is listed more than once", entry.member_id),
                );
            }
        }

        errors.into_result()
    }
}

/// Result of the arithmetic, before anything is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calculation {
    /// Sum of contributions
    pub bazaar_cost: Decimal,
    /// Extra cost as requested
    pub extra_cost: Decimal,
    /// `bazaar_cost + extra_cost`
    pub total_cost: Decimal,
    /// Meals eaten in the period
    pub total_meals: i64,
    /// Per-meal cost, rounded to [`MONEY_SCALE`]
    pub cost_per_meal: Decimal,
    /// Member rows ordered by member ID
    pub rows: Vec<NewSettlementRow>,
}

/// Rounds a money value to [`MONEY_SCALE`] digits, half away from zero.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Pure settlement arithmetic over aggregated meals and validated contributions.
#[must_use]
pub fn calculate(
    meals: &BTreeMap<i64, i64>,
    contributions: &[ContributionInput],
    extra_cost: Decimal,
    policy: ContributorPolicy,
) -> Calculation {
    let bazaar_cost: Decimal = contributions.iter().map(|c| c.amount).sum();
    let total_cost = bazaar_cost + extra_cost;
    let total_meals: i64 = meals.values().sum();

    let exact_cost_per_meal = if total_meals > 0 {
        total_cost / Decimal::from(total_meals)
    } else {
        Decimal::ZERO
    };

    let mut contributed: BTreeMap<i64, Decimal> = BTreeMap::new();
    for entry in contributions {
        *contributed.entry(entry.member_id).or_insert(Decimal::ZERO) += entry.amount;
    }

    let mut settled: BTreeMap<i64, i64> = meals.clone();
    if policy == ContributorPolicy::IncludeAllContributors {
        for member_id in contributed.keys() {
            settled.entry(*member_id).or_insert(0);
        }
    }

    let rows = settled
        .into_iter()
        .map(|(member_id, member_meals)| {
            let total_cost = round_money(Decimal::from(member_meals) * exact_cost_per_meal);
            let contributed_amount = contributed.get(&member_id).copied().unwrap_or_default();
            NewSettlementRow {
                member_id,
                total_meals: member_meals,
                total_cost,
                contributed_amount,
                balance: contributed_amount - total_cost,
            }
        })
        .collect();

    Calculation {
        bazaar_cost,
        extra_cost,
        total_cost,
        total_meals,
        cost_per_meal: round_money(exact_cost_per_meal),
        rows,
    }
}

async fn validate_members(
    db: &DatabaseConnection,
    group_id: i64,
    contributions: &[ContributionInput],
) -> Result<()> {
    for entry in contributions {
        let member_id = entry.member_id;
        user::resolve_user(db, member_id)
            .await
            .map_err(|e| match e {
                Error::UserNotFound { user_id } => Error::MemberNotFound { user_id },
                other => other,
            })?;
        if !group::is_member(db, group_id, member_id).await? {
            return Err(Error::NotAMember {
                group_id,
                user_id: member_id,
            });
        }
    }
    Ok(())
}

/// Computes and stores the settlement of a period, replacing any previous one.
///
/// Every input is validated before the first write. The contributions of the period are
/// replaced with the supplied ones and the settlement header and rows are replaced in
/// the same transaction; if anything fails the previous state stays untouched.
#[instrument(
    skip_all,
    fields(group_id = access.group_id(), period = %request.period, policy = ?policy)
)]
pub async fn compute_settlement(
    db: &DatabaseConnection,
    access: &ManagerAccess,
    request: &SettlementRequest,
    policy: ContributorPolicy,
) -> Result<SettlementSheet> {
    request.validate()?;

    let group_id = access.group_id();
    let period = request.period;
    validate_members(db, group_id, &request.contributions).await?;

    let txn = db.begin().await?;

    let meals = meal::aggregate_meals(&txn, group_id, period).await?;
    let calculation = calculate(&meals, &request.contributions, request.extra_cost, policy);

    contribution::replace_contributions_for_period(
        &txn,
        group_id,
        period,
        &request.contributions,
        access.user_id(),
    )
    .await
    .map_err(|e| match e {
        Error::Database(err) => settlement_store::classify_write_error(err, group_id, period),
        other => other,
    })?;

    let header = NewSettlement {
        group_id,
        period,
        bazaar_cost: calculation.bazaar_cost,
        extra_cost: calculation.extra_cost,
        total_cost: calculation.total_cost,
        total_meals: calculation.total_meals,
        cost_per_meal: calculation.cost_per_meal,
        calculated_by: access.user_id(),
    };
    let sheet = settlement_store::replace_settlement(&txn, header, calculation.rows).await?;

    txn.commit().await.map_err(|err| {
        settlement_store::classify_write_error(err, group_id, period)
    })?;

    info!(
        total_cost = %sheet.header.total_cost,
        total_meals = sheet.header.total_meals,
        cost_per_meal = %sheet.header.cost_per_meal,
        rows = sheet.rows.len(),
        "Settlement computed"
    );
    Ok(sheet)
}

/// Reads the stored settlement of a period. `None` means it was never computed.
pub async fn get_settlement(
    db: &DatabaseConnection,
    access: &MemberAccess,
    period: Period,
) -> Result<Option<SettlementSheet>> {
    settlement_store::find_settlement(db, access.group_id(), period).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{Contribution, Settlement, SettlementRow};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, EntityTrait, MockDatabase, PaginatorTrait};

    fn request(period: &str, extra: &str, contributions: Vec<ContributionInput>) -> SettlementRequest {
        SettlementRequest {
            period: period.parse().unwrap(),
            extra_cost: money(extra),
            contributions,
        }
    }

    fn meals(pairs: &[(i64, i64)]) -> BTreeMap<i64, i64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_calculate_even_split() {
        let result = calculate(
            &meals(&[(1, 3), (2, 3)]),
            &[
                ContributionInput::new(1, money("3000")),
                ContributionInput::new(2, money("3000")),
            ],
            Decimal::ZERO,
            ContributorPolicy::MealsOnly,
        );

        assert_eq!(result.bazaar_cost, money("6000"));
        assert_eq!(result.total_cost, money("6000"));
        assert_eq!(result.total_meals, 6);
        assert_eq!(result.cost_per_meal, money("1000"));
        for row in &result.rows {
            assert_eq!(row.total_cost, money("3000"));
            assert_eq!(row.balance, Decimal::ZERO);
        }
    }

    #[test]
    fn test_calculate_uneven_contributions() {
        let result = calculate(
            &meals(&[(1, 3), (2, 3)]),
            &[
                ContributionInput::new(1, money("4000")),
                ContributionInput::new(2, money("2000")),
            ],
            Decimal::ZERO,
            ContributorPolicy::MealsOnly,
        );

        assert_eq!(result.cost_per_meal, money("1000"));
        assert_eq!(result.rows[0].balance, money("1000"));
        assert_eq!(result.rows[1].balance, money("-1000"));
    }

    #[test]
    fn test_calculate_extra_cost_is_shared_by_meals() {
        let result = calculate(
            &meals(&[(1, 1), (2, 3)]),
            &[ContributionInput::new(1, money("300"))],
            money("100"),
            ContributorPolicy::MealsOnly,
        );

        assert_eq!(result.total_cost, money("400"));
        assert_eq!(result.cost_per_meal, money("100"));
        assert_eq!(result.rows[0].total_cost, money("100"));
        assert_eq!(result.rows[0].balance, money("200"));
        assert_eq!(result.rows[1].contributed_amount, Decimal::ZERO);
        assert_eq!(result.rows[1].balance, money("-300"));
    }

    #[test]
    fn test_calculate_rounds_from_exact_cost_per_meal() {
        // 1000 / 3 = 333.333...
        let result = calculate(
            &meals(&[(1, 2), (2, 1)]),
            &[ContributionInput::new(1, money("1000"))],
            Decimal::ZERO,
            ContributorPolicy::MealsOnly,
        );

        assert_eq!(result.cost_per_meal, money("333.33"));
        assert_eq!(result.rows[0].total_cost, money("666.67"));
        assert_eq!(result.rows[1].total_cost, money("333.33"));

        let attributed: Decimal = result.rows.iter().map(|r| r.total_cost).sum();
        let contributed: Decimal = result.rows.iter().map(|r| r.contributed_amount).sum();
        let balance: Decimal = result.rows.iter().map(|r| r.balance).sum();
        assert_eq!(balance, contributed - attributed);

        let expected = result.cost_per_meal * Decimal::from(result.total_meals);
        let tolerance = money("0.005") * Decimal::from(result.rows.len() as i64 + result.total_meals);
        assert!((attributed - expected).abs() <= tolerance);
    }

    #[test]
    fn test_calculate_zero_meals() {
        let result = calculate(
            &BTreeMap::new(),
            &[ContributionInput::new(1, money("500"))],
            money("50"),
            ContributorPolicy::MealsOnly,
        );

        assert_eq!(result.total_meals, 0);
        assert_eq!(result.cost_per_meal, Decimal::ZERO);
        assert_eq!(result.total_cost, money("550"));
        assert!(result.rows.is_empty());
    }

    #[test]
    fn test_calculate_contributor_without_meals() {
        let contributions = [
            ContributionInput::new(1, money("600")),
            ContributionInput::new(3, money("400")),
        ];

        let meals_only = calculate(
            &meals(&[(1, 5), (2, 5)]),
            &contributions,
            Decimal::ZERO,
            ContributorPolicy::MealsOnly,
        );
        assert!(meals_only.rows.iter().all(|r| r.member_id != 3));

        let everyone = calculate(
            &meals(&[(1, 5), (2, 5)]),
            &contributions,
            Decimal::ZERO,
            ContributorPolicy::IncludeAllContributors,
        );
        let row = everyone.rows.iter().find(|r| r.member_id == 3).unwrap();
        assert_eq!(row.total_meals, 0);
        assert_eq!(row.total_cost, Decimal::ZERO);
        assert_eq!(row.balance, money("400"));
        // net transfer is zero once everyone is on the sheet
        let net: Decimal = everyone.rows.iter().map(|r| r.balance).sum();
        assert_eq!(net, Decimal::ZERO);
    }

    #[test]
    fn test_policy_from_settings() {
        let mut settings = SettlementSettings::default();
        assert_eq!(ContributorPolicy::from(&settings), ContributorPolicy::MealsOnly);
        settings.include_non_eating_contributors = true;
        assert_eq!(
            ContributorPolicy::from(&settings),
            ContributorPolicy::IncludeAllContributors
        );
    }

    #[test]
    fn test_validate_reports_every_field() {
        let bad = request(
            "2024-03",
            "-1",
            vec![
                ContributionInput::new(1, money("-5")),
                ContributionInput::new(1, money("10.005")),
            ],
        );

        let Err(Error::Validation(errors)) = bad.validate() else {
            panic!("expected validation errors");
        };
        let fields: Vec<&str> = errors.fields().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "extra_cost",
                "contributions[0].amount",
                "contributions[1].amount",
                "contributions[1].member_id",
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_contributions_rejected_before_persistence() -> Result<()> {
        // the mock has no query results queued: any database access would fail differently
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let access = ManagerAccess::for_tests(1, 1);

        let result = compute_settlement(
            &db,
            &access,
            &request("2024-03", "0", Vec::new()),
            ContributorPolicy::MealsOnly,
        )
        .await;
        assert!(matches!(result, Err(Error::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_compute_settlement_even_split() -> Result<()> {
        let (db, group, a) = setup_with_group().await?;
        let b = add_test_member(&db, &group, "B").await?;
        let access = group::authorize_manager(&db, group.id, a.id).await?;

        record_test_meals(&db, &access, a.id, &[(1, 2), (2, 1)]).await?;
        record_test_meals(&db, &access, b.id, &[(1, 3)]).await?;

        let sheet = compute_settlement(
            &db,
            &access,
            &request(
                "2024-03",
                "0",
                vec![
                    ContributionInput::new(a.id, money("3000")),
                    ContributionInput::new(b.id, money("3000")),
                ],
            ),
            ContributorPolicy::MealsOnly,
        )
        .await?;

        assert_eq!(sheet.header.total_meals, 6);
        assert_eq!(sheet.header.cost_per_meal, money("1000"));
        assert_eq!(sheet.header.bazaar_cost, money("6000"));
        assert_eq!(sheet.header.calculated_by, a.id);
        let row_a = sheet.row_for(a.id).unwrap();
        assert_eq!(row_a.total_cost, money("3000"));
        assert_eq!(row_a.balance, Decimal::ZERO);
        let row_b = sheet.row_for(b.id).unwrap();
        assert_eq!(row_b.total_cost, money("3000"));
        assert_eq!(row_b.balance, Decimal::ZERO);
        Ok(())
    }

    #[tokio::test]
    async fn test_compute_settlement_uneven_contributions() -> Result<()> {
        let (db, group, a) = setup_with_group().await?;
        let b = add_test_member(&db, &group, "B").await?;
        let access = group::authorize_manager(&db, group.id, a.id).await?;

        record_test_meals(&db, &access, a.id, &[(1, 2), (2, 1)]).await?;
        record_test_meals(&db, &access, b.id, &[(1, 3)]).await?;

        let sheet = compute_settlement(
            &db,
            &access,
            &request(
                "2024-03",
                "0",
                vec![
                    ContributionInput::new(a.id, money("4000")),
                    ContributionInput::new(b.id, money("2000")),
                ],
            ),
            ContributorPolicy::MealsOnly,
        )
        .await?;

        assert_eq!(sheet.header.cost_per_meal, money("1000"));
        assert_eq!(sheet.row_for(a.id).unwrap().balance, money("1000"));
        assert_eq!(sheet.row_for(b.id).unwrap().balance, money("-1000"));
        assert_eq!(
            sheet.total_balance(),
            sheet.total_contributed() - sheet.total_attributed()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_compute_settlement_is_idempotent() -> Result<()> {
        let (db, group, a) = setup_with_group().await?;
        let b = add_test_member(&db, &group, "B").await?;
        let access = group::authorize_manager(&db, group.id, a.id).await?;
        record_test_meals(&db, &access, a.id, &[(1, 2), (2, 2)]).await?;
        record_test_meals(&db, &access, b.id, &[(1, 3)]).await?;

        let input = request(
            "2024-03",
            "125.50",
            vec![
                ContributionInput::new(a.id, money("1234.56")),
                ContributionInput::new(b.id, money("789")),
            ],
        );

        let first = compute_settlement(&db, &access, &input, ContributorPolicy::MealsOnly).await?;
        let second = compute_settlement(&db, &access, &input, ContributorPolicy::MealsOnly).await?;

        let totals = |s: &SettlementSheet| {
            (
                s.header.bazaar_cost,
                s.header.extra_cost,
                s.header.total_cost,
                s.header.total_meals,
                s.header.cost_per_meal,
            )
        };
        let rows = |s: &SettlementSheet| {
            s.rows
                .iter()
                .map(|r| (r.member_id, r.total_meals, r.total_cost, r.contributed_amount, r.balance))
                .collect::<Vec<_>>()
        };
        assert_eq!(totals(&first), totals(&second));
        assert_eq!(rows(&first), rows(&second));

        let period: Period = "2024-03".parse()?;
        assert_eq!(settlement_store::count_settlements(&db, group.id, period).await?, 1);
        assert_eq!(SettlementRow::find().count(&db).await?, 2);
        assert_eq!(Contribution::find().count(&db).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_recompute_replaces_rows_and_contributions() -> Result<()> {
        let (db, group, a) = setup_with_group().await?;
        let b = add_test_member(&db, &group, "B").await?;
        let access = group::authorize_manager(&db, group.id, a.id).await?;
        record_test_meals(&db, &access, a.id, &[(1, 2)]).await?;
        record_test_meals(&db, &access, b.id, &[(1, 2)]).await?;

        compute_settlement(
            &db,
            &access,
            &request(
                "2024-03",
                "0",
                vec![
                    ContributionInput::new(a.id, money("100")),
                    ContributionInput::new(b.id, money("100")),
                ],
            ),
            ContributorPolicy::MealsOnly,
        )
        .await?;

        // b's entries are removed after the first run
        let meal_rows = crate::entities::Meal::find().all(&db).await?;
        for entry in meal_rows.into_iter().filter(|m| m.member_id == b.id) {
            sea_orm::ModelTrait::delete(entry, &db).await?;
        }

        let sheet = compute_settlement(
            &db,
            &access,
            &request("2024-03", "0", vec![ContributionInput::new(a.id, money("80"))]),
            ContributorPolicy::MealsOnly,
        )
        .await?;

        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.header.total_meals, 2);
        assert_eq!(sheet.header.cost_per_meal, money("40"));
        assert_eq!(SettlementRow::find().count(&db).await?, 1);
        assert_eq!(Settlement::find().count(&db).await?, 1);

        let totals = contribution::total_contributed(&db, group.id, "2024-03".parse()?).await?;
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[&a.id], money("80"));
        Ok(())
    }

    #[tokio::test]
    async fn test_zero_meal_period() -> Result<()> {
        let (db, group, a) = setup_with_group().await?;
        let access = group::authorize_manager(&db, group.id, a.id).await?;

        let sheet = compute_settlement(
            &db,
            &access,
            &request("2024-03", "0", vec![ContributionInput::new(a.id, money("500"))]),
            ContributorPolicy::MealsOnly,
        )
        .await?;

        assert_eq!(sheet.header.total_meals, 0);
        assert_eq!(sheet.header.cost_per_meal, Decimal::ZERO);
        assert!(sheet.rows.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_member_fails_without_writes() -> Result<()> {
        let (db, group, a) = setup_with_group().await?;
        let access = group::authorize_manager(&db, group.id, a.id).await?;
        record_test_meals(&db, &access, a.id, &[(1, 3)]).await?;

        let result = compute_settlement(
            &db,
            &access,
            &request(
                "2024-03",
                "0",
                vec![
                    ContributionInput::new(a.id, money("100")),
                    ContributionInput::new(4242, money("100")),
                ],
            ),
            ContributorPolicy::MealsOnly,
        )
        .await;

        assert!(matches!(result, Err(Error::MemberNotFound { user_id: 4242 })));
        assert_eq!(Settlement::find().count(&db).await?, 0);
        assert_eq!(Contribution::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_contributor_outside_group_rejected() -> Result<()> {
        let (db, group, a) = setup_with_group().await?;
        let outsider = create_test_user(&db, "Outsider").await?;
        let access = group::authorize_manager(&db, group.id, a.id).await?;

        let result = compute_settlement(
            &db,
            &access,
            &request("2024-03", "0", vec![ContributionInput::new(outsider.id, money("10"))]),
            ContributorPolicy::MealsOnly,
        )
        .await;
        assert!(matches!(result, Err(Error::NotAMember { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_include_all_contributors_policy() -> Result<()> {
        let (db, group, a) = setup_with_group().await?;
        let b = add_test_member(&db, &group, "B").await?;
        let access = group::authorize_manager(&db, group.id, a.id).await?;
        record_test_meals(&db, &access, a.id, &[(1, 3), (2, 3)]).await?;

        let input = request(
            "2024-03",
            "0",
            vec![
                ContributionInput::new(a.id, money("200")),
                ContributionInput::new(b.id, money("400")),
            ],
        );

        let sheet = compute_settlement(&db, &access, &input, ContributorPolicy::MealsOnly).await?;
        assert!(sheet.row_for(b.id).is_none());

        let sheet =
            compute_settlement(&db, &access, &input, ContributorPolicy::IncludeAllContributors)
                .await?;
        let row_b = sheet.row_for(b.id).unwrap();
        assert_eq!(row_b.total_meals, 0);
        assert_eq!(row_b.balance, money("400"));
        assert_eq!(sheet.row_for(a.id).unwrap().balance, money("-400"));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_settlement_absent_and_present() -> Result<()> {
        let (db, group, a) = setup_with_group().await?;
        let access = group::authorize_manager(&db, group.id, a.id).await?;
        let period: Period = "2024-03".parse()?;

        assert!(get_settlement(&db, &access.as_member(), period).await?.is_none());

        record_test_meals(&db, &access, a.id, &[(1, 1)]).await?;
        let computed = compute_settlement(
            &db,
            &access,
            &request("2024-03", "0", vec![ContributionInput::new(a.id, money("90"))]),
            ContributorPolicy::MealsOnly,
        )
        .await?;

        let read = get_settlement(&db, &access.as_member(), period).await?.unwrap();
        assert_eq!(read.header.id, computed.header.id);
        assert_eq!(read.rows.len(), 1);
        assert_eq!(read.rows[0].total_cost, money("90"));
        Ok(())
    }

    #[tokio::test]
    async fn test_large_settlement_reads_back_to_the_cent() -> Result<()> {
        let (db, group, a) = setup_with_group().await?;
        let access = group::authorize_manager(&db, group.id, a.id).await?;
        record_test_meals(&db, &access, a.id, &[(1, 1)]).await?;
        let period: Period = "2024-03".parse()?;

        compute_settlement(
            &db,
            &access,
            &request(
                "2024-03",
                "0.10",
                vec![ContributionInput::new(a.id, money("12345678901234567.89"))],
            ),
            ContributorPolicy::MealsOnly,
        )
        .await?;

        let stored = settlement_store::find_settlement(&db, group.id, period)
            .await?
            .unwrap();
        assert_eq!(stored.header.bazaar_cost, money("12345678901234567.89"));
        assert_eq!(stored.header.extra_cost, money("0.10"));
        assert_eq!(stored.header.total_cost, money("12345678901234567.99"));
        assert_eq!(stored.header.cost_per_meal, money("12345678901234567.99"));
        let row = stored.row_for(a.id).unwrap();
        assert_eq!(row.total_cost, money("12345678901234567.99"));
        assert_eq!(row.contributed_amount, money("12345678901234567.89"));
        assert_eq!(row.balance, money("-0.10"));
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_recomputes_leave_one_settlement() -> Result<()> {
        let (db, group, a) = setup_with_group().await?;
        let b = add_test_member(&db, &group, "B").await?;
        let access = group::authorize_manager(&db, group.id, a.id).await?;
        record_test_meals(&db, &access, a.id, &[(1, 2)]).await?;
        record_test_meals(&db, &access, b.id, &[(1, 2)]).await?;

        let first = request("2024-03", "0", vec![ContributionInput::new(a.id, money("400"))]);
        let second = request("2024-03", "0", vec![ContributionInput::new(b.id, money("800"))]);

        let (r1, r2) = tokio::join!(
            compute_settlement(&db, &access, &first, ContributorPolicy::MealsOnly),
            compute_settlement(&db, &access, &second, ContributorPolicy::MealsOnly),
        );
        for result in [&r1, &r2] {
            if let Err(e) = result {
                assert!(e.is_retryable(), "unexpected error: {e}");
            }
        }
        assert!(r1.is_ok() || r2.is_ok());

        let period: Period = "2024-03".parse()?;
        assert_eq!(settlement_store::count_settlements(&db, group.id, period).await?, 1);

        // the stored sheet is one of the two inputs in full, never a mix
        let stored = settlement_store::find_settlement(&db, group.id, period)
            .await?
            .unwrap();
        assert_eq!(stored.rows.len(), 2);
        assert!(
            stored.header.bazaar_cost == money("400") || stored.header.bazaar_cost == money("800")
        );
        let contributions = contribution::total_contributed(&db, group.id, period).await?;
        assert_eq!(contributions.len(), 1);
        assert_eq!(
            contributions.values().copied().sum::<Decimal>(),
            stored.header.bazaar_cost.amount()
        );
        Ok(())
    }
}
