//! Money column type.
//!
//! `SQLite` has no decimal type and the driver binds `Decimal` through `f64`, which drops
//! digits past the 15th. `Money` wraps a [`Decimal`] and is stored as its canonical
//! text instead, so every stored amount reads back exactly.

use rust_decimal::Decimal;
use sea_orm::sea_query::{ArrayType, ColumnType, Nullable, ValueType, ValueTypeErr};
use sea_orm::{ColIdx, DbErr, QueryResult, TryGetError, TryGetable, Value};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// An exact amount of money persisted as TEXT.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wraps an amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The wrapped amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl PartialEq<Decimal> for Money {
    fn eq(&self, other: &Decimal) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

fn parse_stored(text: &str) -> Option<Money> {
    Decimal::from_str(text).ok().map(Money)
}

impl From<Money> for Value {
    fn from(money: Money) -> Self {
        Self::from(money.0.to_string())
    }
}

impl TryGetable for Money {
    fn try_get_by<I: ColIdx>(res: &QueryResult, index: I) -> Result<Self, TryGetError> {
        let text = String::try_get_by(res, index)?;
        parse_stored(&text).ok_or_else(|| {
            TryGetError::DbErr(DbErr::Type(format!("stored money '{text}' is not a decimal")))
        })
    }
}

impl ValueType for Money {
    fn try_from(v: Value) -> Result<Self, ValueTypeErr> {
        let text = <String as ValueType>::try_from(v)?;
        parse_stored(&text).ok_or(ValueTypeErr)
    }

    fn type_name() -> String {
        "Money".to_string()
    }

    fn array_type() -> ArrayType {
        ArrayType::String
    }

    fn column_type() -> ColumnType {
        ColumnType::Text
    }
}

impl Nullable for Money {
    fn null() -> Value {
        <String as Nullable>::null()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_value_conversion_keeps_every_digit() {
        let amount = Money::new(Decimal::from_str("12345678901234567.89").unwrap());
        let value: Value = amount.into();
        assert_eq!(<Money as ValueType>::try_from(value).unwrap(), amount);
    }

    #[test]
    fn test_non_text_value_is_rejected() {
        assert!(<Money as ValueType>::try_from(Value::from(1.5_f64)).is_err());
    }

    #[test]
    fn test_display_honours_precision() {
        let amount = Money::new(Decimal::from_str("12.5").unwrap());
        assert_eq!(format!("{amount:.2}"), "12.50");
        assert_eq!(amount, Decimal::from_str("12.50").unwrap());
    }
}
