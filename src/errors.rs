//! Unified error type for the mess ledger.
//!
//! Every failure carries a machine-readable [`ErrorKind`] and a human-readable message
//! (the `Display` impl). Validation failures are detected before any write, and
//! conflicts raised while replacing a settlement are retryable.

use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Role a caller must hold on a group for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Any member of the group
    Member,
    /// A manager of the group (the owner is always one)
    Manager,
    /// The single owner of the group
    Owner,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Member => "member",
            Self::Manager => "manager",
            Self::Owner => "owner",
        };
        f.write_str(name)
    }
}

/// Coarse classification used by outward surfaces to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input shape or range
    Validation,
    /// Caller lacks the required role or is not registered
    Authorization,
    /// Unknown group, user, member or request
    NotFound,
    /// Concurrent recomputation or duplicate unique key
    Conflict,
    /// Storage, configuration or transport failure
    Internal,
}

/// A single offending field in a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field path, e.g. `contributions[2].amount`
    pub field: String,
    /// What is wrong with it
    pub message: String,
}

/// Every offending field found while validating one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Records an offending field.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// True when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The recorded fields, in the order they were found.
    #[must_use]
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    /// Returns `Ok(())` when empty, otherwise the collection as an [`Error`].
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("Invalid request: {0}")]
    Validation(ValidationErrors),

    #[error("Invalid meal count {count}: must be 0, 1, 2 or 3")]
    InvalidMealCount { count: i32 },

    #[error("Invalid amount {amount}: must not be negative")]
    InvalidAmount { amount: Decimal },

    #[error("Invalid period '{value}': expected YYYY-MM")]
    InvalidPeriod { value: String },

    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Mess {group_id} not found")]
    GroupNotFound { group_id: i64 },

    #[error("User {user_id} not found")]
    UserNotFound { user_id: i64 },

    #[error("Member with ID {user_id} not found")]
    MemberNotFound { user_id: i64 },

    #[error("User {user_id} is not a member of mess {group_id}")]
    NotAMember { group_id: i64, user_id: i64 },

    #[error("User {user_id} is already a member of mess {group_id}")]
    AlreadyMember { group_id: i64, user_id: i64 },

    #[error("Membership request {request_id} not found")]
    RequestNotFound { request_id: i64 },

    #[error("User {user_id} lacks the {required} role in mess {group_id}")]
    NotAuthorized {
        group_id: i64,
        user_id: i64,
        required: Role,
    },

    #[error("This account is not registered yet, use /register first")]
    NotRegistered,

    #[error("Settlement for mess {group_id} period {period} changed concurrently, retry")]
    ConcurrentModification { group_id: i64, period: String },

    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Machine-readable classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_)
            | Self::InvalidMealCount { .. }
            | Self::InvalidAmount { .. }
            | Self::InvalidPeriod { .. }
            | Self::InvalidDate { .. } => ErrorKind::Validation,
            Self::NotAuthorized { .. } | Self::NotRegistered => ErrorKind::Authorization,
            Self::GroupNotFound { .. }
            | Self::UserNotFound { .. }
            | Self::MemberNotFound { .. }
            | Self::NotAMember { .. }
            | Self::RequestNotFound { .. } => ErrorKind::NotFound,
            Self::ConcurrentModification { .. } | Self::AlreadyMember { .. } => {
                ErrorKind::Conflict
            }
            Self::Config { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::EnvVar(_)
            | Self::Format(_)
            | Self::Framework(_) => ErrorKind::Internal,
        }
    }

    /// True when the caller may simply try the same operation again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }

    /// Builds a single-field validation error.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.push(field, message);
        Self::Validation(errors)
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_collects_every_field() {
        let mut errors = ValidationErrors::new();
        errors.push("extra_cost", "must not be negative");
        errors.push("contributions[1].amount", "must not be negative");

        let err = errors.into_result().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let Error::Validation(fields) = &err else {
            panic!("expected validation error");
        };
        assert_eq!(fields.fields().len(), 2);
        assert!(err.to_string().contains("extra_cost"));
        assert!(err.to_string().contains("contributions[1].amount"));
    }

    #[test]
    fn test_empty_validation_errors_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::InvalidMealCount { count: 5 }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Error::NotAuthorized {
                group_id: 1,
                user_id: 2,
                required: Role::Manager
            }
            .kind(),
            ErrorKind::Authorization
        );
        assert_eq!(
            Error::MemberNotFound { user_id: 9 }.kind(),
            ErrorKind::NotFound
        );

        let conflict = Error::ConcurrentModification {
            group_id: 1,
            period: "2024-03".to_string(),
        };
        assert_eq!(conflict.kind(), ErrorKind::Conflict);
        assert!(conflict.is_retryable());
        assert!(!Error::NotRegistered.is_retryable());
    }

    #[test]
    fn test_not_authorized_message_names_role() {
        let err = Error::NotAuthorized {
            group_id: 3,
            user_id: 7,
            required: Role::Owner,
        };
        assert_eq!(err.to_string(), "User 7 lacks the owner role in mess 3");
    }
}
