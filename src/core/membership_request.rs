//! Membership requests - users asking a mess to admit them.
//!
//! A request is submitted as `Pending` together with contact details and the payment
//! reference of the membership fee. A manager reviews it; approving it also adds the
//! requester to the manager's mess.

use crate::{
    core::{
        group::{self, ManagerAccess},
        user,
    },
    entities::{MembershipRequest, membership_request},
    errors::{Error, Result, ValidationErrors},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::{fmt, str::FromStr};
use tracing::info;

const MAX_NAME_LEN: usize = 50;
const MAX_DESCRIPTION_LEN: usize = 500;

/// Review state of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    /// Waiting for a manager
    Pending,
    /// Accepted
    Approved,
}

impl RequestStatus {
    /// Stored text form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            _ => Err(Error::invalid_field(
                "status",
                format!("unknown status '{s}', expected Pending or Approved"),
            )),
        }
    }
}

/// Details a user supplies when asking to join.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberRequestForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Digits, optionally prefixed with `+`
    pub phone: String,
    /// Payment reference of the membership fee
    pub tran_id: String,
    pub description: String,
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

fn looks_like_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

impl MemberRequestForm {
    /// Checks every field, reporting all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();

        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            let value = value.trim();
            if value.is_empty() {
                errors.push(field, "is required");
            } else if value.chars().count() > MAX_NAME_LEN {
                errors.push(field, format!("must be at most {MAX_NAME_LEN} characters"));
            }
        }
        if !looks_like_email(self.email.trim()) {
            errors.push("email", "is not a valid email address");
        }
        if !looks_like_phone(self.phone.trim()) {
            errors.push("phone", "must be 7 to 15 digits, optionally prefixed with +");
        }
        if self.tran_id.trim().is_empty() {
            errors.push("tran_id", "is required");
        }
        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            errors.push(
                "description",
                format!("must be at most {MAX_DESCRIPTION_LEN} characters"),
            );
        }

        errors.into_result()
    }
}

/// Stores a new `Pending` request for `user_id`.
pub async fn submit_request(
    db: &DatabaseConnection,
    user_id: i64,
    form: MemberRequestForm,
) -> Result<membership_request::Model> {
    form.validate()?;
    user::resolve_user(db, user_id).await?;

    let request = membership_request::ActiveModel {
        user_id: Set(user_id),
        first_name: Set(form.first_name.trim().to_string()),
        last_name: Set(form.last_name.trim().to_string()),
        email: Set(form.email.trim().to_string()),
        phone: Set(form.phone.trim().to_string()),
        tran_id: Set(form.tran_id.trim().to_string()),
        description: Set(form.description),
        status: Set(RequestStatus::Pending.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(request_id = request.id, user_id, "Membership request submitted");
    Ok(request)
}

/// A user's own requests, newest first.
pub async fn requests_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<membership_request::Model>> {
    MembershipRequest::find()
        .filter(membership_request::Column::UserId.eq(user_id))
        .order_by_desc(membership_request::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every request, newest first. Visible to managers only.
pub async fn all_requests(
    db: &DatabaseConnection,
    _access: &ManagerAccess,
) -> Result<Vec<membership_request::Model>> {
    MembershipRequest::find()
        .order_by_desc(membership_request::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Changes the status of a request.
///
/// Approving adds the requester to the reviewing manager's mess unless they already
/// belong to it.
pub async fn set_request_status(
    db: &DatabaseConnection,
    access: &ManagerAccess,
    request_id: i64,
    status: RequestStatus,
) -> Result<membership_request::Model> {
    let request = MembershipRequest::find_by_id(request_id)
        .one(db)
        .await?
        .ok_or(Error::RequestNotFound { request_id })?;
    let requester = request.user_id;

    let mut active_model: membership_request::ActiveModel = request.into();
    active_model.status = Set(status.to_string());
    let updated = active_model.update(db).await?;

    if status == RequestStatus::Approved
        && !group::is_member(db, access.group_id(), requester).await?
    {
        group::add_member(db, access, requester).await?;
    }

    info!(
        request_id,
        %status,
        group_id = access.group_id(),
        reviewed_by = access.user_id(),
        "Membership request reviewed"
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn valid_form() -> MemberRequestForm {
        MemberRequestForm {
            first_name: "Rahim".to_string(),
            last_name: "Uddin".to_string(),
            email: "rahim@example.com".to_string(),
            phone: "+8801711000000".to_string(),
            tran_id: "TX-991".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!("approved".parse::<RequestStatus>().unwrap(), RequestStatus::Approved);
        assert_eq!(RequestStatus::Pending.to_string(), "Pending");
        assert!("rejected".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn test_form_validation_lists_all_fields() {
        let form = MemberRequestForm {
            first_name: " ".to_string(),
            email: "not-an-email".to_string(),
            phone: "12ab".to_string(),
            ..valid_form()
        };

        let Err(Error::Validation(errors)) = form.validate() else {
            panic!("expected validation errors");
        };
        let fields: Vec<&str> = errors.fields().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["first_name", "email", "phone"]);
        assert!(valid_form().validate().is_ok());
    }

    #[tokio::test]
    async fn test_submit_and_list_requests() -> Result<()> {
        let db = setup_test_db().await?;
        let applicant = create_test_user(&db, "Rahim").await?;

        let request = submit_request(&db, applicant.id, valid_form()).await?;
        assert_eq!(request.status, "Pending");

        let mine = requests_for_user(&db, applicant.id).await?;
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].tran_id, "TX-991");
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_for_unknown_user_fails() -> Result<()> {
        let db = setup_test_db().await?;
        let result = submit_request(&db, 999, valid_form()).await;
        assert!(matches!(result, Err(Error::UserNotFound { user_id: 999 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_approving_adds_requester_to_mess() -> Result<()> {
        let (db, group, owner) = setup_with_group().await?;
        let applicant = create_test_user(&db, "Rahim").await?;
        let access = group::authorize_manager(&db, group.id, owner.id).await?;

        let request = submit_request(&db, applicant.id, valid_form()).await?;
        assert_eq!(all_requests(&db, &access).await?.len(), 1);

        let updated =
            set_request_status(&db, &access, request.id, RequestStatus::Approved).await?;
        assert_eq!(updated.status, "Approved");
        assert!(group::is_member(&db, group.id, applicant.id).await?);

        // approving twice is harmless
        set_request_status(&db, &access, request.id, RequestStatus::Approved).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_request() -> Result<()> {
        let (db, group, owner) = setup_with_group().await?;
        let access = group::authorize_manager(&db, group.id, owner.id).await?;

        let result = set_request_status(&db, &access, 42, RequestStatus::Approved).await;
        assert!(matches!(result, Err(Error::RequestNotFound { request_id: 42 })));
        Ok(())
    }
}
