//! Membership request entity - a user asking to be admitted to the service.
//!
//! Requests start as `Pending` and are flipped to `Approved` by a reviewer.
//! `status` stores the text form of `core::membership_request::RequestStatus`.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Membership request database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "member_requests")]
pub struct Model {
    /// Unique identifier for the request
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Requesting user
    pub user_id: i64,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact email
    pub email: String,
    /// Contact phone
    pub phone: String,
    /// Payment transaction reference for the membership fee
    pub tran_id: String,
    /// Optional free text
    pub description: String,
    /// `"Pending"` or `"Approved"`
    pub status: String,
    /// When the request was submitted
    pub created_at: DateTimeUtc,
}

/// `MembershipRequest` has no declared relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
