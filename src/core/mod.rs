//! Core business logic - framework-agnostic mess, ledger and settlement operations.
//! Every function takes the database connection explicitly; role-gated operations take
//! an access token from `group::authorize_member` / `group::authorize_manager`.

pub mod contribution;
pub mod group;
pub mod meal;
pub mod membership_request;
pub mod period;
pub mod report;
pub mod settlement;
pub mod settlement_store;
pub mod user;
