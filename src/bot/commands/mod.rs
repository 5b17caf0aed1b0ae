//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Account registration
pub mod account;

/// General utility commands
pub mod general;

/// Membership request commands
pub mod join_request;

/// Meal and contribution ledger commands
pub mod ledger;

/// Mess administration commands
pub mod mess;

/// Settlement commands
pub mod settlement;

// Export commands
pub use account::*;
pub use general::*;
pub use join_request::*;
pub use ledger::*;
pub use mess::*;
pub use settlement::*;
