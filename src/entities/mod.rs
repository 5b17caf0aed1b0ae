//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod contribution;
pub mod meal;
pub mod membership_request;
pub mod money;
pub mod mess;
pub mod mess_member;
pub mod settlement;
pub mod settlement_row;
pub mod user;

// Re-export specific types to avoid conflicts
pub use contribution::{
    Column as ContributionColumn, Entity as Contribution, Model as ContributionModel,
};
pub use meal::{Column as MealColumn, Entity as Meal, Model as MealModel};
pub use membership_request::{
    Column as MembershipRequestColumn, Entity as MembershipRequest,
    Model as MembershipRequestModel,
};
pub use money::Money;
pub use mess::{Column as MessColumn, Entity as Mess, Model as MessModel};
pub use mess_member::{Column as MessMemberColumn, Entity as MessMember, Model as MessMemberModel};
pub use settlement::{Column as SettlementColumn, Entity as Settlement, Model as SettlementModel};
pub use settlement_row::{
    Column as SettlementRowColumn, Entity as SettlementRow, Model as SettlementRowModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
