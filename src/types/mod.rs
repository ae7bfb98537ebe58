//! Shared domain types for the onboarding wizard and the employee directory.
//!
//! Wire records mirror the JSON the backend collections store (camelCase),
//! role and employment enums carry the exact labels the backend expects.

mod employee;
mod role;

pub use employee::{BasicInfo, Department, Details, Employee, Location, LookupOption};
pub use role::{EmploymentType, Role, UnknownVariant, UserRole};
