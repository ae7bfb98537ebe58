//! Role and employment enums.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Returned when a string does not name any variant of an enum
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Who is using the wizard. Decides the entry step and the draft key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    Ops,
}

impl UserRole {
    /// Resolve the `role` query parameter. Absent or unrecognized values fall back to ops.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("admin") => UserRole::Admin,
            _ => UserRole::Ops,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Ops => "ops",
        }
    }

    /// Whether this role fills in the basic-info step at all
    pub fn fills_basic_info(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job role recorded on the basic-info step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Engineer,
    Ops,
    Finance,
}

impl Role {
    pub fn all() -> &'static [Role] {
        &[Role::Admin, Role::Engineer, Role::Ops, Role::Finance]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Engineer => "Engineer",
            Role::Ops => "Ops",
            Role::Finance => "Finance",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::all()
            .iter()
            .copied()
            .find(|r| r.label() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "role",
                value: s.to_string(),
            })
    }
}

/// Employment type recorded on the details step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
    Intern,
}

impl EmploymentType {
    pub fn all() -> &'static [EmploymentType] {
        &[
            EmploymentType::FullTime,
            EmploymentType::PartTime,
            EmploymentType::Contract,
            EmploymentType::Intern,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "Full-time",
            EmploymentType::PartTime => "Part-time",
            EmploymentType::Contract => "Contract",
            EmploymentType::Intern => "Intern",
        }
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EmploymentType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EmploymentType::all()
            .iter()
            .copied()
            .find(|t| t.label() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "employment type",
                value: s.to_string(),
            })
    }
}
