//! Step 1: identity, job role, department, derived employee ID.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::validation::{is_valid_email, require, FieldErrors};
use super::ChangeListener;
use crate::employee_id;
use crate::types::{BasicInfo, Role};

pub const FULL_NAME: &str = "fullName";
pub const EMAIL: &str = "email";
pub const DEPARTMENT: &str = "department";
pub const ROLE: &str = "role";
pub const EMPLOYEE_ID: &str = "employeeId";

/// Raw Step 1 form state, possibly invalid. This is what drafts persist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StepOneFields {
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub role: Option<Role>,
    /// Derived; never edited directly
    pub employee_id: String,
}

/// Validated Step 1 payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOneRecord {
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub role: Role,
    pub employee_id: String,
}

impl StepOneRecord {
    /// Body for `POST /basicInfo`
    pub fn to_basic_info(&self) -> BasicInfo {
        BasicInfo {
            id: None,
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            department: self.department.clone(),
            role: self.role.label().to_string(),
            employee_id: self.employee_id.clone(),
        }
    }
}

impl StepOneFields {
    pub fn validate(&self) -> Result<StepOneRecord, FieldErrors> {
        let mut errors = FieldErrors::new();

        require(&mut errors, FULL_NAME, &self.full_name, "Full name is required");
        if self.email.trim().is_empty() {
            errors.insert(EMAIL, "Email is required");
        } else if !is_valid_email(self.email.trim()) {
            errors.insert(EMAIL, "Invalid email format");
        }
        require(&mut errors, DEPARTMENT, &self.department, "Department is required");
        if self.role.is_none() {
            errors.insert(ROLE, "Role is required");
        }
        require(
            &mut errors,
            EMPLOYEE_ID,
            &self.employee_id,
            "Employee ID has not been generated yet",
        );

        match self.role {
            Some(role) if errors.is_empty() => Ok(StepOneRecord {
                full_name: self.full_name.trim().to_string(),
                email: self.email.trim().to_string(),
                department: self.department.trim().to_string(),
                role,
                employee_id: self.employee_id.clone(),
            }),
            _ => Err(errors),
        }
    }
}

/// Controller for the Step 1 form
pub struct StepOneForm {
    fields: StepOneFields,
    errors: FieldErrors,
    touched: BTreeSet<&'static str>,
    /// Records already persisted; `None` while they are still loading
    existing: Option<Vec<BasicInfo>>,
    listeners: Vec<ChangeListener<StepOneFields>>,
}

impl StepOneForm {
    /// Create the form, hydrated from a draft when one exists.
    ///
    /// A restored employee ID is dropped; it is derived again once the existing
    /// records arrive.
    pub fn new(initial: Option<StepOneFields>) -> Self {
        let mut fields = initial.unwrap_or_default();
        fields.employee_id.clear();
        let errors = fields.validate().err().unwrap_or_default();
        Self {
            fields,
            errors,
            touched: BTreeSet::new(),
            existing: None,
            listeners: Vec::new(),
        }
    }

    pub fn fields(&self) -> &StepOneFields {
        &self.fields
    }

    pub fn employee_id(&self) -> &str {
        &self.fields.employee_id
    }

    /// Register a listener called after every accepted mutation
    pub fn on_change(&mut self, listener: impl FnMut(&StepOneFields) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn set_full_name(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.mutate(FULL_NAME, |fields| {
            if fields.full_name == value {
                return false;
            }
            fields.full_name = value;
            true
        });
    }

    pub fn set_email(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.mutate(EMAIL, |fields| {
            if fields.email == value {
                return false;
            }
            fields.email = value;
            true
        });
    }

    /// Changing the department re-derives the employee ID
    pub fn set_department(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.mutate(DEPARTMENT, |fields| {
            if fields.department == value {
                return false;
            }
            fields.department = value;
            true
        });
    }

    pub fn set_role(&mut self, role: Option<Role>) {
        self.mutate(ROLE, |fields| {
            if fields.role == role {
                return false;
            }
            fields.role = role;
            true
        });
    }

    /// Install the persisted records the employee ID sequence is derived from
    pub fn set_existing_records(&mut self, records: Vec<BasicInfo>) {
        self.existing = Some(records);
        let before = self.fields.employee_id.clone();
        self.derive_employee_id();
        self.errors = self.fields.validate().err().unwrap_or_default();
        if self.fields.employee_id != before {
            self.notify();
        }
    }

    pub fn existing_loaded(&self) -> bool {
        self.existing.is_some()
    }

    /// Every current validation error, touched or not
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Errors for fields the user has interacted with
    pub fn visible_errors(&self) -> FieldErrors {
        self.errors.retain_fields(|field| self.touched.contains(field))
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether the Next control is enabled
    pub fn can_advance(&self, busy: bool) -> bool {
        !busy && self.is_complete()
    }

    /// Attempt to advance. Marks every field as touched so all errors become visible.
    pub fn submit(&mut self) -> Result<StepOneRecord, FieldErrors> {
        self.touched
            .extend([FULL_NAME, EMAIL, DEPARTMENT, ROLE, EMPLOYEE_ID]);
        self.fields.validate()
    }

    fn mutate(&mut self, field: &'static str, apply: impl FnOnce(&mut StepOneFields) -> bool) {
        if !apply(&mut self.fields) {
            return;
        }
        self.touched.insert(field);
        if field == DEPARTMENT {
            self.derive_employee_id();
        }
        self.errors = self.fields.validate().err().unwrap_or_default();
        self.notify();
    }

    fn derive_employee_id(&mut self) {
        let Some(existing) = &self.existing else {
            return;
        };
        if self.fields.department.is_empty() {
            self.fields.employee_id.clear();
        } else {
            self.fields.employee_id = employee_id::next_id(&self.fields.department, existing);
        }
    }

    fn notify(&mut self) {
        let fields = &self.fields;
        for listener in &mut self.listeners {
            listener(fields);
        }
    }
}
