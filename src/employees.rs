//! Employee listing: both collections fetched together and joined.

use std::collections::HashMap;

use tracing::{error, info};

use crate::api::{ApiError, EmployeeApi};
use crate::types::{BasicInfo, Details, Employee};

/// Join each basic-info record with its details, matched by email first and
/// employee ID second.
///
/// Details are indexed under both their email and their employee ID in one map,
/// in input order, so a later details record replaces an earlier one under the
/// same key. Basic-info records without a match are kept with empty details.
pub fn merge_employee_data(basic_info: &[BasicInfo], details: &[Details]) -> Vec<Employee> {
    let mut by_key: HashMap<&str, &Details> = HashMap::new();
    for detail in details {
        by_key.insert(detail.email.as_str(), detail);
        by_key.insert(detail.employee_id.as_str(), detail);
    }

    basic_info
        .iter()
        .map(|basic| {
            let matched = by_key
                .get(basic.email.as_str())
                .or_else(|| by_key.get(basic.employee_id.as_str()))
                .copied();
            Employee {
                basic: basic.clone(),
                photo: matched.and_then(|d| d.photo.clone()),
                employment_type: matched.map(|d| d.employment_type.clone()),
                office_location: matched.map(|d| d.office_location.clone()),
                notes: matched.and_then(|d| d.notes.clone()),
            }
        })
        .collect()
}

/// Fetch `/basicInfo` and `/details` concurrently and merge them
pub async fn load_employees(api: &dyn EmployeeApi) -> Result<Vec<Employee>, ApiError> {
    let result = tokio::try_join!(api.list_basic_info(), api.list_details());
    match result {
        Ok((basic_info, details)) => {
            let employees = merge_employee_data(&basic_info, &details);
            info!(count = employees.len(), "Employees loaded");
            Ok(employees)
        }
        Err(err) => {
            error!(error = %err, "Error fetching employees");
            Err(err)
        }
    }
}
