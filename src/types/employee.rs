//! Records exchanged with the employee backend.

use serde::{Deserialize, Serialize};

/// A persisted basic-info record (`/basicInfo`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub full_name: String,
    pub email: String,
    pub department: String,
    /// Stored as free text; older records may hold roles outside the current set
    pub role: String,
    pub employee_id: String,
}

/// A persisted details record (`/details`), joined to basic info by email or employee id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub email: String,
    pub employee_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub employment_type: String,
    pub office_location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Row of the employee listing: basic info plus whatever details matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(flatten)]
    pub basic: BasicInfo,
    pub photo: Option<String>,
    pub employment_type: Option<String>,
    pub office_location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: u64,
    pub name: String,
}

/// One autocomplete suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOption {
    pub label: String,
    pub value: String,
}

impl From<Department> for LookupOption {
    fn from(department: Department) -> Self {
        Self {
            label: department.name.clone(),
            value: department.name,
        }
    }
}

impl From<Location> for LookupOption {
    fn from(location: Location) -> Self {
        Self {
            label: location.name.clone(),
            value: location.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_info_uses_backend_field_names() {
        let info = BasicInfo {
            id: None,
            full_name: "Ana Lim".to_string(),
            email: "ana@example.com".to_string(),
            department: "Engineering".to_string(),
            role: "Engineer".to_string(),
            employee_id: "ENG-001".to_string(),
        };
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["fullName"], "Ana Lim");
        assert_eq!(value["employeeId"], "ENG-001");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_details_tolerates_missing_optionals() {
        let json = r#"{"id":4,"email":"a@b.co","employeeId":"OPS-002","employmentType":"Contract","officeLocation":"Jakarta"}"#;
        let details: Details = serde_json::from_str(json).unwrap();
        assert_eq!(details.id, Some(4));
        assert!(details.photo.is_none());
        assert!(details.notes.is_none());
    }
}
