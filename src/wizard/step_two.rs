//! Step 2: employment details, office location, photo, notes.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::step_one::StepOneRecord;
use super::validation::{require, FieldErrors};
use super::ChangeListener;
use crate::photo::{self, PhotoError, PhotoPreview};
use crate::types::{Details, EmploymentType};

pub const PHOTO: &str = "photo";
pub const EMPLOYMENT_TYPE: &str = "employmentType";
pub const OFFICE_LOCATION: &str = "officeLocation";
pub const NOTES: &str = "notes";

/// Raw Step 2 form state, possibly invalid. This is what drafts persist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StepTwoFields {
    /// Data URI of the accepted photo
    pub photo: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub office_location: String,
    pub notes: String,
}

/// Validated Step 2 payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTwoRecord {
    pub photo: Option<String>,
    pub employment_type: EmploymentType,
    pub office_location: String,
    pub notes: Option<String>,
}

impl StepTwoRecord {
    /// Body for `POST /details`. Identity comes from the Step 1 record so both writes
    /// describe the same employee; without one (ops flow) the identity fields stay empty.
    pub fn to_details(&self, identity: Option<&StepOneRecord>) -> Details {
        Details {
            id: None,
            email: identity.map(|r| r.email.clone()).unwrap_or_default(),
            employee_id: identity.map(|r| r.employee_id.clone()).unwrap_or_default(),
            photo: self.photo.clone(),
            employment_type: self.employment_type.label().to_string(),
            office_location: self.office_location.clone(),
            notes: self.notes.clone(),
        }
    }
}

impl StepTwoFields {
    pub fn validate(&self) -> Result<StepTwoRecord, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.employment_type.is_none() {
            errors.insert(EMPLOYMENT_TYPE, "Employment type is required");
        }
        require(
            &mut errors,
            OFFICE_LOCATION,
            &self.office_location,
            "Office location is required",
        );

        match self.employment_type {
            Some(employment_type) if errors.is_empty() => {
                let notes = self.notes.trim();
                Ok(StepTwoRecord {
                    photo: self.photo.clone(),
                    employment_type,
                    office_location: self.office_location.trim().to_string(),
                    notes: (!notes.is_empty()).then(|| notes.to_string()),
                })
            }
            _ => Err(errors),
        }
    }
}

/// Controller for the Step 2 form
pub struct StepTwoForm {
    fields: StepTwoFields,
    errors: FieldErrors,
    touched: BTreeSet<&'static str>,
    /// Inline error from the last rejected upload
    photo_error: Option<String>,
    max_photo_bytes: u64,
    listeners: Vec<ChangeListener<StepTwoFields>>,
}

impl StepTwoForm {
    pub fn new(initial: Option<StepTwoFields>, max_photo_bytes: u64) -> Self {
        let fields = initial.unwrap_or_default();
        let errors = fields.validate().err().unwrap_or_default();
        Self {
            fields,
            errors,
            touched: BTreeSet::new(),
            photo_error: None,
            max_photo_bytes,
            listeners: Vec::new(),
        }
    }

    pub fn fields(&self) -> &StepTwoFields {
        &self.fields
    }

    /// Register a listener called after every accepted mutation
    pub fn on_change(&mut self, listener: impl FnMut(&StepTwoFields) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn set_employment_type(&mut self, value: Option<EmploymentType>) {
        self.mutate(EMPLOYMENT_TYPE, |fields| {
            if fields.employment_type == value {
                return false;
            }
            fields.employment_type = value;
            true
        });
    }

    pub fn set_office_location(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.mutate(OFFICE_LOCATION, |fields| {
            if fields.office_location == value {
                return false;
            }
            fields.office_location = value;
            true
        });
    }

    pub fn set_notes(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.mutate(NOTES, |fields| {
            if fields.notes == value {
                return false;
            }
            fields.notes = value;
            true
        });
    }

    /// Accept an image file. On rejection the current photo is kept and the
    /// error is shown inline.
    pub fn attach_photo(&mut self, path: &Path) -> Result<(), PhotoError> {
        match photo::load_photo(path, self.max_photo_bytes) {
            Ok(data_uri) => {
                self.photo_error = None;
                self.mutate(PHOTO, |fields| {
                    fields.photo = Some(data_uri);
                    true
                });
                Ok(())
            }
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "photo rejected");
                self.photo_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn remove_photo(&mut self) {
        self.photo_error = None;
        self.mutate(PHOTO, |fields| fields.photo.take().is_some());
    }

    pub fn photo_error(&self) -> Option<&str> {
        self.photo_error.as_deref()
    }

    pub fn photo_preview(&self) -> Option<PhotoPreview> {
        self.fields
            .photo
            .as_deref()
            .and_then(PhotoPreview::from_data_uri)
    }

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

    /// Whether the Submit control is enabled
    pub fn can_submit(&self, busy: bool) -> bool {
        !busy && self.is_complete()
    }

    /// Attempt to submit. Marks every field as touched so all errors become visible.
    pub fn submit(&mut self) -> Result<StepTwoRecord, FieldErrors> {
        self.touched
            .extend([PHOTO, EMPLOYMENT_TYPE, OFFICE_LOCATION, NOTES]);
        self.fields.validate()
    }

    fn mutate(&mut self, field: &'static str, apply: impl FnOnce(&mut StepTwoFields) -> bool) {
        if !apply(&mut self.fields) {
            return;
        }
        self.touched.insert(field);
        self.errors = self.fields.validate().err().unwrap_or_default();
        let fields = &self.fields;
        for listener in &mut self.listeners {
            listener(fields);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    const MAX: u64 = 2 * 1024 * 1024;

    #[test]
    fn test_required_fields() {
        let mut form = StepTwoForm::new(None, MAX);
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.get(EMPLOYMENT_TYPE), Some("Employment type is required"));
        assert_eq!(errors.get(OFFICE_LOCATION), Some("Office location is required"));
        assert!(!errors.contains(PHOTO));
        assert!(!errors.contains(NOTES));
    }

    #[test]
    fn test_valid_record_without_optionals() {
        let mut form = StepTwoForm::new(None, MAX);
        form.set_employment_type(Some(EmploymentType::FullTime));
        form.set_office_location("Jakarta");
        form.set_notes("   ");
        assert!(form.can_submit(false));
        assert!(!form.can_submit(true));

        let record = form.submit().unwrap();
        assert_eq!(record.notes, None);
        assert_eq!(record.photo, None);
    }

    #[test]
    fn test_details_thread_identity_from_step_one() {
        let record = StepTwoRecord {
            photo: None,
            employment_type: EmploymentType::Contract,
            office_location: "Bandung".to_string(),
            notes: Some("Starts Monday".to_string()),
        };
        let identity = StepOneRecord {
            full_name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            department: "Engineering".to_string(),
            role: Role::Engineer,
            employee_id: "ENG-001".to_string(),
        };

        let details = record.to_details(Some(&identity));
        assert_eq!(details.email, "ana@example.com");
        assert_eq!(details.employee_id, "ENG-001");
        assert_eq!(details.employment_type, "Contract");

        let anonymous = record.to_details(None);
        assert!(anonymous.email.is_empty());
        assert!(anonymous.employee_id.is_empty());
    }

    #[test]
    fn test_rejected_upload_keeps_previous_photo() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("face.jpg");
        fs::write(&good, [0xFF, 0xD8, 0xFF]).unwrap();
        let bad = temp_dir.path().join("resume.pdf");
        fs::write(&bad, "%PDF").unwrap();

        let mut form = StepTwoForm::new(None, MAX);
        form.attach_photo(&good).unwrap();
        let accepted = form.fields().photo.clone();
        assert!(accepted.as_deref().unwrap().starts_with("data:image/jpeg;base64,"));
        assert!(form.photo_error().is_none());

        assert!(form.attach_photo(&bad).is_err());
        assert_eq!(form.fields().photo, accepted);
        assert_eq!(form.photo_error(), Some("Please select a valid image file"));
    }

    #[test]
    fn test_oversized_upload_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let big = temp_dir.path().join("huge.png");
        fs::write(&big, vec![0u8; 2048]).unwrap();

        let mut form = StepTwoForm::new(None, 1024);
        let err = form.attach_photo(&big).unwrap_err();
        assert!(matches!(err, PhotoError::TooLarge { size: 2048, max: 1024 }));
        assert!(form.fields().photo.is_none());
    }

    #[test]
    fn test_remove_photo_notifies_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("face.png");
        fs::write(&path, [1, 2, 3]).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let mut form = StepTwoForm::new(None, MAX);
        let counter = calls.clone();
        form.on_change(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        form.attach_photo(&path).unwrap();
        assert_eq!(form.photo_preview().unwrap().mime, "image/png");
        form.remove_photo();
        form.remove_photo();

        assert!(form.fields().photo.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
