//! Two-step onboarding wizard.
//!
//! Admins fill Step 1 (identity) then Step 2 (details); ops users start at
//! Step 2 and never see Step 1. Every accepted field change is captured into a
//! role-scoped draft that is saved after a quiet period.

mod step_one;
mod step_two;
pub mod submit;
pub mod validation;

pub use step_one::{StepOneFields, StepOneForm, StepOneRecord};
pub use step_two::{StepTwoFields, StepTwoForm, StepTwoRecord};
pub use submit::{
    SubmissionEvent, SubmissionGateway, SubmissionOutcome, SubmissionPhase, SubmissionRequest,
    SubmissionState,
};
pub use validation::FieldErrors;

/// Field keys, shared with the view for error lookup
pub mod fields {
    pub use super::step_one::{DEPARTMENT, EMAIL, EMPLOYEE_ID, FULL_NAME, ROLE};
    pub use super::step_two::{EMPLOYMENT_TYPE, NOTES, OFFICE_LOCATION, PHOTO};
}

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{error, info, warn};

use crate::api::ApiError;
use crate::draft::{DraftSnapshot, DraftStore};
use crate::types::{BasicInfo, UserRole};

/// Observer called synchronously after each accepted form mutation
pub type ChangeListener<T> = Box<dyn FnMut(&T) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    StepOne,
    StepTwo,
}

impl WizardStep {
    pub fn number(self) -> u8 {
        match self {
            Self::StepOne => 1,
            Self::StepTwo => 2,
        }
    }
}

/// Latest snapshot of both steps and the store it is saved to
struct DraftCapture {
    role: UserRole,
    snapshot: DraftSnapshot,
    store: DraftStore,
}

impl DraftCapture {
    fn save(&mut self) {
        let snapshot = self.snapshot.clone();
        self.store.save(self.role, snapshot);
    }
}

type SharedCapture = Arc<Mutex<DraftCapture>>;

fn lock(capture: &SharedCapture) -> std::sync::MutexGuard<'_, DraftCapture> {
    capture.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Wizard {
    role: UserRole,
    step: WizardStep,
    step_one: StepOneForm,
    step_two: StepTwoForm,
    /// Set when Step 1 completes
    step_one_record: Option<StepOneRecord>,
    submission: SubmissionState,
    /// Records the employee ID sequence is derived from, once fetched
    existing: Option<Vec<BasicInfo>>,
    /// Non-blocking message shown when existing records could not be fetched
    notice: Option<String>,
    max_photo_bytes: u64,
    capture: SharedCapture,
}

impl Wizard {
    /// Hydrate both steps from the role's draft and start capturing changes
    pub fn mount(role: UserRole, store: DraftStore, max_photo_bytes: u64) -> Self {
        let snapshot = store.load(role).unwrap_or_default();
        if snapshot != DraftSnapshot::default() {
            info!(role = %role, "Draft restored");
        }

        let step_one = StepOneForm::new(snapshot.step_one.clone());
        let step_two = StepTwoForm::new(snapshot.step_two.clone(), max_photo_bytes);
        let capture = Arc::new(Mutex::new(DraftCapture {
            role,
            snapshot,
            store,
        }));

        let mut wizard = Self {
            role,
            step: Self::start_step(role),
            step_one,
            step_two,
            step_one_record: None,
            submission: SubmissionState::default(),
            existing: None,
            notice: None,
            max_photo_bytes,
            capture,
        };
        wizard.attach_listeners();
        wizard
    }

    fn start_step(role: UserRole) -> WizardStep {
        if role.fills_basic_info() {
            WizardStep::StepOne
        } else {
            WizardStep::StepTwo
        }
    }

    fn attach_listeners(&mut self) {
        let capture = self.capture.clone();
        self.step_one.on_change(move |fields| {
            let mut capture = lock(&capture);
            capture.snapshot.step_one = Some(fields.clone());
            capture.save();
        });

        let capture = self.capture.clone();
        self.step_two.on_change(move |fields| {
            let mut capture = lock(&capture);
            capture.snapshot.step_two = Some(fields.clone());
            capture.save();
        });
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn step_one(&self) -> &StepOneForm {
        &self.step_one
    }

    pub fn step_one_mut(&mut self) -> &mut StepOneForm {
        &mut self.step_one
    }

    pub fn step_two(&self) -> &StepTwoForm {
        &self.step_two
    }

    pub fn step_two_mut(&mut self) -> &mut StepTwoForm {
        &mut self.step_two
    }

    pub fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// A submission is in flight; advancement controls are disabled
    pub fn is_busy(&self) -> bool {
        self.submission.is_in_flight()
    }

    /// Feed the result of `GET /basicInfo`. A failure is treated as no records.
    pub fn set_existing_records(&mut self, result: Result<Vec<BasicInfo>, ApiError>) {
        let records = match result {
            Ok(records) => {
                self.notice = None;
                records
            }
            Err(err) => {
                error!(error = %err, "Failed to fetch existing employees");
                self.notice = Some("Failed to fetch existing employees".to_string());
                Vec::new()
            }
        };
        self.existing = Some(records.clone());
        self.step_one.set_existing_records(records);
    }

    /// Step 1 → Step 2. Returns false when Step 1 is incomplete or not shown.
    pub fn advance(&mut self) -> bool {
        if self.step != WizardStep::StepOne || self.is_busy() {
            return false;
        }
        match self.step_one.submit() {
            Ok(record) => {
                self.step_one_record = Some(record);
                self.step = WizardStep::StepTwo;
                true
            }
            Err(errors) => {
                tracing::debug!(fields = ?errors.fields().collect::<Vec<_>>(), "Step 1 incomplete");
                false
            }
        }
    }

    /// Step 2 → Step 1, admins only
    pub fn back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.step = WizardStep::StepOne;
        true
    }

    pub fn can_go_back(&self) -> bool {
        self.role.fills_basic_info() && self.step == WizardStep::StepTwo && !self.is_busy()
    }

    /// Validate Step 2 and mark the submission as started.
    ///
    /// Returns the records to hand to [`SubmissionGateway`], or `None` when the
    /// form is incomplete or a submission is already running.
    pub fn begin_submission(&mut self) -> Option<SubmissionRequest> {
        if self.step != WizardStep::StepTwo || self.is_busy() {
            return None;
        }
        let step_two = self.step_two.submit().ok()?;

        let step_one = if self.role.fills_basic_info() {
            let record = match self.step_one_record.clone() {
                Some(record) => record,
                None => self.step_one.submit().ok()?,
            };
            Some(record)
        } else {
            None
        };

        self.submission.phase = if step_one.is_some() {
            SubmissionPhase::SubmittingStepOne
        } else {
            SubmissionPhase::SubmittingStepTwo
        };
        self.submission.error = None;
        info!(role = %self.role, "Submission started");

        Some(SubmissionRequest { step_one, step_two })
    }

    /// Fold a submission event into the wizard. Success clears the draft.
    pub fn apply(&mut self, event: SubmissionEvent) {
        self.submission.apply(&event);
        if self.submission.phase == SubmissionPhase::Success {
            let mut capture = lock(&self.capture);
            if let Err(err) = capture.store.clear(self.role) {
                warn!(role = %self.role, error = %err, "Failed to clear draft after submission");
            }
        }
    }

    /// Discard the draft and every in-memory value, back to the role's first step
    pub fn clear_draft(&mut self) -> anyhow::Result<()> {
        {
            let mut capture = lock(&self.capture);
            capture.store.clear(self.role)?;
            capture.snapshot = DraftSnapshot::default();
        }

        self.step_one = StepOneForm::new(None);
        self.step_two = StepTwoForm::new(None, self.max_photo_bytes);
        if let Some(existing) = self.existing.clone() {
            self.step_one.set_existing_records(existing);
        }
        self.attach_listeners();

        self.step = Self::start_step(self.role);
        self.step_one_record = None;
        self.submission = SubmissionState::default();
        Ok(())
    }

    pub fn has_pending_save(&self) -> bool {
        lock(&self.capture).store.has_pending_save()
    }
}

impl Drop for Wizard {
    fn drop(&mut self) {
        lock(&self.capture).store.cancel_pending();
    }
}
