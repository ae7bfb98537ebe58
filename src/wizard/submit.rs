//! Two-phase submission: `POST /basicInfo`, then `POST /details`.
//!
//! The writes are strictly sequential. A failure at either phase ends the
//! submission in `Error`; a Step 1 record that was already stored is not rolled
//! back, and nothing is retried automatically.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::step_one::StepOneRecord;
use super::step_two::StepTwoRecord;
use crate::api::{ApiError, EmployeeApi};
use crate::types::{BasicInfo, Details};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    SubmittingStepOne,
    SubmittingStepTwo,
    Success,
    Error,
}

impl SubmissionPhase {
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::SubmittingStepOne | Self::SubmittingStepTwo)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::SubmittingStepOne => "Saving basic info...",
            Self::SubmittingStepTwo => "Saving details...",
            Self::Success => "Employee created",
            Self::Error => "Submission failed",
        }
    }

    /// Whether `next` may follow this phase
    pub fn can_transition_to(self, next: SubmissionPhase) -> bool {
        use SubmissionPhase::*;
        matches!(
            (self, next),
            (Idle | Error, SubmittingStepOne)
                | (Idle | Error, SubmittingStepTwo)
                | (SubmittingStepOne, SubmittingStepTwo)
                | (SubmittingStepOne | SubmittingStepTwo, Success | Error)
        )
    }
}

/// Progress reported by a running submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionEvent {
    Phase(SubmissionPhase),
    Succeeded {
        basic_info: Option<BasicInfo>,
        details: Details,
    },
    Failed {
        message: String,
    },
}

/// Phase plus the captured error message, folded from [`SubmissionEvent`]s
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionState {
    pub phase: SubmissionPhase,
    pub error: Option<String>,
}

impl SubmissionState {
    pub fn apply(&mut self, event: &SubmissionEvent) {
        let next = match event {
            SubmissionEvent::Phase(phase) => *phase,
            SubmissionEvent::Succeeded { .. } => SubmissionPhase::Success,
            SubmissionEvent::Failed { .. } => SubmissionPhase::Error,
        };
        if next == self.phase {
            return;
        }
        if !self.phase.can_transition_to(next) {
            tracing::debug!(from = ?self.phase, to = ?next, "ignoring out-of-order submission event");
            return;
        }
        self.phase = next;
        self.error = match event {
            SubmissionEvent::Failed { message } => Some(message.clone()),
            _ => None,
        };
    }

    pub fn is_in_flight(&self) -> bool {
        self.phase.is_in_flight()
    }
}

/// Validated records for one submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    /// Absent for the ops flow, which never collects Step 1
    pub step_one: Option<StepOneRecord>,
    pub step_two: StepTwoRecord,
}

/// What a successful submission stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub basic_info: Option<BasicInfo>,
    pub details: Details,
}

#[derive(Clone)]
pub struct SubmissionGateway {
    api: Arc<dyn EmployeeApi>,
}

impl SubmissionGateway {
    pub fn new(api: Arc<dyn EmployeeApi>) -> Self {
        Self { api }
    }

    /// Run the writes in order, reporting each phase on `events`.
    ///
    /// A closed receiver does not stop the submission; once started it always runs
    /// to a terminal phase.
    pub async fn submit(
        &self,
        request: &SubmissionRequest,
        events: &mpsc::UnboundedSender<SubmissionEvent>,
    ) -> Result<SubmissionOutcome, ApiError> {
        let result = self.write(request, events).await;
        let event = match &result {
            Ok(outcome) => {
                info!(employee_id = %outcome.details.employee_id, "Submission completed");
                SubmissionEvent::Succeeded {
                    basic_info: outcome.basic_info.clone(),
                    details: outcome.details.clone(),
                }
            }
            Err(err) => {
                error!(endpoint = err.endpoint(), error = %err, "Submission failed");
                SubmissionEvent::Failed {
                    message: err.to_string(),
                }
            }
        };
        let _ = events.send(event);
        result
    }

    /// Spawn [`submit`](Self::submit) on the runtime
    pub fn spawn(
        &self,
        request: SubmissionRequest,
        events: mpsc::UnboundedSender<SubmissionEvent>,
    ) -> JoinHandle<Result<SubmissionOutcome, ApiError>> {
        let gateway = self.clone();
        tokio::spawn(async move { gateway.submit(&request, &events).await })
    }

    async fn write(
        &self,
        request: &SubmissionRequest,
        events: &mpsc::UnboundedSender<SubmissionEvent>,
    ) -> Result<SubmissionOutcome, ApiError> {
        let basic_info = match &request.step_one {
            Some(step_one) => {
                let _ = events.send(SubmissionEvent::Phase(SubmissionPhase::SubmittingStepOne));
                let saved = self.api.create_basic_info(&step_one.to_basic_info()).await?;
                info!(id = ?saved.id, employee_id = %saved.employee_id, "BasicInfo saved");
                Some(saved)
            }
            None => None,
        };

        let _ = events.send(SubmissionEvent::Phase(SubmissionPhase::SubmittingStepTwo));
        let details = request.step_two.to_details(request.step_one.as_ref());
        let saved = self.api.create_details(&details).await?;
        info!(id = ?saved.id, "Details saved");

        Ok(SubmissionOutcome {
            basic_info,
            details: saved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::types::{EmploymentType, Role};

    fn step_one() -> StepOneRecord {
        StepOneRecord {
            full_name: "Ana Lim".to_string(),
            email: "ana@example.com".to_string(),
            department: "Engineering".to_string(),
            role: Role::Engineer,
            employee_id: "ENG-001".to_string(),
        }
    }

    fn step_two() -> StepTwoRecord {
        StepTwoRecord {
            photo: None,
            employment_type: EmploymentType::FullTime,
            office_location: "Jakarta".to_string(),
            notes: None,
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<SubmissionEvent>) -> Vec<SubmissionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn phases(events: &[SubmissionEvent]) -> Vec<SubmissionPhase> {
        let mut state = SubmissionState::default();
        let mut seen = vec![state.phase];
        for event in events {
            state.apply(event);
            seen.push(state.phase);
        }
        seen
    }

    #[tokio::test]
    async fn test_admin_submission_writes_in_order() {
        let api = Arc::new(FakeApi::new());
        let gateway = SubmissionGateway::new(api.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let request = SubmissionRequest {
            step_one: Some(step_one()),
            step_two: step_two(),
        };

        let outcome = gateway.submit(&request, &tx).await.unwrap();
        assert_eq!(api.calls(), vec!["POST /basicInfo", "POST /details"]);
        assert_eq!(outcome.details.email, "ana@example.com");
        assert_eq!(outcome.details.employee_id, "ENG-001");
        assert_eq!(outcome.basic_info.unwrap().id, Some(1));

        assert_eq!(
            phases(&drain(&mut rx)),
            vec![
                SubmissionPhase::Idle,
                SubmissionPhase::SubmittingStepOne,
                SubmissionPhase::SubmittingStepTwo,
                SubmissionPhase::Success,
            ]
        );
    }

    #[tokio::test]
    async fn test_step_one_failure_skips_details_write() {
        let api = Arc::new(FakeApi::new());
        api.fail_on("POST /basicInfo");
        let gateway = SubmissionGateway::new(api.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let request = SubmissionRequest {
            step_one: Some(step_one()),
            step_two: step_two(),
        };

        assert!(gateway.submit(&request, &tx).await.is_err());
        assert_eq!(api.calls(), vec!["POST /basicInfo"]);

        let events = drain(&mut rx);
        let mut state = SubmissionState::default();
        for event in &events {
            state.apply(event);
        }
        assert_eq!(state.phase, SubmissionPhase::Error);
        assert_eq!(
            state.error.as_deref(),
            Some("POST /basicInfo: HTTP 500 - Internal Server Error")
        );
    }

    #[tokio::test]
    async fn test_step_two_failure_keeps_step_one_write() {
        let api = Arc::new(FakeApi::new());
        api.fail_on("POST /details");
        let gateway = SubmissionGateway::new(api.clone());
        let (tx, _rx) = mpsc::unbounded_channel();
        let request = SubmissionRequest {
            step_one: Some(step_one()),
            step_two: step_two(),
        };

        let err = gateway.submit(&request, &tx).await.unwrap_err();
        assert_eq!(err.endpoint(), "POST /details");
        // No compensating delete
        assert_eq!(api.stored_basic_info().len(), 1);
        assert!(api.stored_details().is_empty());
    }

    #[tokio::test]
    async fn test_ops_submission_only_writes_details() {
        let api = Arc::new(FakeApi::new());
        let gateway = SubmissionGateway::new(api.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let request = SubmissionRequest {
            step_one: None,
            step_two: step_two(),
        };

        let handle = gateway.spawn(request, tx);
        let outcome = handle.await.unwrap().unwrap();
        assert!(outcome.basic_info.is_none());
        assert!(outcome.details.email.is_empty());
        assert_eq!(api.calls(), vec!["POST /details"]);
        assert_eq!(
            phases(&drain(&mut rx)),
            vec![
                SubmissionPhase::Idle,
                SubmissionPhase::SubmittingStepTwo,
                SubmissionPhase::Success,
            ]
        );
    }

    #[tokio::test]
    async fn test_dropped_receiver_does_not_abort_submission() {
        let api = Arc::new(FakeApi::new());
        let gateway = SubmissionGateway::new(api.clone());
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let request = SubmissionRequest {
            step_one: Some(step_one()),
            step_two: step_two(),
        };

        assert!(gateway.submit(&request, &tx).await.is_ok());
        assert_eq!(api.stored_details().len(), 1);
    }

    #[test]
    fn test_phase_transitions() {
        use SubmissionPhase::*;
        assert!(Idle.can_transition_to(SubmittingStepOne));
        assert!(SubmittingStepOne.can_transition_to(SubmittingStepTwo));
        assert!(SubmittingStepTwo.can_transition_to(Success));
        assert!(Error.can_transition_to(SubmittingStepOne));
        assert!(!Idle.can_transition_to(Success));
        assert!(!SubmittingStepTwo.can_transition_to(SubmittingStepOne));
        assert!(!Success.can_transition_to(SubmittingStepOne));
    }
}
