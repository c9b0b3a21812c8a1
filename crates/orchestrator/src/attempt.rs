//! The per-request purchase attempt aggregate.

use common::CustCode;
use domain::Club;
use gateway::CaptureResult;
use uuid::Uuid;

use crate::db::PosPostResult;
use crate::state::PurchaseState;

/// Everything the orchestrator accumulates while driving one purchase.
///
/// Lives only for the duration of the request and is never persisted as a
/// whole; each step persists its own output (staging rows, the gateway's
/// charge, the POS posting). Context lands here so the failure paths can
/// report what had already happened.
#[derive(Debug, Default)]
pub struct PurchaseAttempt {
    attempt_id: Uuid,
    club: Option<Club>,
    state: PurchaseState,
    cust_code: Option<CustCode>,
    capture: Option<CaptureResult>,
    post_result: Option<PosPostResult>,
    failure_reason: Option<String>,
}

impl PurchaseAttempt {
    /// Starts an attempt for a resolved club, in `Validating`.
    pub fn new(club: Club) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            club: Some(club),
            ..Self::default()
        }
    }

    /// Returns the correlation id stamped on this attempt's log lines.
    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    /// Advances to the next lifecycle state.
    ///
    /// Illegal transitions are a programming error in the orchestrator;
    /// they are logged and ignored rather than corrupting the lifecycle.
    pub fn advance(&mut self, next: PurchaseState) {
        if self.state.can_transition_to(next) {
            tracing::debug!(from = %self.state, to = %next, "purchase state transition");
            self.state = next;
        } else {
            tracing::error!(from = %self.state, to = %next, "illegal purchase state transition");
        }
    }

    /// Marks the attempt failed with a reason.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.failure_reason = Some(reason.into());
        self.advance(PurchaseState::Failed);
    }

    /// Records the provisioned (or member-supplied) customer code.
    pub fn set_cust_code(&mut self, cust_code: CustCode) {
        self.cust_code = Some(cust_code);
    }

    /// Records the capture result.
    pub fn set_capture(&mut self, capture: CaptureResult) {
        self.capture = Some(capture);
    }

    /// Records the POS posting result.
    pub fn set_post_result(&mut self, result: PosPostResult) {
        self.post_result = Some(result);
    }

    /// Returns the current state.
    pub fn state(&self) -> PurchaseState {
        self.state
    }

    /// Returns the club, if validation got that far.
    pub fn club(&self) -> Option<&Club> {
        self.club.as_ref()
    }

    /// Returns the customer code, if assigned.
    pub fn cust_code(&self) -> Option<&CustCode> {
        self.cust_code.as_ref()
    }

    /// Returns the capture result, if the gateway was reached.
    pub fn capture(&self) -> Option<&CaptureResult> {
        self.capture.as_ref()
    }

    /// Returns the failure reason, if any.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Returns true if money moved but no ledger entry exists.
    pub fn charged_but_not_posted(&self) -> bool {
        let charged = self.capture.as_ref().is_some_and(|c| c.approved);
        let posted = self
            .post_result
            .as_ref()
            .is_some_and(|p| p.success_id().is_some());
        charged && !posted
    }
}
