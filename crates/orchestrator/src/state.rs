//! Purchase lifecycle state machine.

use serde::{Deserialize, Serialize};

/// The state of a purchase attempt.
///
/// State transitions:
/// ```text
/// Validating ──► Provisioning ──► Capturing ──► Posting ──► Notifying ──► Completed
///      │         (guests only;       │             │            │
///      └────────── members skip) ────┘             │            │
///      Failed is reachable from every non-terminal state
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PurchaseState {
    /// Input is being validated; no side effects yet.
    #[default]
    Validating,

    /// A guest identity is being provisioned. Skipped for members.
    Provisioning,

    /// The gateway capture is in flight.
    Capturing,

    /// The sale is being posted to the POS ledger.
    Posting,

    /// Receipt and staff notifications are being dispatched.
    Notifying,

    /// The purchase finished successfully (terminal).
    Completed,

    /// The purchase failed (terminal).
    Failed,
}

impl PurchaseState {
    /// Returns true if `next` is a legal transition from this state.
    pub fn can_transition_to(&self, next: PurchaseState) -> bool {
        use PurchaseState::*;
        match (self, next) {
            (Validating, Provisioning | Capturing) => true,
            (Provisioning, Capturing) => true,
            (Capturing, Posting) => true,
            (Posting, Notifying) => true,
            (Notifying, Completed) => true,
            (Validating | Provisioning | Capturing | Posting | Notifying, Failed) => true,
            _ => false,
        }
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PurchaseState::Completed | PurchaseState::Failed)
    }

    /// Returns true if money may already have moved in this state.
    ///
    /// From `Posting` onward a successful capture exists, so any failure
    /// needs operator escalation rather than a silent error.
    pub fn money_has_moved(&self) -> bool {
        matches!(
            self,
            PurchaseState::Posting | PurchaseState::Notifying | PurchaseState::Completed
        )
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseState::Validating => "Validating",
            PurchaseState::Provisioning => "Provisioning",
            PurchaseState::Capturing => "Capturing",
            PurchaseState::Posting => "Posting",
            PurchaseState::Notifying => "Notifying",
            PurchaseState::Completed => "Completed",
            PurchaseState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for PurchaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_validating() {
        assert_eq!(PurchaseState::default(), PurchaseState::Validating);
    }

    #[test]
    fn happy_path_transitions() {
        use PurchaseState::*;
        assert!(Validating.can_transition_to(Provisioning));
        assert!(Validating.can_transition_to(Capturing));
        assert!(Provisioning.can_transition_to(Capturing));
        assert!(Capturing.can_transition_to(Posting));
        assert!(Posting.can_transition_to(Notifying));
        assert!(Notifying.can_transition_to(Completed));
    }

    #[test]
    fn failed_is_reachable_from_every_non_terminal_state() {
        use PurchaseState::*;
        for state in [Validating, Provisioning, Capturing, Posting, Notifying] {
            assert!(state.can_transition_to(Failed), "{state} -> Failed");
        }
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Failed));
    }

    #[test]
    fn no_skipping_capture() {
        use PurchaseState::*;
        assert!(!Validating.can_transition_to(Posting));
        assert!(!Provisioning.can_transition_to(Posting));
        assert!(!Capturing.can_transition_to(Completed));
    }

    #[test]
    fn terminal_states() {
        assert!(PurchaseState::Completed.is_terminal());
        assert!(PurchaseState::Failed.is_terminal());
        assert!(!PurchaseState::Posting.is_terminal());
    }

    #[test]
    fn money_moves_at_posting() {
        assert!(!PurchaseState::Capturing.money_has_moved());
        assert!(PurchaseState::Posting.money_has_moved());
        assert!(PurchaseState::Notifying.money_has_moved());
    }
}
