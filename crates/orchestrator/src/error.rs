//! Purchase error taxonomy.
//!
//! The categories matter more than the messages: the first four are
//! terminal and cheap (no money moved, no alert), a posting inconsistency
//! is the one case where money and ledger diverge and operator escalation
//! is mandatory, and notification failures never surface here at all.

use common::ClubId;
use domain::DomainError;
use gateway::GatewayError;
use thiserror::Error;

/// Errors a purchase attempt can end with.
#[derive(Debug, Error)]
pub enum PurchaseError {
    /// Bad or missing input. No side effects.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The club id has no jurisdiction mapping. No side effects.
    #[error("Unsupported club: {0}")]
    UnsupportedClub(ClubId),

    /// Guest identity creation failed. No money moved.
    #[error("Provisioning failed: {0}")]
    Provisioning(String),

    /// The gateway rejected the card. No money moved, no alert needed.
    #[error("Payment declined by {processor}: {message}")]
    Declined {
        processor: &'static str,
        message: String,
    },

    /// Gateway configuration or transport failure before a charge.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The card was charged but the POS posting failed or returned an
    /// error code. Escalated to operations out-of-band and surfaced to
    /// the caller with the raw diagnostics.
    #[error(
        "Posting inconsistency: charge {transaction_id} captured but POS post failed \
         (result_code={result_code}, sql_error={sql_error:?}, isam_error={isam_error:?})"
    )]
    PostingInconsistency {
        transaction_id: String,
        result_code: i32,
        sql_error: Option<String>,
        isam_error: Option<i32>,
    },
}

impl From<DomainError> for PurchaseError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::UnsupportedClub(club) => PurchaseError::UnsupportedClub(club),
            DomainError::MissingField(_) => PurchaseError::Validation(err.to_string()),
        }
    }
}

impl PurchaseError {
    /// Returns the machine-readable category name for callers choosing a
    /// status code.
    pub fn category(&self) -> &'static str {
        match self {
            PurchaseError::Validation(_) => "validation",
            PurchaseError::UnsupportedClub(_) => "validation",
            PurchaseError::Provisioning(_) => "provisioning_failed",
            PurchaseError::Declined { .. } => "declined",
            PurchaseError::Gateway(GatewayError::UnsupportedInstrument { .. }) => "validation",
            PurchaseError::Gateway(_) => "unexpected",
            PurchaseError::PostingInconsistency { .. } => "posting_inconsistency",
        }
    }
}
