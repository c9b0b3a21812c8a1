//! Domain error types.

use common::ClubId;
use thiserror::Error;

/// Errors that can occur in the pure domain layer.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The club id is outside every configured jurisdiction range.
    #[error("Unsupported club: {0} has no jurisdiction mapping")]
    UnsupportedClub(ClubId),

    /// A required purchaser field is missing or blank.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
