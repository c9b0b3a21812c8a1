//! Gateway error types.
//!
//! None of these mean "the card was declined" — declines come back as a
//! normal [`crate::CaptureResult`] with `approved == false`.

use thiserror::Error;

/// Errors that can occur while talking to a payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Per-club credentials are missing a field the gateway requires.
    /// Distinct from a decline: nothing was submitted to the processor.
    #[error("Gateway {gateway} credentials missing required field '{field}'")]
    MissingCredential {
        gateway: &'static str,
        field: &'static str,
    },

    /// The credential lookup itself failed.
    #[error("Credential lookup failed: {0}")]
    CredentialLookup(String),

    /// The instrument on the request is not the kind this gateway accepts.
    /// Raised before any network call is made.
    #[error("Gateway {gateway} cannot use the supplied instrument: {reason}")]
    UnsupportedInstrument {
        gateway: &'static str,
        reason: &'static str,
    },

    /// The sale request timed out. The attempt is fatal and never retried.
    #[error("Gateway {gateway} request timed out")]
    Timeout { gateway: &'static str },

    /// Transport-level failure reaching the gateway.
    #[error("Gateway {gateway} transport error: {message}")]
    Transport {
        gateway: &'static str,
        message: String,
    },

    /// The gateway answered with a body we could not interpret.
    #[error("Gateway {gateway} returned an invalid response: {message}")]
    InvalidResponse {
        gateway: &'static str,
        message: String,
    },
}

impl GatewayError {
    /// Maps a reqwest failure to the timeout/transport taxonomy.
    pub fn from_reqwest(gateway: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout { gateway }
        } else {
            GatewayError::Transport {
                gateway,
                message: err.to_string(),
            }
        }
    }
}
