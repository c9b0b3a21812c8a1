//! Payment gateway abstraction for the two regional processors.
//!
//! Each jurisdiction is served by exactly one gateway: Texas clubs charge
//! through Cardlink (form-encoded, decimal-string amounts) and Tennessee
//! clubs through Payflex (JSON, integer minor units). Both are normalized
//! to one [`CaptureResult`] shape so the orchestrator never branches on
//! processor details beyond jurisdiction selection.
//!
//! A declined card is a successful call returning `approved == false`;
//! errors are reserved for configuration, transport, and timeout failures.

pub mod capture;
pub mod cardlink;
pub mod credentials;
pub mod error;
pub mod mock;
pub mod payflex;
pub mod router;

pub use capture::{CaptureRequest, CaptureResult, CustomerInfo, mask_card};
pub use cardlink::CardlinkGateway;
pub use credentials::{CredentialStore, Credentials, InMemoryCredentialStore};
pub use error::GatewayError;
pub use mock::InMemoryGateway;
pub use payflex::PayflexGateway;
pub use router::{GatewayRouter, PaymentGateway};
