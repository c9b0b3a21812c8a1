//! Domain layer for the personal-training package checkout.
//!
//! Pure types and functions only: money with round-half-up semantics,
//! the club/jurisdiction table, purchaser value objects, and the pricing
//! calculator. Nothing in this crate performs I/O.

pub mod club;
pub mod error;
pub mod instrument;
pub mod money;
pub mod package;
pub mod pricing;
pub mod purchaser;

pub use club::{Club, Jurisdiction, resolve_club, resolve_jurisdiction};
pub use error::DomainError;
pub use instrument::PaymentInstrument;
pub use money::Money;
pub use package::Package;
pub use pricing::{PricingInput, Totals, calculate_totals};
pub use purchaser::{Guest, Purchaser};
