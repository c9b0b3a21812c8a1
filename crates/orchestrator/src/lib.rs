//! Purchase orchestration for personal-training package sales.
//!
//! Drives one purchase request through its strictly ordered steps:
//! validate, provision a guest identity, capture payment, post the sale to
//! the POS ledger, notify. None of the steps share a transaction, so the
//! orchestrator's job is to fail in the cheapest safe way at each point —
//! and, in the one state where money has moved but the ledger write
//! failed, to escalate to operations staff rather than lose the charge.

pub mod attempt;
pub mod coordinator;
pub mod db;
pub mod error;
pub mod notify;
pub mod posting;
pub mod provision;
pub mod state;

pub use attempt::PurchaseAttempt;
pub use coordinator::{PurchaseOrchestrator, PurchaseReceipt, PurchaseRequest};
pub use db::{
    ClubDatabase, DbError, GuestStagingRecord, InMemoryClubDb, MemberRecord, PosPostResult,
    PurchasePosting,
};
pub use error::PurchaseError;
pub use notify::{
    InMemoryMailer, Mailer, NotificationDispatcher, OpsAlert, PaymentSummary, ReceiptEmail,
    StaffDirectory,
};
pub use provision::Provisioner;
pub use state::PurchaseState;
