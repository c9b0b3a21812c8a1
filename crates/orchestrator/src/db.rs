//! Club database boundary.
//!
//! The relational database (staging tables, member rows, POS stored
//! procedures) is implemented elsewhere; this module specifies the call
//! contracts the orchestrator depends on, plus an in-memory double for
//! tests and local runs.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::NaiveDate;
use common::CustCode;
use domain::Club;
use thiserror::Error;

/// Marker stored on guest staging records: cash/card only, no ACH on file.
pub const RESTRICTED_GUEST_MARKER: &str = "RG-CASH";

/// Errors raised by the club database boundary.
#[derive(Debug, Error)]
pub enum DbError {
    /// The database could not be reached.
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// The call was made but reported a failure.
    #[error("Database call failed: {0}")]
    Call(String),
}

/// Result of the POS purchase-posting stored procedure.
///
/// Invariant: `result_code == 0` iff `pos_transaction_id` is a non-zero
/// id. Any other combination is a posting inconsistency and must trigger
/// an operations alert, because the card has already been charged.
#[derive(Debug, Clone, Default)]
pub struct PosPostResult {
    pub result_code: i32,
    pub sql_error: Option<String>,
    pub isam_error: Option<i32>,
    pub pos_transaction_id: Option<i64>,
}

impl PosPostResult {
    /// Builds a successful posting result.
    pub fn ok(pos_transaction_id: i64) -> Self {
        Self {
            result_code: 0,
            pos_transaction_id: Some(pos_transaction_id),
            ..Self::default()
        }
    }

    /// Builds a failed posting result.
    pub fn failed(result_code: i32, sql_error: Option<String>, isam_error: Option<i32>) -> Self {
        Self {
            result_code,
            sql_error,
            isam_error,
            pos_transaction_id: None,
        }
    }

    /// Returns the POS transaction id if the posting actually succeeded.
    pub fn success_id(&self) -> Option<i64> {
        match (self.result_code, self.pos_transaction_id) {
            (0, Some(id)) if id != 0 => Some(id),
            _ => None,
        }
    }
}

/// Staging record linking a fresh customer code to a walk-up guest.
#[derive(Debug, Clone)]
pub struct GuestStagingRecord {
    pub cust_code: CustCode,
    /// `FIRST MIDDLE. LAST`, trimmed and upper-cased.
    pub business_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    /// Always [`RESTRICTED_GUEST_MARKER`] for this flow.
    pub payment_profile: &'static str,
}

/// The person-level member row written under a guest's customer code.
#[derive(Debug, Clone)]
pub struct MemberRecord {
    pub cust_code: CustCode,
    pub first_name: String,
    pub last_name: String,
    pub middle_initial: Option<String>,
    pub email: String,
    /// Normalized phone (mobile, then home, then work).
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    /// Club-local date, no time component.
    pub created_on: NaiveDate,
}

/// Parameters for the POS purchase-posting call.
#[derive(Debug, Clone)]
pub struct PurchasePosting {
    pub cust_code: CustCode,
    pub product_code: String,
    pub quantity: u32,
    pub price: domain::Money,
    /// Fixed 4-character issuer code (VISA, MCRD, AMEX, DISC, CARD).
    pub card_issuer: &'static str,
    /// Card expiry converted to the POS date representation.
    pub expiry: Option<NaiveDate>,
    pub masked_card: String,
    pub sales_rep: String,
    pub create_gift_cert: bool,
    pub description: String,
    pub approval_code: String,
    pub gateway_txn_id: String,
}

/// Boundary trait for the club database.
///
/// One connection per round trip, scoped to the call; nothing here holds
/// a connection across the capture step.
#[async_trait]
pub trait ClubDatabase: Send + Sync {
    /// Allocates the next customer identifier for the club's shard.
    ///
    /// Delegated to the database's sequence mechanism so it is safe under
    /// concurrent callers.
    async fn next_customer_id(&self, club: &Club) -> Result<CustCode, DbError>;

    /// Writes the guest staging record.
    async fn insert_guest_staging(
        &self,
        club: &Club,
        record: &GuestStagingRecord,
    ) -> Result<(), DbError>;

    /// Writes the person-level member row.
    async fn insert_member_row(&self, club: &Club, record: &MemberRecord) -> Result<(), DbError>;

    /// Posts the completed sale to the POS ledger.
    async fn post_purchase(
        &self,
        club: &Club,
        posting: &PurchasePosting,
    ) -> Result<PosPostResult, DbError>;
}

#[derive(Debug, Default)]
struct InMemoryClubDbState {
    next_id: u32,
    next_pos_txn: i64,
    staging: Vec<GuestStagingRecord>,
    members: Vec<MemberRecord>,
    postings: Vec<PurchasePosting>,
    fail_next_id: bool,
    fail_staging: bool,
    fail_member: bool,
    fail_post_call: bool,
    post_result: Option<PosPostResult>,
}

/// In-memory club database for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClubDb {
    state: Arc<RwLock<InMemoryClubDbState>>,
}

impl InMemoryClubDb {
    /// Creates an empty in-memory database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the next-customer-id call to fail.
    pub fn set_fail_next_id(&self, fail: bool) {
        self.state.write().unwrap().fail_next_id = fail;
    }

    /// Configures the staging insert to fail.
    pub fn set_fail_staging(&self, fail: bool) {
        self.state.write().unwrap().fail_staging = fail;
    }

    /// Configures the member insert to fail.
    pub fn set_fail_member(&self, fail: bool) {
        self.state.write().unwrap().fail_member = fail;
    }

    /// Configures the posting call itself to error.
    pub fn set_fail_post_call(&self, fail: bool) {
        self.state.write().unwrap().fail_post_call = fail;
    }

    /// Overrides the result the next posting call returns.
    pub fn set_post_result(&self, result: PosPostResult) {
        self.state.write().unwrap().post_result = Some(result);
    }

    /// Returns the number of staging records written.
    pub fn staging_count(&self) -> usize {
        self.state.read().unwrap().staging.len()
    }

    /// Returns the number of member rows written.
    pub fn member_count(&self) -> usize {
        self.state.read().unwrap().members.len()
    }

    /// Returns the number of POS postings attempted.
    pub fn posting_count(&self) -> usize {
        self.state.read().unwrap().postings.len()
    }

    /// Returns a copy of the most recent posting.
    pub fn last_posting(&self) -> Option<PurchasePosting> {
        self.state.read().unwrap().postings.last().cloned()
    }

    /// Returns a copy of the most recent member row.
    pub fn last_member(&self) -> Option<MemberRecord> {
        self.state.read().unwrap().members.last().cloned()
    }

    /// Returns a copy of the most recent staging record.
    pub fn last_staging(&self) -> Option<GuestStagingRecord> {
        self.state.read().unwrap().staging.last().cloned()
    }
}

#[async_trait]
impl ClubDatabase for InMemoryClubDb {
    async fn next_customer_id(&self, club: &Club) -> Result<CustCode, DbError> {
        let mut state = self.state.write().unwrap();

        if state.fail_next_id {
            return Err(DbError::Call("sequence allocation failed".to_string()));
        }

        state.next_id += 1;
        Ok(CustCode::new(format!(
            "{:04}{:06}",
            club.id.as_u32(),
            state.next_id
        )))
    }

    async fn insert_guest_staging(
        &self,
        _club: &Club,
        record: &GuestStagingRecord,
    ) -> Result<(), DbError> {
        let mut state = self.state.write().unwrap();

        if state.fail_staging {
            return Err(DbError::Call("staging insert failed".to_string()));
        }

        state.staging.push(record.clone());
        Ok(())
    }

    async fn insert_member_row(&self, _club: &Club, record: &MemberRecord) -> Result<(), DbError> {
        let mut state = self.state.write().unwrap();

        if state.fail_member {
            return Err(DbError::Call("member insert failed".to_string()));
        }

        state.members.push(record.clone());
        Ok(())
    }

    async fn post_purchase(
        &self,
        _club: &Club,
        posting: &PurchasePosting,
    ) -> Result<PosPostResult, DbError> {
        let mut state = self.state.write().unwrap();

        if state.fail_post_call {
            return Err(DbError::Unavailable("posting procedure threw".to_string()));
        }

        state.postings.push(posting.clone());

        if let Some(result) = state.post_result.take() {
            return Ok(result);
        }

        state.next_pos_txn += 1;
        Ok(PosPostResult::ok(55000 + state.next_pos_txn))
    }
}
