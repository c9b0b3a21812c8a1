//! Guest identity provisioning.
//!
//! All three writes happen before any money moves. That ordering is
//! deliberate: identity must exist first so a successful charge can
//! always be attributed to a customer record. The steps are not wrapped
//! in a transaction with the capture; a crash between them leaves
//! partial rows, matching the POS system's existing semantics.

use common::CustCode;
use domain::{Club, Guest};

use crate::db::{ClubDatabase, GuestStagingRecord, MemberRecord, RESTRICTED_GUEST_MARKER};
use crate::error::PurchaseError;

/// Provisions walk-up guests with a fresh customer code.
pub struct Provisioner<D: ClubDatabase> {
    db: D,
}

impl<D: ClubDatabase> Provisioner<D> {
    /// Creates a provisioner over the club database.
    pub fn new(db: D) -> Self {
        Self { db }
    }

    /// Allocates a customer code and writes the staging and member rows.
    ///
    /// Any failure aborts the purchase before capture is attempted.
    #[tracing::instrument(skip(self, guest), fields(club = %club.id))]
    pub async fn provision(&self, club: &Club, guest: &Guest) -> Result<CustCode, PurchaseError> {
        let cust_code = self
            .db
            .next_customer_id(club)
            .await
            .map_err(|e| PurchaseError::Provisioning(e.to_string()))?;

        if cust_code.is_empty() {
            return Err(PurchaseError::Provisioning(
                "database returned no customer identifier".to_string(),
            ));
        }

        let staging = GuestStagingRecord {
            cust_code: cust_code.clone(),
            business_name: guest.business_name(),
            email: guest.email.clone(),
            phone: guest.preferred_phone(),
            address: guest.address.clone(),
            city: guest.city.clone(),
            state: guest.state.clone(),
            zip: guest.zip.clone(),
            payment_profile: RESTRICTED_GUEST_MARKER,
        };
        self.db
            .insert_guest_staging(club, &staging)
            .await
            .map_err(|e| PurchaseError::Provisioning(e.to_string()))?;

        let member = MemberRecord {
            cust_code: cust_code.clone(),
            first_name: guest.first_name.trim().to_string(),
            last_name: guest.last_name.trim().to_string(),
            middle_initial: guest.middle_initial.clone(),
            email: guest.email.clone(),
            phone: guest.preferred_phone(),
            date_of_birth: guest.date_of_birth,
            gender: guest.gender.clone(),
            created_on: chrono::Local::now().date_naive(),
        };
        self.db
            .insert_member_row(club, &member)
            .await
            .map_err(|e| PurchaseError::Provisioning(e.to_string()))?;

        tracing::info!(club = %club.id, cust_code = %cust_code, "guest provisioned");
        Ok(cust_code)
    }
}
