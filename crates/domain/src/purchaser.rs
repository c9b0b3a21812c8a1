//! Purchaser value objects: members and walk-up guests.

use chrono::NaiveDate;
use common::CustCode;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A walk-up guest with no prior membership record.
///
/// Guests are provisioned a fresh customer code for the single purchase
/// ("restricted guest": cash/card only, no ACH on file).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Guest {
    pub first_name: String,
    pub last_name: String,
    pub middle_initial: Option<String>,
    pub email: String,
    /// Home phone.
    pub phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub work_phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
}

impl Guest {
    /// Returns the business name written to the staging record:
    /// `FIRST MIDDLE. LAST`, trimmed and upper-cased.
    pub fn business_name(&self) -> String {
        let middle = self
            .middle_initial
            .as_deref()
            .map(|m| m.trim().trim_end_matches('.'))
            .filter(|m| !m.is_empty())
            .map(|m| format!("{m}."));

        let parts = [
            Some(self.first_name.trim()),
            middle.as_deref(),
            Some(self.last_name.trim()),
        ];

        parts
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase()
    }

    /// Returns the phone written to the member row.
    ///
    /// Priority: mobile, then home, then work. The number is normalized
    /// to digits only.
    pub fn preferred_phone(&self) -> Option<String> {
        [&self.mobile_phone, &self.phone, &self.work_phone]
            .into_iter()
            .flatten()
            .map(|p| normalize_phone(p))
            .find(|p| !p.is_empty())
    }

    /// Validates the minimum identity fields required before provisioning.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.first_name.trim().is_empty() {
            return Err(DomainError::MissingField("first_name"));
        }
        if self.last_name.trim().is_empty() {
            return Err(DomainError::MissingField("last_name"));
        }
        if self.email.trim().is_empty() {
            return Err(DomainError::MissingField("email"));
        }
        Ok(())
    }
}

fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// The person paying for the package.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Purchaser {
    /// An existing member, already looked up by membership number.
    Member {
        cust_code: CustCode,
        name: String,
        email: String,
    },
    /// A walk-up guest needing provisioning before capture.
    Guest(Guest),
}

impl Purchaser {
    /// Returns the purchaser's display name.
    pub fn name(&self) -> String {
        match self {
            Purchaser::Member { name, .. } => name.clone(),
            Purchaser::Guest(g) => g.business_name(),
        }
    }

    /// Returns the purchaser's email address.
    pub fn email(&self) -> &str {
        match self {
            Purchaser::Member { email, .. } => email,
            Purchaser::Guest(g) => &g.email,
        }
    }

    /// Validates the minimum identity fields.
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            Purchaser::Member {
                cust_code,
                name,
                email,
            } => {
                if cust_code.is_empty() {
                    return Err(DomainError::MissingField("cust_code"));
                }
                if name.trim().is_empty() {
                    return Err(DomainError::MissingField("name"));
                }
                if email.trim().is_empty() {
                    return Err(DomainError::MissingField("email"));
                }
                Ok(())
            }
            Purchaser::Guest(g) => g.validate(),
        }
    }
}
