//! Personal-training package value object.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::money::Money;

/// A purchasable personal-training package.
///
/// Immutable once selected; the price is authoritative for the capture
/// amount submitted to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub description: String,
    pub price: Money,
    pub product_code: String,
}

impl Package {
    /// Creates a package.
    pub fn new(description: impl Into<String>, price: Money, product_code: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            price,
            product_code: product_code.into(),
        }
    }

    /// Validates that the package can be sold.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.product_code.trim().is_empty() {
            return Err(DomainError::MissingField("product_code"));
        }
        if !self.price.is_positive() {
            return Err(DomainError::MissingField("price"));
        }
        Ok(())
    }
}
