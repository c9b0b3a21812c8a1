//! Derivation of POS posting parameters from a capture result.

use chrono::NaiveDate;
use common::CustCode;
use domain::Package;
use gateway::CaptureResult;

use crate::db::PurchasePosting;

/// Every PT package sale posts a quantity of one.
pub const POSTING_QUANTITY: u32 = 1;

/// Normalizes a gateway card brand to the POS's fixed 4-character code.
pub fn issuer_code(brand: &str) -> &'static str {
    let brand = brand.trim().to_ascii_lowercase();
    match brand.as_str() {
        "visa" => "VISA",
        "mastercard" | "master card" | "mc" => "MCRD",
        "amex" | "american express" => "AMEX",
        "discover" => "DISC",
        _ => "CARD",
    }
}

/// Converts a gateway `MMYY` (or `MM/YY`) expiry to the POS date form:
/// the first day of the expiry month.
pub fn expiry_to_pos_date(expiry: &str) -> Option<NaiveDate> {
    let digits: String = expiry.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 4 {
        return None;
    }
    let month: u32 = digits[..2].parse().ok()?;
    let year: i32 = digits[2..].parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + year, month, 1)
}

/// Builds the POS posting parameters for a captured sale.
pub fn derive_posting(
    package: &Package,
    capture: &CaptureResult,
    cust_code: &CustCode,
    sales_rep: &str,
) -> PurchasePosting {
    PurchasePosting {
        cust_code: cust_code.clone(),
        product_code: package.product_code.clone(),
        quantity: POSTING_QUANTITY,
        price: package.price,
        card_issuer: issuer_code(&capture.card_brand),
        expiry: expiry_to_pos_date(&capture.expiry),
        masked_card: capture.masked_card.clone(),
        sales_rep: sales_rep.to_string(),
        create_gift_cert: false,
        description: package.description.clone(),
        approval_code: capture.approval_code.clone(),
        gateway_txn_id: capture.transaction_id.clone(),
    }
}
