//! Normalized capture request/result types.

use common::CustCode;
use domain::{Club, Money, PaymentInstrument};

/// Customer details forwarded to the gateway with the sale.
#[derive(Debug, Clone)]
pub struct CustomerInfo {
    pub cust_code: CustCode,
    pub name: String,
    pub email: String,
}

/// A single capture attempt: charge `amount` against `instrument`.
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    pub club: Club,
    pub amount: Money,
    pub instrument: PaymentInstrument,
    pub customer: CustomerInfo,
}

/// The normalized outcome of a capture, identical for both processors.
///
/// Produced once per purchase attempt and immutable afterwards.
/// Invariant: `approved == true` implies `transaction_id` is non-empty;
/// the adapters enforce this before returning.
#[derive(Debug, Clone, Default)]
pub struct CaptureResult {
    pub approved: bool,
    pub transaction_id: String,
    pub approval_code: String,
    pub card_brand: String,
    /// Format: 12 mask characters followed by the last 4 digits.
    pub masked_card: String,
    /// Expiry as reported by the gateway, `MMYY`.
    pub expiry: String,
    /// Human-readable gateway message, verbatim on declines.
    pub message: String,
    pub processor: &'static str,
}

impl CaptureResult {
    /// Builds a decline result carrying the gateway's verbatim message.
    pub fn declined(processor: &'static str, message: impl Into<String>) -> Self {
        Self {
            approved: false,
            message: message.into(),
            processor,
            ..Self::default()
        }
    }

    /// Returns the last four digits from the masked card, when present.
    ///
    /// The masked card comes verbatim from the gateway, so the mask
    /// characters are not guaranteed to be ASCII; the tail is found on
    /// char boundaries.
    pub fn last4(&self) -> Option<&str> {
        let (tail, _) = self.masked_card.char_indices().rev().nth(3)?;
        let last4 = &self.masked_card[tail..];
        last4.chars().all(|c| c.is_ascii_digit()).then_some(last4)
    }
}

/// Masks a card number down to 12 mask characters plus the last 4 digits.
pub fn mask_card(last4: &str) -> String {
    format!("{}{last4}", "*".repeat(12))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_card_format() {
        assert_eq!(mask_card("1234"), "************1234");
        assert_eq!(mask_card("1234").len(), 16);
    }

    #[test]
    fn last4_from_masked_card() {
        let result = CaptureResult {
            masked_card: mask_card("4242"),
            ..CaptureResult::default()
        };
        assert_eq!(result.last4().unwrap(), "4242");
    }

    #[test]
    fn last4_absent_when_mask_is_empty_or_nondigit() {
        assert!(CaptureResult::default().last4().is_none());
        let result = CaptureResult {
            masked_card: "************XXXX".to_string(),
            ..CaptureResult::default()
        };
        assert!(result.last4().is_none());
    }

    #[test]
    fn last4_handles_multibyte_mask_characters() {
        // some processors mask with bullet characters rather than '*'
        let result = CaptureResult {
            masked_card: "••••••••••••4242".to_string(),
            ..CaptureResult::default()
        };
        assert_eq!(result.last4().unwrap(), "4242");

        // a multibyte char inside the 4-char tail is rejected, not a panic
        let mixed = CaptureResult {
            masked_card: "abc•34".to_string(),
            ..CaptureResult::default()
        };
        assert!(mixed.last4().is_none());

        let short = CaptureResult {
            masked_card: "•34".to_string(),
            ..CaptureResult::default()
        };
        assert!(short.last4().is_none());
    }

    #[test]
    fn declined_carries_message_and_processor() {
        let result = CaptureResult::declined("cardlink", "Insufficient funds");
        assert!(!result.approved);
        assert_eq!(result.message, "Insufficient funds");
        assert_eq!(result.processor, "cardlink");
        assert!(result.transaction_id.is_empty());
    }
}
