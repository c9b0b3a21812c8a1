//! Payment instruments.

use serde::Deserialize;

/// How the purchaser's card is presented to the gateway.
///
/// Tokens from the gateway's hosted fields are preferred; raw card data is
/// the fallback when no token is available. Card number and CVV are never
/// logged or persisted in the clear: `Debug` redacts them and the type is
/// deliberately not `Serialize`.
#[derive(Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentInstrument {
    /// Gateway-hosted-field token.
    Token { value: String },
    /// Raw card data. Expiry is `MMYY`.
    RawCard {
        number: String,
        expiry: String,
        cvv: String,
    },
}

impl PaymentInstrument {
    /// Returns the last four digits of the card number, when known.
    pub fn last4(&self) -> Option<String> {
        match self {
            PaymentInstrument::Token { .. } => None,
            PaymentInstrument::RawCard { number, .. } => {
                let digits: String = number.chars().filter(char::is_ascii_digit).collect();
                (digits.len() >= 4).then(|| digits[digits.len() - 4..].to_string())
            }
        }
    }

    /// Returns true if this is a hosted-field token.
    pub fn is_token(&self) -> bool {
        matches!(self, PaymentInstrument::Token { .. })
    }
}

impl std::fmt::Debug for PaymentInstrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentInstrument::Token { value } => {
                let prefix: String = value.chars().take(6).collect();
                f.debug_struct("Token")
                    .field("value", &format!("{prefix}…"))
                    .finish()
            }
            PaymentInstrument::RawCard { expiry, .. } => f
                .debug_struct("RawCard")
                .field("number", &"[redacted]")
                .field("expiry", expiry)
                .field("cvv", &"[redacted]")
                .finish(),
        }
    }
}
