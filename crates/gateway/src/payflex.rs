//! Payflex gateway client (Tennessee clubs).
//!
//! Payflex takes a JSON sale request with the amount as an integer number
//! of minor currency units. That unit conversion lives in this module and
//! nowhere else; the rest of the system only ever sees decimal money.
//! A response `status` of `approved` or `success` is an approval; card
//! brand, masked number, and expiry come from a nested `card` object when
//! the gateway includes one.

use std::time::Duration;

use async_trait::async_trait;
use domain::{Money, PaymentInstrument};
use rust_decimal::RoundingStrategy;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use serde_json::json;

use crate::capture::{CaptureRequest, CaptureResult};
use crate::credentials::CredentialStore;
use crate::error::GatewayError;
use crate::router::PaymentGateway;

const PROCESSOR: &str = "payflex";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON sale client for the Payflex gateway.
pub struct PayflexGateway<C: CredentialStore> {
    http: reqwest::Client,
    credentials: C,
}

impl<C: CredentialStore> PayflexGateway<C> {
    /// Creates a client with the 30 second sale timeout.
    pub fn new(credentials: C) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Transport {
                gateway: PROCESSOR,
                message: e.to_string(),
            })?;
        Ok(Self { http, credentials })
    }
}

/// Converts a decimal amount to Payflex's integer minor units
/// (`149.00` becomes `14900`), rounding half-up.
fn to_minor_units(amount: Money) -> Result<i64, GatewayError> {
    (amount.as_decimal() * rust_decimal::Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| GatewayError::InvalidResponse {
            gateway: PROCESSOR,
            message: format!("amount {amount} does not fit in minor units"),
        })
}

#[derive(Debug, Deserialize)]
struct PayflexCard {
    #[serde(default)]
    brand: String,
    #[serde(default)]
    masked_number: String,
    #[serde(default)]
    expiry: String,
}

#[derive(Debug, Deserialize)]
struct PayflexResponse {
    status: String,
    #[serde(default)]
    transaction_id: String,
    #[serde(default)]
    approval_code: String,
    #[serde(default)]
    message: String,
    card: Option<PayflexCard>,
}

#[async_trait]
impl<C: CredentialStore> PaymentGateway for PayflexGateway<C> {
    fn processor(&self) -> &'static str {
        PROCESSOR
    }

    async fn capture(&self, req: &CaptureRequest) -> Result<CaptureResult, GatewayError> {
        let creds = self
            .credentials
            .credentials(req.club.id, PROCESSOR)
            .await?;
        let endpoint = creds.require(PROCESSOR, "endpoint")?.to_string();
        let merchant_id = creds.require(PROCESSOR, "merchant_id")?.to_string();
        let api_key = creds.require(PROCESSOR, "api_key")?.to_string();

        let instrument = match &req.instrument {
            PaymentInstrument::Token { value } => json!({ "token": value }),
            PaymentInstrument::RawCard {
                number,
                expiry,
                cvv,
            } => json!({ "card": { "number": number, "expiry": expiry, "cvv": cvv } }),
        };

        let body = json!({
            "merchant_id": merchant_id,
            "type": "sale",
            "amount": to_minor_units(req.amount)?,
            "currency": "USD",
            "instrument": instrument,
            "customer": {
                "code": req.customer.cust_code.as_str(),
                "name": req.customer.name,
                "email": req.customer.email,
            },
        });

        tracing::debug!(club = %req.club.id, amount = %req.amount, "submitting payflex sale");

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(PROCESSOR, e))?;

        let parsed: PayflexResponse =
            response
                .json()
                .await
                .map_err(|e| GatewayError::InvalidResponse {
                    gateway: PROCESSOR,
                    message: e.to_string(),
                })?;

        if !matches!(parsed.status.as_str(), "approved" | "success") {
            let message = if parsed.message.is_empty() {
                format!("transaction {}", parsed.status)
            } else {
                parsed.message
            };
            tracing::info!(club = %req.club.id, status = parsed.status, "payflex declined sale");
            return Ok(CaptureResult::declined(PROCESSOR, message));
        }

        if parsed.transaction_id.is_empty() {
            return Err(GatewayError::InvalidResponse {
                gateway: PROCESSOR,
                message: "approval without a transaction id".to_string(),
            });
        }

        let card = parsed.card.unwrap_or(PayflexCard {
            brand: String::new(),
            masked_number: String::new(),
            expiry: String::new(),
        });

        Ok(CaptureResult {
            approved: true,
            transaction_id: parsed.transaction_id,
            approval_code: parsed.approval_code,
            card_brand: card.brand,
            masked_card: card.masked_number,
            expiry: card.expiry,
            message: parsed.message,
            processor: PROCESSOR,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn minor_units_for_whole_dollars() {
        assert_eq!(to_minor_units(Money::new(dec!(149.00))).unwrap(), 14900);
        assert_eq!(to_minor_units(Money::new(dec!(19))).unwrap(), 1900);
    }

    #[test]
    fn minor_units_round_half_up() {
        assert_eq!(to_minor_units(Money::new(dec!(10.005))).unwrap(), 1001);
        assert_eq!(to_minor_units(Money::new(dec!(10.004))).unwrap(), 1000);
    }

    #[test]
    fn approval_statuses() {
        for status in ["approved", "success"] {
            let parsed: PayflexResponse = serde_json::from_value(json!({
                "status": status,
                "transaction_id": "P100",
            }))
            .unwrap();
            assert!(matches!(parsed.status.as_str(), "approved" | "success"));
        }
    }

    #[test]
    fn nested_card_body_deserializes() {
        let parsed: PayflexResponse = serde_json::from_value(json!({
            "status": "approved",
            "transaction_id": "P100",
            "approval_code": "OK1",
            "card": { "brand": "Visa", "masked_number": "************4242", "expiry": "1227" },
        }))
        .unwrap();
        let card = parsed.card.unwrap();
        assert_eq!(card.brand, "Visa");
        assert_eq!(card.masked_number, "************4242");
        assert_eq!(card.expiry, "1227");
    }
}
