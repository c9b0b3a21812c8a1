//! Cardlink gateway client (Texas clubs).
//!
//! Cardlink takes a synchronous form-encoded sale request with the amount
//! as a 2-decimal string and answers with bare `key=value` pairs. A
//! `result` of `"0"` is an approval; anything else is a decline surfaced
//! verbatim. Cardlink only accepts hosted-field tokens.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use domain::{Money, PaymentInstrument};

use crate::capture::{CaptureRequest, CaptureResult};
use crate::credentials::CredentialStore;
use crate::error::GatewayError;
use crate::router::PaymentGateway;

const PROCESSOR: &str = "cardlink";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Form-encoded sale client for the Cardlink gateway.
pub struct CardlinkGateway<C: CredentialStore> {
    http: reqwest::Client,
    credentials: C,
}

impl<C: CredentialStore> CardlinkGateway<C> {
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

/// Formats the capture amount the way Cardlink expects: a decimal string
/// with exactly two fractional digits.
fn form_amount(amount: Money) -> String {
    format!("{:.2}", amount.as_decimal())
}

/// Parses Cardlink's `key=value&key=value` response body.
fn parse_response(body: &str) -> HashMap<&str, &str> {
    body.trim()
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .collect()
}

#[async_trait]
impl<C: CredentialStore> PaymentGateway for CardlinkGateway<C> {
    fn processor(&self) -> &'static str {
        PROCESSOR
    }

    async fn capture(&self, req: &CaptureRequest) -> Result<CaptureResult, GatewayError> {
        // Cardlink has no raw-card endpoint; reject before any network call.
        let token = match &req.instrument {
            PaymentInstrument::Token { value } => value.clone(),
            PaymentInstrument::RawCard { .. } => {
                return Err(GatewayError::UnsupportedInstrument {
                    gateway: PROCESSOR,
                    reason: "a hosted-field token is required",
                });
            }
        };

        let creds = self
            .credentials
            .credentials(req.club.id, PROCESSOR)
            .await?;
        let endpoint = creds.require(PROCESSOR, "endpoint")?.to_string();
        let account_id = creds.require(PROCESSOR, "account_id")?.to_string();
        let site_key = creds.require(PROCESSOR, "site_key")?.to_string();

        let form = [
            ("account_id", account_id),
            ("site_key", site_key),
            ("type", "sale".to_string()),
            ("amount", form_amount(req.amount)),
            ("token", token),
            ("cust_code", req.customer.cust_code.to_string()),
            ("name", req.customer.name.clone()),
            ("email", req.customer.email.clone()),
        ];

        tracing::debug!(club = %req.club.id, amount = %req.amount, "submitting cardlink sale");

        let response = self
            .http
            .post(&endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(PROCESSOR, e))?;

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::from_reqwest(PROCESSOR, e))?;
        let fields = parse_response(&body);

        let result = fields
            .get("result")
            .copied()
            .ok_or_else(|| GatewayError::InvalidResponse {
                gateway: PROCESSOR,
                message: "missing 'result' field".to_string(),
            })?;

        if result != "0" {
            let message = fields
                .get("message")
                .copied()
                .unwrap_or("transaction declined");
            tracing::info!(club = %req.club.id, result, "cardlink declined sale");
            return Ok(CaptureResult::declined(PROCESSOR, message));
        }

        let transaction_id = fields
            .get("transaction_id")
            .copied()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GatewayError::InvalidResponse {
                gateway: PROCESSOR,
                message: "approval without a transaction id".to_string(),
            })?;

        Ok(CaptureResult {
            approved: true,
            transaction_id: transaction_id.to_string(),
            approval_code: fields.get("auth_code").copied().unwrap_or("").to_string(),
            card_brand: fields.get("card_brand").copied().unwrap_or("").to_string(),
            masked_card: fields.get("masked_card").copied().unwrap_or("").to_string(),
            expiry: fields.get("expiry").copied().unwrap_or("").to_string(),
            message: fields.get("message").copied().unwrap_or("approved").to_string(),
            processor: PROCESSOR,
        })
    }
}
