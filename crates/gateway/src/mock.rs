//! In-memory gateway for testing.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::Money;

use crate::capture::{CaptureRequest, CaptureResult, mask_card};
use crate::error::GatewayError;
use crate::router::PaymentGateway;

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    attempts: usize,
    captured_amounts: Vec<Money>,
    next_id: u32,
    decline: bool,
    decline_message: String,
    fail_transport: bool,
}

/// In-memory payment gateway for testing.
///
/// Approves every capture with sequential transaction ids (`T1`, `T2`, …)
/// unless configured to decline or to fail at the transport level.
#[derive(Debug, Clone)]
pub struct InMemoryGateway {
    processor: &'static str,
    state: Arc<RwLock<InMemoryGatewayState>>,
}

impl InMemoryGateway {
    /// Creates an in-memory gateway reporting the given processor name.
    pub fn new(processor: &'static str) -> Self {
        Self {
            processor,
            state: Arc::new(RwLock::new(InMemoryGatewayState::default())),
        }
    }

    /// Configures the gateway to decline the next captures.
    pub fn set_decline(&self, message: impl Into<String>) {
        let mut state = self.state.write().unwrap();
        state.decline = true;
        state.decline_message = message.into();
    }

    /// Configures the gateway to fail at the transport level.
    pub fn set_fail_transport(&self, fail: bool) {
        self.state.write().unwrap().fail_transport = fail;
    }

    /// Returns the number of captures attempted against the gateway,
    /// including declines and transport failures.
    pub fn capture_count(&self) -> usize {
        self.state.read().unwrap().attempts
    }

    /// Returns the number of captures that were approved.
    pub fn approved_count(&self) -> usize {
        self.state.read().unwrap().captured_amounts.len()
    }

    /// Returns the amount of the most recent capture.
    pub fn last_amount(&self) -> Option<Money> {
        self.state.read().unwrap().captured_amounts.last().copied()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryGateway {
    fn processor(&self) -> &'static str {
        self.processor
    }

    async fn capture(&self, req: &CaptureRequest) -> Result<CaptureResult, GatewayError> {
        let mut state = self.state.write().unwrap();
        state.attempts += 1;

        if state.fail_transport {
            return Err(GatewayError::Transport {
                gateway: self.processor,
                message: "connection refused".to_string(),
            });
        }

        if state.decline {
            return Ok(CaptureResult::declined(
                self.processor,
                state.decline_message.clone(),
            ));
        }

        state.captured_amounts.push(req.amount);
        state.next_id += 1;

        Ok(CaptureResult {
            approved: true,
            transaction_id: format!("T{}", state.next_id),
            approval_code: format!("OK{:03}", state.next_id),
            card_brand: "Visa".to_string(),
            masked_card: mask_card("1111"),
            expiry: "1227".to_string(),
            message: "approved".to_string(),
            processor: self.processor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{ClubId, CustCode};
    use domain::{PaymentInstrument, resolve_club};

    fn request() -> CaptureRequest {
        CaptureRequest {
            club: resolve_club(ClubId::new(254)).unwrap(),
            amount: Money::from_major(149),
            instrument: PaymentInstrument::Token {
                value: "tok_abc".to_string(),
            },
            customer: crate::capture::CustomerInfo {
                cust_code: CustCode::new("C1"),
                name: "JANE DOE".to_string(),
                email: "jane@example.com".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn approves_with_sequential_transaction_ids() {
        let gateway = InMemoryGateway::new("cardlink");

        let r1 = gateway.capture(&request()).await.unwrap();
        let r2 = gateway.capture(&request()).await.unwrap();

        assert!(r1.approved);
        assert_eq!(r1.transaction_id, "T1");
        assert_eq!(r2.transaction_id, "T2");
        assert_eq!(gateway.capture_count(), 2);
        assert_eq!(gateway.last_amount().unwrap(), Money::from_major(149));
    }

    #[tokio::test]
    async fn decline_is_ok_with_message() {
        let gateway = InMemoryGateway::new("cardlink");
        gateway.set_decline("Insufficient funds");

        let result = gateway.capture(&request()).await.unwrap();
        assert!(!result.approved);
        assert_eq!(result.message, "Insufficient funds");
        // the attempt is counted even though nothing was approved
        assert_eq!(gateway.capture_count(), 1);
        assert_eq!(gateway.approved_count(), 0);
    }

    #[tokio::test]
    async fn transport_failure_is_an_error() {
        let gateway = InMemoryGateway::new("payflex");
        gateway.set_fail_transport(true);

        let err = gateway.capture(&request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport { .. }));
        assert_eq!(gateway.capture_count(), 1);
        assert_eq!(gateway.approved_count(), 0);
    }
}
