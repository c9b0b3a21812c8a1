//! The gateway trait and per-jurisdiction routing.

use async_trait::async_trait;
use domain::Jurisdiction;

use crate::capture::{CaptureRequest, CaptureResult};
use crate::error::GatewayError;

/// The single capture contract the orchestrator depends on.
///
/// A decline is `Ok` with `approved == false`; `Err` is reserved for
/// configuration, transport, and timeout failures. No implementation
/// retries a capture.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// The processor name this gateway reports in results.
    fn processor(&self) -> &'static str;

    /// Charges the instrument for the requested amount.
    async fn capture(&self, req: &CaptureRequest) -> Result<CaptureResult, GatewayError>;
}

/// Routes each capture to the jurisdiction's gateway.
///
/// Holds one gateway per jurisdiction so the orchestrator stays
/// processor-agnostic beyond jurisdiction selection.
pub struct GatewayRouter<A, B>
where
    A: PaymentGateway,
    B: PaymentGateway,
{
    texas: A,
    tennessee: B,
}

impl<A, B> GatewayRouter<A, B>
where
    A: PaymentGateway,
    B: PaymentGateway,
{
    /// Creates a router from the two jurisdiction gateways.
    pub fn new(texas: A, tennessee: B) -> Self {
        Self { texas, tennessee }
    }
}

#[async_trait]
impl<A, B> PaymentGateway for GatewayRouter<A, B>
where
    A: PaymentGateway,
    B: PaymentGateway,
{
    fn processor(&self) -> &'static str {
        "router"
    }

    async fn capture(&self, req: &CaptureRequest) -> Result<CaptureResult, GatewayError> {
        match req.club.jurisdiction {
            Jurisdiction::Texas => self.texas.capture(req).await,
            Jurisdiction::Tennessee => self.tennessee.capture(req).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::InMemoryGateway;
    use common::{ClubId, CustCode};
    use domain::{Money, PaymentInstrument, resolve_club};

    fn request(club_id: u32) -> CaptureRequest {
        CaptureRequest {
            club: resolve_club(ClubId::new(club_id)).unwrap(),
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
    async fn routes_texas_clubs_to_the_texas_gateway() {
        let texas = InMemoryGateway::new("cardlink");
        let tennessee = InMemoryGateway::new("payflex");
        let router = GatewayRouter::new(texas.clone(), tennessee.clone());

        let result = router.capture(&request(254)).await.unwrap();
        assert_eq!(result.processor, "cardlink");
        assert_eq!(texas.capture_count(), 1);
        assert_eq!(tennessee.capture_count(), 0);
    }

    #[tokio::test]
    async fn routes_tennessee_clubs_to_the_tennessee_gateway() {
        let texas = InMemoryGateway::new("cardlink");
        let tennessee = InMemoryGateway::new("payflex");
        let router = GatewayRouter::new(texas.clone(), tennessee.clone());

        let result = router.capture(&request(600)).await.unwrap();
        assert_eq!(result.processor, "payflex");
        assert_eq!(texas.capture_count(), 0);
        assert_eq!(tennessee.capture_count(), 1);
    }
}
