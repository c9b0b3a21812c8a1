//! Receipt and operations-alert dispatch.
//!
//! The purchaser's receipt is awaited; every other send is dispatched on
//! a detached task so SMTP availability can never delay or fail a
//! purchase response. Detached sends log their own failures locally.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::ClubId;
use domain::{Club, Money, Package};

use crate::db::PosPostResult;

/// Normalized payment details carried into receipts and alerts.
#[derive(Debug, Clone)]
pub struct PaymentSummary {
    pub processor: &'static str,
    pub transaction_id: String,
    pub approval_code: String,
    pub masked_card: String,
    pub expiry: String,
    pub amount: Money,
}

/// A receipt email to the purchaser (and optional PT-manager copy).
#[derive(Debug, Clone)]
pub struct ReceiptEmail {
    pub to: String,
    pub cc: Option<String>,
    pub purchaser_name: String,
    pub club_id: ClubId,
    pub package_description: String,
    pub amount: Money,
    pub masked_card: String,
}

/// An out-of-band alert to staff.
#[derive(Debug, Clone)]
pub struct OpsAlert {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Boundary trait for the SMTP relay, implemented elsewhere.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends a receipt. Returns false (never errors) on failure.
    async fn send_receipt(&self, receipt: &ReceiptEmail) -> bool;

    /// Sends an ops alert. Best effort; failures are swallowed by the
    /// implementation after logging.
    async fn send_ops_alert(&self, alert: &OpsAlert);
}

/// Club-to-staff email lookup, injected at startup.
///
/// Convention: the general manager's address has a `...gm@...` local
/// part; the PT-manager address is derived by replacing that `gm` suffix
/// with `ptm`.
#[derive(Debug, Clone)]
pub struct StaffDirectory {
    ops_address: String,
    gm_addresses: HashMap<u32, String>,
}

impl StaffDirectory {
    /// Builds a directory from the ops address and club → GM entries.
    pub fn new<I, S>(ops_address: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        Self {
            ops_address: ops_address.into(),
            gm_addresses: entries.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }

    /// Returns the operations alert address.
    pub fn ops_address(&self) -> &str {
        &self.ops_address
    }

    /// Returns the general manager address for a club, if configured.
    pub fn gm_address(&self, club: ClubId) -> Option<&str> {
        self.gm_addresses.get(&club.as_u32()).map(String::as_str)
    }

    /// Derives the PT-manager address from the GM address.
    pub fn pt_manager_address(&self, club: ClubId) -> Option<String> {
        let gm = self.gm_address(club)?;
        let (local, domain) = gm.split_once('@')?;
        let stem = local.strip_suffix("gm")?;
        Some(format!("{stem}ptm@{domain}"))
    }
}

/// Dispatches receipts and alerts around the orchestrator.
pub struct NotificationDispatcher<M: Mailer + Clone + 'static> {
    mailer: M,
    staff: Arc<StaffDirectory>,
}

impl<M: Mailer + Clone + 'static> NotificationDispatcher<M> {
    /// Creates a dispatcher.
    pub fn new(mailer: M, staff: Arc<StaffDirectory>) -> Self {
        Self { mailer, staff }
    }

    /// Sends the purchaser's receipt and returns whether it was delivered.
    ///
    /// Awaited by the caller. A failed receipt is logged and raises a
    /// low-priority ops alert on a detached task; it never fails the
    /// purchase, which is already posted by the time this runs.
    pub async fn send_receipt(
        &self,
        club: &Club,
        purchaser_name: &str,
        purchaser_email: &str,
        package: &Package,
        summary: &PaymentSummary,
    ) -> bool {
        let receipt = ReceiptEmail {
            to: purchaser_email.to_string(),
            cc: self.staff.pt_manager_address(club.id),
            purchaser_name: purchaser_name.to_string(),
            club_id: club.id,
            package_description: package.description.clone(),
            amount: summary.amount,
            masked_card: summary.masked_card.clone(),
        };

        let delivered = self.mailer.send_receipt(&receipt).await;
        if !delivered {
            tracing::warn!(club = %club.id, to = %receipt.to, "receipt delivery failed");
            self.dispatch_alert(OpsAlert {
                to: self.staff.ops_address().to_string(),
                subject: format!("Receipt delivery failed — club {}", club.id),
                html_body: format!(
                    "<p>Receipt to {} for {} could not be sent. Sale {} is posted; \
                     resend manually.</p>",
                    receipt.to, receipt.purchaser_name, summary.transaction_id
                ),
            });
        }
        delivered
    }

    /// Escalates a charged-but-not-posted purchase to operations.
    ///
    /// Mandatory whenever capture succeeded and the POS post did not. The
    /// send itself is best-effort and detached; its outcome never changes
    /// the response already owed to the caller.
    pub fn alert_posting_inconsistency(
        &self,
        club: &Club,
        purchaser_name: &str,
        purchaser_email: &str,
        package: &Package,
        summary: &PaymentSummary,
        post: &PosPostResult,
    ) {
        let alert = OpsAlert {
            to: self.staff.ops_address().to_string(),
            subject: format!(
                "MANUAL RECONCILIATION REQUIRED — club {} charge {}",
                club.id, summary.transaction_id
            ),
            html_body: format!(
                "<p>Card charged but POS posting failed.</p>\
                 <p>Purchaser: {purchaser_name} &lt;{purchaser_email}&gt;<br>\
                 Package: {} ({}) for {}<br>\
                 Processor: {} / transaction {} / approval {} / card {} exp {}<br>\
                 POS result_code={}, sql_error={:?}, isam_error={:?}</p>",
                package.description,
                package.product_code,
                summary.amount,
                summary.processor,
                summary.transaction_id,
                summary.approval_code,
                summary.masked_card,
                summary.expiry,
                post.result_code,
                post.sql_error,
                post.isam_error,
            ),
        };
        tracing::error!(
            club = %club.id,
            transaction_id = %summary.transaction_id,
            result_code = post.result_code,
            "posting inconsistency, escalating to operations"
        );
        self.dispatch_alert(alert);
    }

    /// Tells club staff about a completed sale. Detached.
    pub fn notify_staff(&self, club: &Club, purchaser_name: &str, package: &Package) {
        let Some(gm) = self.staff.gm_address(club.id) else {
            tracing::warn!(club = %club.id, "no staff address configured, skipping notification");
            return;
        };
        self.dispatch_alert(OpsAlert {
            to: gm.to_string(),
            subject: format!("PT package sold — club {}", club.id),
            html_body: format!(
                "<p>{purchaser_name} purchased {} ({}).</p>",
                package.description, package.product_code
            ),
        });
    }

    /// Spawns a best-effort alert send with local error handling.
    fn dispatch_alert(&self, alert: OpsAlert) {
        let mailer = self.mailer.clone();
        tokio::spawn(async move {
            tracing::debug!(to = %alert.to, subject = %alert.subject, "sending ops alert");
            mailer.send_ops_alert(&alert).await;
        });
    }
}

#[derive(Debug, Default)]
struct InMemoryMailerState {
    receipts: Vec<ReceiptEmail>,
    alerts: Vec<OpsAlert>,
    fail_receipt: bool,
}

/// In-memory mailer for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMailer {
    state: Arc<std::sync::RwLock<InMemoryMailerState>>,
}

impl InMemoryMailer {
    /// Creates an empty mailer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures receipt sends to fail.
    pub fn set_fail_receipt(&self, fail: bool) {
        self.state.write().unwrap().fail_receipt = fail;
    }

    /// Returns the number of receipts delivered.
    pub fn receipt_count(&self) -> usize {
        self.state.read().unwrap().receipts.len()
    }

    /// Returns the number of alerts sent.
    pub fn alert_count(&self) -> usize {
        self.state.read().unwrap().alerts.len()
    }

    /// Returns copies of all alerts sent so far.
    pub fn alerts(&self) -> Vec<OpsAlert> {
        self.state.read().unwrap().alerts.clone()
    }

    /// Returns a copy of the most recent receipt.
    pub fn last_receipt(&self) -> Option<ReceiptEmail> {
        self.state.read().unwrap().receipts.last().cloned()
    }

    /// Waits until at least `count` alerts have arrived.
    ///
    /// Alert sends run on detached tasks, so tests poll briefly instead
    /// of racing them. Returns false on timeout.
    pub async fn wait_for_alerts(&self, count: usize) -> bool {
        for _ in 0..200 {
            if self.alert_count() >= count {
                return true;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        self.alert_count() >= count
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send_receipt(&self, receipt: &ReceiptEmail) -> bool {
        let mut state = self.state.write().unwrap();
        if state.fail_receipt {
            return false;
        }
        state.receipts.push(receipt.clone());
        true
    }

    async fn send_ops_alert(&self, alert: &OpsAlert) {
        self.state.write().unwrap().alerts.push(alert.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn staff() -> Arc<StaffDirectory> {
        Arc::new(StaffDirectory::new(
            "ops@chain.example",
            [(254u32, "club254gm@chain.example")],
        ))
    }

    fn summary() -> PaymentSummary {
        PaymentSummary {
            processor: "cardlink",
            transaction_id: "T1".to_string(),
            approval_code: "OK001".to_string(),
            masked_card: "************1111".to_string(),
            expiry: "1227".to_string(),
            amount: Money::new(dec!(149.00)),
        }
    }

    #[test]
    fn pt_manager_address_derived_from_gm() {
        let staff = staff();
        assert_eq!(staff.gm_address(ClubId::new(254)).unwrap(), "club254gm@chain.example");
        assert_eq!(
            staff.pt_manager_address(ClubId::new(254)).unwrap(),
            "club254ptm@chain.example"
        );
    }

    #[test]
    fn pt_manager_address_none_without_gm_entry_or_suffix() {
        let staff = staff();
        assert!(staff.pt_manager_address(ClubId::new(999)).is_none());

        let odd = StaffDirectory::new("ops@chain.example", [(1u32, "manager@chain.example")]);
        assert!(odd.pt_manager_address(ClubId::new(1)).is_none());
    }

    #[tokio::test]
    async fn receipt_is_ccd_to_the_pt_manager() {
        let mailer = InMemoryMailer::new();
        let dispatcher = NotificationDispatcher::new(mailer.clone(), staff());
        let club = domain::resolve_club(ClubId::new(254)).unwrap();
        let package = Package::new("PT Pack", Money::new(dec!(149.00)), "PT001");

        let delivered = dispatcher
            .send_receipt(&club, "JANE DOE", "jane@example.com", &package, &summary())
            .await;

        assert!(delivered);
        let receipt = mailer.last_receipt().unwrap();
        assert_eq!(receipt.to, "jane@example.com");
        assert_eq!(receipt.cc.as_deref(), Some("club254ptm@chain.example"));
    }

    #[tokio::test]
    async fn failed_receipt_raises_low_priority_alert() {
        let mailer = InMemoryMailer::new();
        mailer.set_fail_receipt(true);
        let dispatcher = NotificationDispatcher::new(mailer.clone(), staff());
        let club = domain::resolve_club(ClubId::new(254)).unwrap();
        let package = Package::new("PT Pack", Money::new(dec!(149.00)), "PT001");

        let delivered = dispatcher
            .send_receipt(&club, "JANE DOE", "jane@example.com", &package, &summary())
            .await;

        assert!(!delivered);
        assert!(mailer.wait_for_alerts(1).await);
        let alert = &mailer.alerts()[0];
        assert_eq!(alert.to, "ops@chain.example");
        assert!(alert.subject.contains("Receipt delivery failed"));
    }

    #[tokio::test]
    async fn posting_inconsistency_alert_carries_the_transaction_id() {
        let mailer = InMemoryMailer::new();
        let dispatcher = NotificationDispatcher::new(mailer.clone(), staff());
        let club = domain::resolve_club(ClubId::new(254)).unwrap();
        let package = Package::new("PT Pack", Money::new(dec!(149.00)), "PT001");
        let post = PosPostResult::failed(1, Some("-271".to_string()), Some(-134));

        dispatcher.alert_posting_inconsistency(
            &club,
            "JANE DOE",
            "jane@example.com",
            &package,
            &summary(),
            &post,
        );

        assert!(mailer.wait_for_alerts(1).await);
        let alert = &mailer.alerts()[0];
        assert!(alert.subject.contains("T1"));
        assert!(alert.html_body.contains("T1"));
        assert!(alert.html_body.contains("result_code=1"));
    }

    #[tokio::test]
    async fn staff_notification_goes_to_the_gm() {
        let mailer = InMemoryMailer::new();
        let dispatcher = NotificationDispatcher::new(mailer.clone(), staff());
        let club = domain::resolve_club(ClubId::new(254)).unwrap();
        let package = Package::new("PT Pack", Money::new(dec!(149.00)), "PT001");

        dispatcher.notify_staff(&club, "JANE DOE", &package);

        assert!(mailer.wait_for_alerts(1).await);
        assert_eq!(mailer.alerts()[0].to, "club254gm@chain.example");
    }
}
