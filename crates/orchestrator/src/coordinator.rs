//! The purchase orchestrator.

use std::sync::Arc;

use common::{ClubId, CustCode};
use domain::{Package, PaymentInstrument, Purchaser, resolve_club};
use gateway::{CaptureRequest, CustomerInfo, PaymentGateway};

use crate::attempt::PurchaseAttempt;
use crate::db::ClubDatabase;
use crate::error::PurchaseError;
use crate::notify::{Mailer, NotificationDispatcher, PaymentSummary, StaffDirectory};
use crate::posting::derive_posting;
use crate::provision::Provisioner;
use crate::state::PurchaseState;

/// One incoming purchase request.
#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    pub club_id: ClubId,
    pub purchaser: Purchaser,
    pub package: Package,
    pub instrument: PaymentInstrument,
}

/// What a completed purchase returns to the caller.
#[derive(Debug, Clone)]
pub struct PurchaseReceipt {
    pub cust_code: CustCode,
    pub processor: &'static str,
    pub transaction_id: String,
    pub pos_transaction_id: i64,
    pub last4: Option<String>,
}

/// Orchestrates a purchase through its strictly ordered steps.
///
/// No distributed transaction spans the steps; each one fails in the
/// cheapest safe way. Validation and provisioning fail before money
/// moves; a gateway decline is reported but not alerted; a POS posting
/// failure after a successful capture is the one state that demands
/// operator escalation, because the charge would otherwise be lost.
pub struct PurchaseOrchestrator<D, G, M>
where
    D: ClubDatabase + Clone,
    G: PaymentGateway,
    M: Mailer + Clone + 'static,
{
    gateway: G,
    db: D,
    provisioner: Provisioner<D>,
    notifier: NotificationDispatcher<M>,
    sales_rep: String,
}

impl<D, G, M> PurchaseOrchestrator<D, G, M>
where
    D: ClubDatabase + Clone,
    G: PaymentGateway,
    M: Mailer + Clone + 'static,
{
    /// Creates an orchestrator over the database, gateway, and mailer.
    pub fn new(
        db: D,
        gateway: G,
        mailer: M,
        staff: Arc<StaffDirectory>,
        sales_rep: impl Into<String>,
    ) -> Self {
        let provisioner = Provisioner::new(db.clone());
        let notifier = NotificationDispatcher::new(mailer, staff);
        Self {
            gateway,
            db,
            provisioner,
            notifier,
            sales_rep: sales_rep.into(),
        }
    }

    /// Executes one purchase to completion or terminal failure.
    ///
    /// Runs as a single sequential unit of work; once the capture starts
    /// the attempt always runs through posting before any response is
    /// produced.
    #[tracing::instrument(skip(self, req), fields(club = %req.club_id))]
    pub async fn purchase(&self, req: PurchaseRequest) -> Result<PurchaseReceipt, PurchaseError> {
        metrics::counter!("purchase_attempts_total").increment(1);
        let started = std::time::Instant::now();

        let result = self.run(req).await;

        metrics::histogram!("purchase_duration_seconds").record(started.elapsed().as_secs_f64());
        match &result {
            Ok(receipt) => {
                metrics::counter!("purchase_completed").increment(1);
                tracing::info!(
                    cust_code = %receipt.cust_code,
                    transaction_id = %receipt.transaction_id,
                    pos_transaction_id = receipt.pos_transaction_id,
                    "purchase completed"
                );
            }
            Err(e) => {
                tracing::warn!(category = e.category(), error = %e, "purchase failed");
            }
        }
        result
    }

    async fn run(&self, req: PurchaseRequest) -> Result<PurchaseReceipt, PurchaseError> {
        // 1. Validating: no side effects until everything checks out.
        let club = resolve_club(req.club_id)?;
        req.purchaser.validate()?;
        req.package.validate()?;

        let mut attempt = PurchaseAttempt::new(club);
        tracing::info!(
            attempt_id = %attempt.attempt_id(),
            club = %req.club_id,
            purchaser = %req.purchaser.name(),
            "purchase attempt started"
        );

        // 2. Provisioning: guests get an identity before any money moves.
        let cust_code = match &req.purchaser {
            Purchaser::Member { cust_code, .. } => cust_code.clone(),
            Purchaser::Guest(guest) => {
                attempt.advance(PurchaseState::Provisioning);
                match self.provisioner.provision(&club, guest).await {
                    Ok(code) => code,
                    Err(e) => {
                        attempt.fail(e.to_string());
                        return Err(e);
                    }
                }
            }
        };
        attempt.set_cust_code(cust_code.clone());

        // 3. Capturing: the package price is the exact capture amount.
        attempt.advance(PurchaseState::Capturing);
        let capture_req = CaptureRequest {
            club,
            amount: req.package.price,
            instrument: req.instrument.clone(),
            customer: CustomerInfo {
                cust_code: cust_code.clone(),
                name: req.purchaser.name(),
                email: req.purchaser.email().to_string(),
            },
        };

        let capture = match self.gateway.capture(&capture_req).await {
            Ok(capture) => capture,
            Err(e) => {
                attempt.fail(e.to_string());
                return Err(e.into());
            }
        };

        if !capture.approved {
            metrics::counter!("purchase_declined").increment(1);
            let err = PurchaseError::Declined {
                processor: capture.processor,
                message: capture.message.clone(),
            };
            attempt.fail(err.to_string());
            return Err(err);
        }
        attempt.set_capture(capture.clone());

        let summary = PaymentSummary {
            processor: capture.processor,
            transaction_id: capture.transaction_id.clone(),
            approval_code: capture.approval_code.clone(),
            masked_card: capture.masked_card.clone(),
            expiry: capture.expiry.clone(),
            amount: req.package.price,
        };

        // 4. Posting: from here on a charge exists; failures escalate.
        attempt.advance(PurchaseState::Posting);
        let posting = derive_posting(&req.package, &capture, &cust_code, &self.sales_rep);

        let post_result = match self.db.post_purchase(&club, &posting).await {
            Ok(result) => result,
            Err(e) => {
                self.notifier.alert_posting_inconsistency(
                    &club,
                    &req.purchaser.name(),
                    req.purchaser.email(),
                    &req.package,
                    &summary,
                    &crate::db::PosPostResult::failed(-1, Some(e.to_string()), None),
                );
                metrics::counter!("posting_inconsistencies_total").increment(1);
                let err = PurchaseError::PostingInconsistency {
                    transaction_id: capture.transaction_id.clone(),
                    result_code: -1,
                    sql_error: Some(e.to_string()),
                    isam_error: None,
                };
                attempt.fail(err.to_string());
                return Err(err);
            }
        };
        attempt.set_post_result(post_result.clone());

        let Some(pos_transaction_id) = post_result.success_id() else {
            debug_assert!(attempt.charged_but_not_posted());
            self.notifier.alert_posting_inconsistency(
                &club,
                &req.purchaser.name(),
                req.purchaser.email(),
                &req.package,
                &summary,
                &post_result,
            );
            metrics::counter!("posting_inconsistencies_total").increment(1);
            let err = PurchaseError::PostingInconsistency {
                transaction_id: capture.transaction_id.clone(),
                result_code: post_result.result_code,
                sql_error: post_result.sql_error.clone(),
                isam_error: post_result.isam_error,
            };
            attempt.fail(err.to_string());
            return Err(err);
        };

        // 5. Notifying: receipt is awaited, everything else is detached;
        // none of it can fail the purchase at this point.
        attempt.advance(PurchaseState::Notifying);
        self.notifier
            .send_receipt(
                &club,
                &req.purchaser.name(),
                req.purchaser.email(),
                &req.package,
                &summary,
            )
            .await;
        self.notifier
            .notify_staff(&club, &req.purchaser.name(), &req.package);

        // 6. Completed.
        attempt.advance(PurchaseState::Completed);
        Ok(PurchaseReceipt {
            cust_code,
            processor: capture.processor,
            transaction_id: capture.transaction_id.clone(),
            pos_transaction_id,
            last4: capture.last4().map(str::to_string),
        })
    }
}
