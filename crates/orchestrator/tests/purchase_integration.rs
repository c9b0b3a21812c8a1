//! End-to-end purchase scenarios against the in-memory collaborators.

use std::sync::Arc;

use common::ClubId;
use domain::{Guest, Money, Package, PaymentInstrument, Purchaser};
use gateway::{GatewayRouter, InMemoryGateway};
use orchestrator::{
    InMemoryClubDb, InMemoryMailer, PosPostResult, PurchaseError, PurchaseOrchestrator,
    PurchaseRequest, StaffDirectory,
};
use rust_decimal_macros::dec;

type Orchestrator = PurchaseOrchestrator<
    InMemoryClubDb,
    GatewayRouter<InMemoryGateway, InMemoryGateway>,
    InMemoryMailer,
>;

struct Harness {
    orchestrator: Orchestrator,
    db: InMemoryClubDb,
    texas: InMemoryGateway,
    tennessee: InMemoryGateway,
    mailer: InMemoryMailer,
}

fn setup() -> Harness {
    let db = InMemoryClubDb::new();
    let texas = InMemoryGateway::new("cardlink");
    let tennessee = InMemoryGateway::new("payflex");
    let router = GatewayRouter::new(texas.clone(), tennessee.clone());
    let mailer = InMemoryMailer::new();
    let staff = Arc::new(StaffDirectory::new(
        "ops@chain.example",
        [
            (254u32, "club254gm@chain.example"),
            (600u32, "club600gm@chain.example"),
        ],
    ));

    let orchestrator =
        PurchaseOrchestrator::new(db.clone(), router, mailer.clone(), staff, "WEB");

    Harness {
        orchestrator,
        db,
        texas,
        tennessee,
        mailer,
    }
}

fn guest_request(club_id: u32) -> PurchaseRequest {
    PurchaseRequest {
        club_id: ClubId::new(club_id),
        purchaser: Purchaser::Guest(Guest {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            mobile_phone: Some("(512) 555-0199".to_string()),
            ..Guest::default()
        }),
        package: Package::new("10-Session PT Pack", Money::new(dec!(149.00)), "PT001"),
        instrument: PaymentInstrument::Token {
            value: "tok_abc".to_string(),
        },
    }
}

// Scenario A: guest purchase at a Texas club, capture and posting succeed.
#[tokio::test]
async fn scenario_a_guest_purchase_succeeds_end_to_end() {
    let h = setup();

    let receipt = h.orchestrator.purchase(guest_request(254)).await.unwrap();

    assert_eq!(receipt.processor, "cardlink");
    assert_eq!(receipt.transaction_id, "T1");
    assert_eq!(receipt.pos_transaction_id, 55001);
    assert_eq!(receipt.cust_code.as_str(), "0254000001");

    // the Texas gateway got the exact package price; Tennessee saw nothing
    assert_eq!(h.texas.capture_count(), 1);
    assert_eq!(h.texas.last_amount().unwrap(), Money::new(dec!(149.00)));
    assert_eq!(h.tennessee.capture_count(), 0);

    // identity rows, ledger entry, and receipt all exist
    assert_eq!(h.db.staging_count(), 1);
    assert_eq!(h.db.member_count(), 1);
    let posting = h.db.last_posting().unwrap();
    assert_eq!(posting.product_code, "PT001");
    assert_eq!(posting.quantity, 1);
    assert_eq!(posting.gateway_txn_id, "T1");
    assert_eq!(h.mailer.receipt_count(), 1);
}

// Scenario B: capture succeeds but the POS post returns an error code.
#[tokio::test]
async fn scenario_b_posting_failure_escalates_to_operations() {
    let h = setup();
    h.db.set_post_result(PosPostResult::failed(1, None, None));

    let err = h.orchestrator.purchase(guest_request(254)).await.unwrap_err();

    match &err {
        PurchaseError::PostingInconsistency {
            transaction_id,
            result_code,
            ..
        } => {
            assert_eq!(transaction_id, "T1");
            assert_eq!(*result_code, 1);
        }
        other => panic!("expected posting inconsistency, got {other:?}"),
    }

    // exactly one ops alert referencing the charged transaction
    assert!(h.mailer.wait_for_alerts(1).await);
    let alerts = h.mailer.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].to, "ops@chain.example");
    assert!(alerts[0].html_body.contains("T1"));

    // no receipt for a failed purchase
    assert_eq!(h.mailer.receipt_count(), 0);
}

// Scenario C: an unmapped club id fails before any collaborator is called.
#[tokio::test]
async fn scenario_c_unmapped_club_is_rejected_immediately() {
    let h = setup();

    let err = h.orchestrator.purchase(guest_request(999)).await.unwrap_err();
    assert!(matches!(err, PurchaseError::UnsupportedClub(_)));

    assert_eq!(h.db.staging_count(), 0);
    assert_eq!(h.db.member_count(), 0);
    assert_eq!(h.db.posting_count(), 0);
    assert_eq!(h.texas.capture_count(), 0);
    assert_eq!(h.tennessee.capture_count(), 0);
    assert_eq!(h.mailer.alert_count(), 0);
}

#[tokio::test]
async fn tennessee_clubs_route_to_their_own_processor() {
    let h = setup();

    let receipt = h.orchestrator.purchase(guest_request(600)).await.unwrap();
    assert_eq!(receipt.processor, "payflex");
    assert_eq!(h.tennessee.capture_count(), 1);
    assert_eq!(h.texas.capture_count(), 0);
}

#[tokio::test]
async fn no_charge_without_identity() {
    let h = setup();
    h.db.set_fail_staging(true);

    let err = h.orchestrator.purchase(guest_request(254)).await.unwrap_err();
    assert!(matches!(err, PurchaseError::Provisioning(_)));

    // capture was never attempted, so nothing to alert about
    assert_eq!(h.texas.capture_count(), 0);
    assert_eq!(h.mailer.alert_count(), 0);
}

#[tokio::test]
async fn no_alert_without_a_charge() {
    let h = setup();
    h.texas.set_decline("Do not honor");

    let err = h.orchestrator.purchase(guest_request(254)).await.unwrap_err();
    assert!(matches!(err, PurchaseError::Declined { .. }));

    // give any stray detached task a chance to run before asserting
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert_eq!(h.mailer.alert_count(), 0);
    assert_eq!(h.db.posting_count(), 0);
}

#[tokio::test]
async fn gateway_transport_failure_is_fatal_but_not_a_decline() {
    let h = setup();
    h.texas.set_fail_transport(true);

    let err = h.orchestrator.purchase(guest_request(254)).await.unwrap_err();
    assert!(matches!(err, PurchaseError::Gateway(_)));
    assert_eq!(err.category(), "unexpected");
    assert_eq!(h.db.posting_count(), 0);
}

#[tokio::test]
async fn concurrent_purchases_get_distinct_customer_codes() {
    let h = setup();
    let orchestrator = Arc::new(h.orchestrator);

    let mut handles = Vec::new();
    for _ in 0..4 {
        let orchestrator = orchestrator.clone();
        handles.push(tokio::spawn(async move {
            orchestrator.purchase(guest_request(254)).await.unwrap()
        }));
    }

    let mut codes: Vec<String> = Vec::new();
    for handle in handles {
        codes.push(handle.await.unwrap().cust_code.to_string());
    }
    codes.sort();
    codes.dedup();
    assert_eq!(codes.len(), 4);
}
