//! The purchase endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use common::ClubId;
use domain::{Package, PaymentInstrument, Purchaser};
use gateway::PaymentGateway;
use orchestrator::{ClubDatabase, Mailer, PurchaseOrchestrator, PurchaseRequest};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<D, G, M>
where
    D: ClubDatabase + Clone,
    G: PaymentGateway,
    M: Mailer + Clone + 'static,
{
    pub orchestrator: PurchaseOrchestrator<D, G, M>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct PurchaseRequestBody {
    pub club_id: u32,
    pub purchaser: Purchaser,
    pub package: Package,
    pub instrument: PaymentInstrument,
}

// -- Response types --

#[derive(Serialize)]
pub struct PurchaseResponse {
    pub success: bool,
    pub cust_code: String,
    pub processor: String,
    pub transaction_id: String,
    pub pos_transaction_id: i64,
    pub last4: Option<String>,
}

// -- Handlers --

/// POST /purchases — executes a purchase end to end.
#[tracing::instrument(skip(state, body), fields(club_id = body.club_id))]
pub async fn create<D, G, M>(
    State(state): State<Arc<AppState<D, G, M>>>,
    Json(body): Json<PurchaseRequestBody>,
) -> Result<(axum::http::StatusCode, Json<PurchaseResponse>), ApiError>
where
    D: ClubDatabase + Clone + 'static,
    G: PaymentGateway + 'static,
    M: Mailer + Clone + 'static,
{
    let request = PurchaseRequest {
        club_id: ClubId::new(body.club_id),
        purchaser: body.purchaser,
        package: body.package,
        instrument: body.instrument,
    };

    let receipt = state.orchestrator.purchase(request).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(PurchaseResponse {
            success: true,
            cust_code: receipt.cust_code.to_string(),
            processor: receipt.processor.to_string(),
            transaction_id: receipt.transaction_id,
            pos_transaction_id: receipt.pos_transaction_id,
            last4: receipt.last4,
        }),
    ))
}
