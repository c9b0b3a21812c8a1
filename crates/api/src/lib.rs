//! HTTP API server with observability for the purchase system.
//!
//! Provides the purchase endpoint over the orchestrator, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use gateway::{GatewayRouter, InMemoryGateway, PaymentGateway};
use metrics_exporter_prometheus::PrometheusHandle;
use orchestrator::{
    ClubDatabase, InMemoryClubDb, InMemoryMailer, Mailer, PurchaseOrchestrator, StaffDirectory,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::purchases::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<D, G, M>(state: Arc<AppState<D, G, M>>, metrics_handle: PrometheusHandle) -> Router
where
    D: ClubDatabase + Clone + 'static,
    G: PaymentGateway + 'static,
    M: Mailer + Clone + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/purchases", post(routes::purchases::create::<D, G, M>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// The default wiring: an in-memory club database, one in-memory gateway
/// per jurisdiction behind the router, and an in-memory mailer.
pub struct DefaultState {
    pub state: Arc<AppState<InMemoryClubDb, GatewayRouter<InMemoryGateway, InMemoryGateway>, InMemoryMailer>>,
    pub db: InMemoryClubDb,
    pub texas: InMemoryGateway,
    pub tennessee: InMemoryGateway,
    pub mailer: InMemoryMailer,
}

/// Creates the default application state with in-memory services.
pub fn create_default_state(config: &Config) -> DefaultState {
    let db = InMemoryClubDb::new();
    let texas = InMemoryGateway::new("cardlink");
    let tennessee = InMemoryGateway::new("payflex");
    let router = GatewayRouter::new(texas.clone(), tennessee.clone());
    let mailer = InMemoryMailer::new();
    let staff = Arc::new(StaffDirectory::new(
        config.ops_alert_address.clone(),
        config.staff_directory.clone(),
    ));

    let orchestrator = PurchaseOrchestrator::new(
        db.clone(),
        router,
        mailer.clone(),
        staff,
        config.sales_rep.clone(),
    );

    DefaultState {
        state: Arc::new(AppState { orchestrator }),
        db,
        texas,
        tennessee,
        mailer,
    }
}
