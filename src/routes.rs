use crate::handlers::{self, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Request size limit for business endpoints (1MB is far above any applicant profile).
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// The two business endpoints, without rate limiting.
///
/// The binary layers a per-IP governor on top of this router; tests use it bare.
pub fn business_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/consulta-ofertas", post(handlers::consulta_ofertas))
        .route("/formalizar", post(handlers::formalizar))
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)))
}

/// Full application: health check (outside any business layer) plus the given business routes.
pub fn app(state: Arc<AppState>, business: Router<Arc<AppState>>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(business)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
