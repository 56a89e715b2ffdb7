use crate::config::Config;
use crate::errors::AppError;
use crate::facta_client::FactaClient;
use crate::formalization::Formalizer;
use crate::models::*;
use crate::offers::query_offers;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
///
/// Read-only for the process lifetime; every request works with its own
/// token and workflow state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the FACTA lender API.
    pub facta: FactaClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let facta = FactaClient::new(&config)?;
        Ok(Self { config, facta })
    }
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "ok": true })))
}

/// POST /consulta-ofertas
///
/// Looks up the offers available for a borrower.
pub async fn consulta_ofertas(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ConsultaRequest>,
) -> Result<Json<ConsultaResponse>, AppError> {
    tracing::info!(
        "POST /consulta-ofertas - canal: {:?}, origem: {:?}, contato: {:?}",
        body.canal,
        body.origem,
        body.id_contato
    );

    let result = query_offers(&state.facta, &body).await?;

    Ok(Json(ConsultaResponse::from(result)))
}

/// POST /formalizar
///
/// Runs the full formalization workflow and returns the proposal code and
/// the signing URL.
pub async fn formalizar(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FormalizarRequest>,
) -> Result<Json<FormalizarResponse>, AppError> {
    tracing::info!(
        "POST /formalizar - prazo: {}, opcao_valor: {}",
        body.prazo,
        body.opcao_valor
    );

    let formalizer = Formalizer::new(&state.facta, &state.config);
    let result = formalizer.formalize(&body).await?;

    tracing::info!("Formalization complete: proposal {}", result.proposal_code);
    Ok(Json(FormalizarResponse::from(result)))
}
