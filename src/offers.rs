use crate::errors::{AppError, ResultExt};
use crate::facta_client::FactaClient;
use crate::models::{ConsultaRequest, OfferQueryResult};
use crate::normalizer::{canonical_cpf, extract_offers};

/// Looks up the loan offers available to a borrower.
///
/// Acquires a fresh token, queries the lender with the canonical CPF and
/// normalizes whatever offer list comes back. Zero offers is a successful
/// answer, not an error.
///
/// # Arguments
///
/// * `client` - FACTA client.
/// * `request` - Borrower identity as received from Helena.
pub async fn query_offers(
    client: &FactaClient,
    request: &ConsultaRequest,
) -> Result<OfferQueryResult, AppError> {
    let token = client
        .acquire_token()
        .await
        .context("offer query: token exchange")?;

    let cpf = canonical_cpf(&request.cpf);
    let body = client
        .fetch_offers(&token, &cpf)
        .await
        .with_context(|| format!("offer query for CPF {}", cpf))?;

    let offers = extract_offers(&body);
    tracing::info!("Found {} offer(s) for CPF {}", offers.len(), cpf);

    Ok(OfferQueryResult { cpf, offers })
}
