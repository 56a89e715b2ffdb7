use crate::config::Config;
use crate::errors::AppError;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde_json::Value;

const CLIENT_USER_AGENT: &str = "helena-facta-api/1.0";

pub const TOKEN_PATH: &str = "/gera-token";
pub const OFFERS_PATH: &str = "/consignado-trabalhador/consulta-ofertas";
pub const AVAILABLE_OPERATIONS_PATH: &str = "/proposta/operacoes-disponiveis";

/// True when a content type announces an HTML page.
///
/// The lender API only speaks JSON; HTML means a network-edge layer (WAF)
/// answered instead of the application.
pub fn is_html_content_type(content_type: &str) -> bool {
    content_type
        .trim_start()
        .to_ascii_lowercase()
        .starts_with("text/html")
}

/// Status and raw body of a lender response that passed the HTML check.
#[derive(Debug, Clone)]
pub struct LenderReply {
    pub status: StatusCode,
    pub body: String,
}

impl LenderReply {
    /// Parses the body as JSON, if it is JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Client for the FACTA lender API.
///
/// Holds no per-operation state: the bearer token is passed into every call
/// so each inbound request works with its own freshly acquired token.
#[derive(Clone)]
pub struct FactaClient {
    client: reqwest::Client,
    base_url: String,
    basic_auth: String,
}

impl FactaClient {
    /// Creates a new `FactaClient`.
    ///
    /// # Arguments
    ///
    /// * `config` - Provides the base URL, the pre-shared credential and the per-call timeout.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to create FACTA client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.facta_base_url.trim_end_matches('/').to_string(),
            basic_auth: config.facta_basic_auth.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Rejects HTML answers and reads the body of everything else.
    async fn read_reply(response: reqwest::Response, what: &str) -> Result<LenderReply, AppError> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if is_html_content_type(&content_type) {
            tracing::warn!("{} answered with HTML ({}), status {}", what, content_type, status);
            return Err(AppError::UpstreamBlocked(format!(
                "{} returned '{}'",
                what, content_type
            )));
        }

        let body = response.text().await.map_err(|e| {
            AppError::UpstreamUnavailable(format!("Failed to read {} response: {}", what, e))
        })?;

        Ok(LenderReply { status, body })
    }

    /// Exchanges the pre-shared credential for a bearer token.
    ///
    /// # Returns
    ///
    /// * `Result<String, AppError>` - The token, or `UpstreamBlocked` / `UpstreamUnavailable` /
    ///   `UpstreamProtocolError` depending on how the exchange failed.
    pub async fn acquire_token(&self) -> Result<String, AppError> {
        let url = self.url(TOKEN_PATH);
        tracing::info!("Requesting FACTA token: {}", url);

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, &self.basic_auth)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("Token request failed: {}", e)))?;

        let reply = Self::read_reply(response, "Token endpoint").await?;

        if !reply.status.is_success() {
            return Err(AppError::UpstreamUnavailable(format!(
                "Token endpoint returned {}: {}",
                reply.status, reply.body
            )));
        }

        let body = reply.json().ok_or_else(|| {
            AppError::UpstreamProtocolError(format!("Token response is not JSON: {}", reply.body))
        })?;

        match body.get("token").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => {
                tracing::info!("✓ FACTA token acquired");
                Ok(token.to_string())
            }
            _ => Err(AppError::UpstreamProtocolError(format!(
                "Token response has no token: {}",
                body
            ))),
        }
    }

    /// Looks up the offers available for a canonical CPF.
    pub async fn fetch_offers(&self, token: &str, cpf: &str) -> Result<Value, AppError> {
        let url = self.url(OFFERS_PATH);
        tracing::info!("Fetching FACTA offers for CPF {}", cpf);

        let response = self
            .client
            .get(&url)
            .query(&[("cpf", cpf)])
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("Offer lookup failed: {}", e)))?;

        let reply = Self::read_reply(response, "Offer lookup").await?;
        if !reply.status.is_success() {
            tracing::warn!("Offer lookup returned {}: {}", reply.status, reply.body);
        }

        reply.json().ok_or_else(|| {
            AppError::UpstreamProtocolError(format!("Offer lookup is not JSON: {}", reply.body))
        })
    }

    /// Queries the rate tables available for the given operation parameters.
    pub async fn fetch_available_operations(
        &self,
        token: &str,
        params: &[(&str, String)],
    ) -> Result<Value, AppError> {
        let url = self.url(AVAILABLE_OPERATIONS_PATH);
        tracing::info!("Fetching FACTA available operations");

        let response = self
            .client
            .get(&url)
            .query(params)
            .bearer_auth(token)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .await
            .map_err(|e| {
                AppError::UpstreamUnavailable(format!("Available-operations lookup failed: {}", e))
            })?;

        let reply = Self::read_reply(response, "Available-operations lookup").await?;
        if !reply.status.is_success() {
            tracing::warn!(
                "Available-operations lookup returned {}: {}",
                reply.status,
                reply.body
            );
        }

        reply.json().ok_or_else(|| {
            AppError::UpstreamProtocolError(format!(
                "Available-operations lookup is not JSON: {}",
                reply.body
            ))
        })
    }

    /// Posts a form-encoded body to a formalization step.
    ///
    /// Only transport failures and HTML blocks are errors here; interpreting
    /// the reply is left to the caller, which knows which field the step must produce.
    pub async fn post_form(
        &self,
        token: &str,
        path: &str,
        form: &[(String, String)],
    ) -> Result<LenderReply, AppError> {
        let url = self.url(path);
        tracing::info!("POST {} ({} fields)", path, form.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("POST {} failed: {}", path, e)))?;

        Self::read_reply(response, path).await
    }
}
