use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://webservice-homol.facta.com.br";
const DEFAULT_LOGIN_CERTIFICATE: &str = "96676";
const DEFAULT_TIMEOUT_SECS: u64 = 45;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Lender base URL, without trailing slash.
    pub facta_base_url: String,
    /// Full `Authorization` header value for the token exchange (`Basic ...`).
    pub facta_basic_auth: String,
    pub login_certificado: String,
    /// Per-call timeout for every outbound lender request, in seconds.
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            facta_base_url: std::env::var("FACTA_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map_or_else(
                    || validate_base_url(DEFAULT_BASE_URL),
                    |url| validate_base_url(&url),
                )?,
            facta_basic_auth: std::env::var("FACTA_BASIC_AUTH")
                .map_err(|_| anyhow::anyhow!("FACTA_BASIC_AUTH environment variable required"))
                .and_then(|auth| {
                    if auth.trim().is_empty() {
                        anyhow::bail!("FACTA_BASIC_AUTH cannot be empty");
                    }
                    Ok(auth)
                })?,
            login_certificado: std::env::var("LOGIN_CERTIFICADO")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOGIN_CERTIFICATE.to_string()),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT")
                .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("REQUEST_TIMEOUT must be a number of seconds"))
                .and_then(|secs: u64| {
                    if secs == 0 {
                        anyhow::bail!("REQUEST_TIMEOUT must be greater than zero");
                    }
                    Ok(secs)
                })?,
        };

        // Never log the credential itself
        tracing::debug!("FACTA Base URL: {}", config.facta_base_url);
        tracing::debug!("Login certificate: {}", config.login_certificado);
        tracing::debug!("Request timeout: {}s", config.request_timeout_secs);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Checks the scheme and strips trailing slashes so paths can be appended with `format!`.
pub fn validate_base_url(url: &str) -> anyhow::Result<String> {
    let url = url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("FACTA_BASE_URL must start with http:// or https://");
    }
    url::Url::parse(url).map_err(|e| anyhow::anyhow!("FACTA_BASE_URL is invalid: {}", e))?;
    Ok(url.trim_end_matches('/').to_string())
}
