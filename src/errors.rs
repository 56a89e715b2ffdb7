use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
///
/// Every variant is terminal for the operation that raised it.
#[derive(Debug, Clone)]
pub enum AppError {
    /// The lender answered with an HTML page (network-edge block) instead of JSON.
    UpstreamBlocked(String),
    /// Structured response received but a field required to proceed is missing or unreadable.
    UpstreamProtocolError(String),
    /// Non-success status or transport failure (connect, timeout) talking to the lender.
    UpstreamUnavailable(String),
    /// The applicant's parameters produced zero candidate rate tables.
    NoEligibleTable(String),
    /// A formalization step answered without its required output field.
    StepFailed {
        /// Step name (`simulate`, `register`, `proposal`).
        step: &'static str,
        /// Raw lender response body, surfaced verbatim.
        body: String,
    },
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    /// Returns the innermost error, skipping any context layers.
    pub fn root(&self) -> &AppError {
        match self {
            AppError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self.root() {
            AppError::UpstreamBlocked(_) => "upstream_blocked",
            AppError::UpstreamProtocolError(_) => "upstream_protocol_error",
            AppError::UpstreamUnavailable(_) => "upstream_unavailable",
            AppError::NoEligibleTable(_) => "no_eligible_table",
            AppError::StepFailed { .. } => "step_failed",
            AppError::InternalError(_) => "internal_error",
            AppError::WithContext { .. } => unreachable!("root() never returns a context layer"),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.root() {
            AppError::UpstreamBlocked(_)
            | AppError::UpstreamProtocolError(_)
            | AppError::UpstreamUnavailable(_)
            | AppError::StepFailed { .. } => StatusCode::BAD_GATEWAY,
            AppError::NoEligibleTable(_) => StatusCode::BAD_REQUEST,
            AppError::InternalError(_) | AppError::WithContext { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::UpstreamBlocked(msg) => write!(
                f,
                "FACTA returned an HTML page (WAF block). Ask for IP allow-listing: {}",
                msg
            ),
            AppError::UpstreamProtocolError(msg) => write!(f, "FACTA protocol error: {}", msg),
            AppError::UpstreamUnavailable(msg) => write!(f, "FACTA unavailable: {}", msg),
            AppError::NoEligibleTable(msg) => write!(f, "No eligible rate table: {}", msg),
            AppError::StepFailed { step, body } => write!(f, "Step '{}' failed: {}", step, body),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Every variant is rendered as `{"status", "error", "detail"}` where `detail`
    /// carries the human-readable message (the raw lender body for step failures).
    fn into_response(self) -> Response {
        let status = self.status_code();
        let kind = self.kind();

        match &self {
            AppError::WithContext { source, context } => {
                // Log full context chain for debugging
                tracing::error!("Error with context: {} -> {}", context, source);
            }
            AppError::UpstreamBlocked(_) => {
                tracing::warn!("Lender request intercepted at network edge: {}", self)
            }
            AppError::NoEligibleTable(_) => {
                tracing::info!("Rejected request: {}", self)
            }
            _ => tracing::error!("{}", self),
        }

        // Clients see the root message; context only goes to the logs
        let detail = self.root().to_string();

        let body = Json(json!({
            "status": status.as_u16(),
            "error": kind,
            "detail": detail,
        }));

        (status, body).into_response()
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    ///
    /// # Arguments
    ///
    /// * `context` - The context message to add.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    ///
    /// # Arguments
    ///
    /// * `f` - A closure that produces the context message.
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}
