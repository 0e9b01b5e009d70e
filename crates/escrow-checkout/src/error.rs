use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use escrow_pay::{EscrowError, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// Non-preflight request from an origin outside the allow-list
    #[error("origin not allowed")]
    OriginForbidden,

    /// Body failed validation
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] ValidationError),

    /// Escrow credentials absent from configuration
    #[error("server misconfigured: missing escrow credentials")]
    ServerMisconfigured,

    /// Anything other than POST/OPTIONS
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Escrow answered with a non-2xx status
    #[error("escrow rejected the transaction ({status})")]
    Upstream { status: u16, detail: String },

    /// Escrow answered 2xx with a body we could not use
    #[error("unexpected escrow response ({status})")]
    UnexpectedResponse { status: u16, detail: String },

    /// The upstream call never completed
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<EscrowError> for CheckoutError {
    fn from(e: EscrowError) -> Self {
        match e {
            EscrowError::Upstream { status, body } => CheckoutError::Upstream {
                status,
                detail: body,
            },
            EscrowError::UnexpectedResponse { status, body } => {
                CheckoutError::UnexpectedResponse {
                    status,
                    detail: body,
                }
            }
            other @ (EscrowError::Transport(_) | EscrowError::ResponseTooLarge { .. }) => {
                CheckoutError::Transport(other.to_string())
            }
        }
    }
}

impl CheckoutError {
    /// Metrics label.
    pub fn outcome(&self) -> &'static str {
        match self {
            CheckoutError::OriginForbidden => "forbidden",
            CheckoutError::InvalidPayload(_) => "invalid_payload",
            CheckoutError::ServerMisconfigured => "misconfigured",
            CheckoutError::MethodNotAllowed(_) => "method_not_allowed",
            CheckoutError::Upstream { .. } => "upstream_error",
            CheckoutError::UnexpectedResponse { .. } => "unexpected_response",
            CheckoutError::Transport(_) => "transport_error",
        }
    }
}

impl ResponseError for CheckoutError {
    fn status_code(&self) -> StatusCode {
        match self {
            CheckoutError::OriginForbidden => StatusCode::FORBIDDEN,
            CheckoutError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            CheckoutError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            CheckoutError::Upstream { .. } | CheckoutError::UnexpectedResponse { .. } => {
                StatusCode::BAD_GATEWAY
            }
            CheckoutError::ServerMisconfigured | CheckoutError::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            CheckoutError::OriginForbidden => {
                tracing::warn!("Rejected checkout from disallowed origin");
                HttpResponse::build(status).json(serde_json::json!({
                    "error": "Forbidden (origin not allowed)"
                }))
            }
            CheckoutError::InvalidPayload(reason) => {
                tracing::warn!("Bad checkout payload: {}", reason);
                HttpResponse::build(status).json(serde_json::json!({
                    "error": "Bad payload"
                }))
            }
            CheckoutError::ServerMisconfigured => {
                tracing::error!("Checkout attempted without ESCROW_EMAIL / ESCROW_API_KEY");
                HttpResponse::build(status).json(serde_json::json!({
                    "error": "Server not configured: missing Escrow credentials"
                }))
            }
            CheckoutError::MethodNotAllowed(method) => {
                tracing::debug!("Method {} not allowed on checkout", method);
                HttpResponse::build(status)
                    .insert_header((header::ALLOW, "POST, OPTIONS"))
                    .json(serde_json::json!({
                        "error": "Method not allowed"
                    }))
            }
            CheckoutError::Upstream {
                status: upstream,
                detail,
            } => HttpResponse::build(status).json(serde_json::json!({
                "error": "Escrow Pay failed",
                "status": upstream,
                "detail": detail
            })),
            CheckoutError::UnexpectedResponse {
                status: upstream,
                detail,
            } => HttpResponse::build(status).json(serde_json::json!({
                "error": "Unexpected response from Escrow",
                "status": upstream,
                "detail": detail
            })),
            CheckoutError::Transport(msg) => {
                tracing::error!("Escrow transport error: {}", msg);
                HttpResponse::build(status).json(serde_json::json!({
                    "error": "Server error"
                }))
            }
        }
    }
}
