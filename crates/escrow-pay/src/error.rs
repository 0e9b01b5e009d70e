use thiserror::Error;

/// Why a checkout body was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("body is not a JSON object: {0}")]
    MalformedBody(String),

    #[error("title is missing or empty")]
    MissingTitle,

    #[error("price is missing or not a finite number")]
    InvalidPrice,

    #[error("field `{0}` must be a string")]
    WrongType(&'static str),

    #[error("body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("a valid buyerEmail is required")]
    BuyerRequired,
}

/// Errors returned by the Escrow Pay client.
#[derive(Debug, Error)]
pub enum EscrowError {
    /// Escrow answered with a non-2xx status.
    #[error("escrow rejected the transaction ({status}): {body}")]
    Upstream { status: u16, body: String },

    /// Escrow answered 2xx but the body was not the expected JSON.
    #[error("unexpected response from escrow ({status}): {body}")]
    UnexpectedResponse { status: u16, body: String },

    /// The upstream body exceeded the read limit.
    #[error("escrow response too large (max {limit} bytes)")]
    ResponseTooLarge { limit: usize },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),
}

impl EscrowError {
    /// True for failures where Escrow itself answered.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            EscrowError::Upstream { .. } | EscrowError::UnexpectedResponse { .. }
        )
    }
}
