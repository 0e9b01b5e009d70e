use actix_web::http::Method;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use escrow_pay::{build_payload, CheckoutRequest, EscrowApi, ValidationError};
use serde::Serialize;
use std::time::Instant;

use crate::error::CheckoutError;
use crate::metrics::{CHECKOUT_REQUESTS_TOTAL, ESCROW_CALLS_TOTAL, ESCROW_CALL_LATENCY};
use crate::origin::CorsDecision;
use crate::state::AppState;

pub const CHECKOUT_PATH: &str = "/api/escrow/checkout";

/// Checkout bodies are a handful of fields.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// What the storefront gets back on success.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
    pub transaction_id: String,
    pub token: String,
}

/// ANY /api/escrow/checkout
///
/// The origin decision is taken once up front and applied to whatever
/// response comes out of [`process`], success or error. The body is only
/// read once the request has passed the gate.
pub async fn checkout<E: EscrowApi + 'static>(
    req: HttpRequest,
    body: web::Payload,
    state: web::Data<AppState<E>>,
) -> HttpResponse {
    let cors = state.origin_gate.evaluate(&req);

    let (mut response, outcome) = match process(&req, body, &state, &cors).await {
        Ok(handled) => handled,
        Err(e) => (e.error_response(), e.outcome()),
    };
    CHECKOUT_REQUESTS_TOTAL.with_label_values(&[outcome]).inc();

    cors.apply(&mut response);
    response
}

async fn process<E: EscrowApi>(
    req: &HttpRequest,
    body: web::Payload,
    state: &AppState<E>,
    cors: &CorsDecision,
) -> Result<(HttpResponse, &'static str), CheckoutError> {
    let config = &state.config;
    let credentials = config
        .credentials
        .as_ref()
        .ok_or(CheckoutError::ServerMisconfigured)?;

    if req.method() == Method::OPTIONS {
        return Ok((HttpResponse::NoContent().finish(), "preflight"));
    }
    if !cors.is_allowed() {
        return Err(CheckoutError::OriginForbidden);
    }
    if req.method() != Method::POST {
        return Err(CheckoutError::MethodNotAllowed(req.method().to_string()));
    }

    let body = read_body(body).await?;
    let request = CheckoutRequest::from_json(&body)?;
    if config.party_policy.requires_buyer() && request.buyer_email.is_none() {
        return Err(ValidationError::BuyerRequired.into());
    }

    let payload = build_payload(
        &request,
        &credentials.email,
        &config.party_policy,
        &config.return_url,
        state.stamp.next(),
    );
    tracing::debug!(
        reference = %payload.reference,
        parties = payload.parties.len(),
        "creating escrow transaction"
    );

    let started = Instant::now();
    let result = state.escrow.send(&payload, credentials).await;
    ESCROW_CALL_LATENCY.observe(started.elapsed().as_secs_f64());
    ESCROW_CALLS_TOTAL
        .with_label_values(&[if result.is_ok() { "ok" } else { "error" }])
        .inc();

    let created = result?;
    tracing::info!(
        transaction_id = %created.transaction_id,
        reference = %payload.reference,
        "escrow transaction created"
    );

    Ok((
        HttpResponse::Ok().json(CheckoutResponse {
            url: created.landing_page,
            transaction_id: created.transaction_id,
            token: created.token,
        }),
        "ok",
    ))
}

async fn read_body(body: web::Payload) -> Result<web::Bytes, ValidationError> {
    match body.to_bytes_limited(MAX_BODY_BYTES).await {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err(ValidationError::MalformedBody(e.to_string())),
        Err(_) => Err(ValidationError::BodyTooLarge {
            limit: MAX_BODY_BYTES,
        }),
    }
}

pub fn configure<E: EscrowApi + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route(CHECKOUT_PATH, web::route().to(checkout::<E>));
}
