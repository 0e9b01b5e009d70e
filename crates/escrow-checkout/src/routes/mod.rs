pub mod checkout;
pub mod metrics;
pub mod status;

use actix_web::web;
use escrow_pay::EscrowApi;

/// Mount every route; `E` is the Escrow client held in [`crate::AppState`].
pub fn configure<E: EscrowApi + 'static>(cfg: &mut web::ServiceConfig) {
    status::configure(cfg);
    metrics::configure::<E>(cfg);
    checkout::configure::<E>(cfg);
}
