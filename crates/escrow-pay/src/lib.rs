//! Escrow.com Pay integration for the DomainGrid storefront.
//!
//! Turns a storefront checkout request into an Escrow Pay transaction and
//! relays the resulting landing page back to the caller.
//!
//! # Pipeline
//!
//! - [`CheckoutRequest::from_json`]: validates the inbound checkout body
//! - [`build_payload`]: maps a validated request onto the Escrow Pay schema
//! - [`EscrowApi::send`]: performs the single authenticated upstream call
//!
//! [`EscrowPayClient`] is the reqwest-backed [`EscrowApi`] implementation.

pub mod checkout;
pub mod client;
pub mod constants;
pub mod error;
pub mod payload;
pub mod reference;

pub use checkout::CheckoutRequest;
pub use client::{EscrowApi, EscrowCredentials, EscrowPayClient, EscrowResponse};
pub use constants::EscrowEnvironment;
pub use error::{EscrowError, ValidationError};
pub use payload::{build_payload, EscrowTransactionPayload, PartyPolicy};
pub use reference::{unique_reference, ReferenceStamp};
