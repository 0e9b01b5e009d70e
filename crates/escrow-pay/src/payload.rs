//! Escrow Pay transaction payload.
//!
//! Field names follow the `/integration/pay/2018-03-31` request schema.

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::checkout::CheckoutRequest;
use crate::constants::{
    FEE_TYPE, INSPECTION_PERIOD_SECS, ITEM_QUANTITY, ITEM_TYPE, REDIRECT_TYPE,
};
use crate::reference::unique_reference;

/// How the buyer side of a transaction is filled in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PartyPolicy {
    /// Two parties when the storefront supplied a buyer email, otherwise the
    /// seller is both payer and beneficiary.
    #[default]
    SelfTransaction,
    /// Refuse checkouts that carry no valid buyer email.
    RequireBuyer,
    /// Fall back to a fixed buyer address that Escrow pre-fills on checkout.
    Placeholder(String),
}

impl PartyPolicy {
    /// Buyer to put on the transaction, if any.
    pub fn resolve_buyer<'a>(&'a self, supplied: Option<&'a str>) -> Option<&'a str> {
        match (supplied, self) {
            (Some(email), _) => Some(email),
            (None, PartyPolicy::Placeholder(email)) => Some(email.as_str()),
            (None, _) => None,
        }
    }

    pub fn requires_buyer(&self) -> bool {
        matches!(self, PartyPolicy::RequireBuyer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscrowTransactionPayload {
    pub currency: String,
    pub description: String,
    pub reference: String,
    pub return_url: String,
    pub redirect_type: String,
    pub items: Vec<Item>,
    pub parties: Vec<Party>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub inspection_period: u64,
    pub quantity: u32,
    pub schedule: Vec<ScheduleEntry>,
    pub fees: Vec<Fee>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub amount: Number,
    pub payer_customer: String,
    pub beneficiary_customer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fee {
    #[serde(rename = "type")]
    pub kind: String,
    pub split: u32,
    pub payer_customer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyRole {
    Buyer,
    Seller,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub role: PartyRole,
    pub customer: String,
    pub agreed: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub initiator: bool,
}

/// Build the outbound transaction for a validated checkout.
///
/// The seller is always the API account (`seller_email`) and always the
/// initiator. `stamp` makes the reference unique per call.
pub fn build_payload(
    request: &CheckoutRequest,
    seller_email: &str,
    policy: &PartyPolicy,
    return_url: &str,
    stamp: u64,
) -> EscrowTransactionPayload {
    let buyer = policy.resolve_buyer(request.buyer_email.as_deref());
    let payer = buyer.unwrap_or(seller_email);
    let description = format!("Sale of {}", request.title);

    let mut parties = Vec::with_capacity(2);
    if let Some(buyer) = buyer {
        parties.push(Party {
            role: PartyRole::Buyer,
            customer: buyer.to_string(),
            agreed: true,
            initiator: false,
        });
    }
    parties.push(Party {
        role: PartyRole::Seller,
        customer: seller_email.to_string(),
        agreed: true,
        initiator: true,
    });

    EscrowTransactionPayload {
        currency: request.currency.clone(),
        description: description.clone(),
        reference: unique_reference(&request.reference, stamp),
        return_url: return_url.to_string(),
        redirect_type: REDIRECT_TYPE.to_string(),
        items: vec![Item {
            title: request.title.clone(),
            description,
            kind: ITEM_TYPE.to_string(),
            inspection_period: INSPECTION_PERIOD_SECS,
            quantity: ITEM_QUANTITY,
            schedule: vec![ScheduleEntry {
                amount: request.price.clone(),
                payer_customer: payer.to_string(),
                beneficiary_customer: seller_email.to_string(),
            }],
            fees: vec![Fee {
                kind: FEE_TYPE.to_string(),
                split: 1,
                payer_customer: payer.to_string(),
            }],
        }],
        parties,
    }
}
