use crate::config::CheckoutConfig;
use crate::origin::OriginGate;
use escrow_pay::{EscrowError, EscrowPayClient, ReferenceStamp};
use std::sync::Arc;

/// Shared application state
pub struct AppState<E = EscrowPayClient> {
    pub config: Arc<CheckoutConfig>,
    pub origin_gate: OriginGate,
    pub escrow: Arc<E>,
    /// Keeps outbound references unique within the process
    pub stamp: ReferenceStamp,
}

impl AppState<EscrowPayClient> {
    pub fn new(config: CheckoutConfig) -> Result<Self, EscrowError> {
        let client = EscrowPayClient::new(config.api_url.clone(), config.timeout)?;
        Ok(Self::with_client(config, Arc::new(client)))
    }
}

impl<E> AppState<E> {
    pub fn with_client(config: CheckoutConfig, escrow: Arc<E>) -> Self {
        let origin_gate = OriginGate::new(&config.allowed_origin_hosts);
        Self {
            config: Arc::new(config),
            origin_gate,
            escrow,
            stamp: ReferenceStamp::new(),
        }
    }
}
