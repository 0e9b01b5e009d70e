use std::fmt;
use std::str::FromStr;

/// Escrow Pay endpoint on the production API.
pub const PRODUCTION_PAY_URL: &str = "https://api.escrow.com/integration/pay/2018-03-31";

/// Escrow Pay endpoint on the sandbox API.
pub const SANDBOX_PAY_URL: &str = "https://api.escrow-sandbox.com/integration/pay/2018-03-31";

/// Where Escrow sends the buyer once the checkout completes.
pub const DEFAULT_RETURN_URL: &str = "https://domaingrid.com/thank-you";

/// Reference used when the storefront sends none.
pub const DEFAULT_REFERENCE: &str = "order";

/// Currency used when the storefront sends none.
pub const DEFAULT_CURRENCY: &str = "usd";

/// Base references are cut to this many characters before stamping.
pub const MAX_REFERENCE_CHARS: usize = 40;

/// Every listing sold through the storefront is a domain name.
pub const ITEM_TYPE: &str = "domain_name";

/// Three days, in seconds.
pub const INSPECTION_PERIOD_SECS: u64 = 259_200;

pub const ITEM_QUANTITY: u32 = 1;

pub const REDIRECT_TYPE: &str = "automatic";

/// Fee type billed on every transaction.
pub const FEE_TYPE: &str = "escrow";

/// Which Escrow API the deployment talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscrowEnvironment {
    #[default]
    Production,
    Sandbox,
}

impl EscrowEnvironment {
    pub fn pay_url(self) -> &'static str {
        match self {
            EscrowEnvironment::Production => PRODUCTION_PAY_URL,
            EscrowEnvironment::Sandbox => SANDBOX_PAY_URL,
        }
    }
}

impl fmt::Display for EscrowEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscrowEnvironment::Production => f.write_str("production"),
            EscrowEnvironment::Sandbox => f.write_str("sandbox"),
        }
    }
}

impl FromStr for EscrowEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(EscrowEnvironment::Production),
            "sandbox" => Ok(EscrowEnvironment::Sandbox),
            other => Err(format!("unknown escrow environment: {other}")),
        }
    }
}
