use escrow_pay::checkout::is_email_shaped;
use escrow_pay::constants::DEFAULT_RETURN_URL;
use escrow_pay::{EscrowCredentials, EscrowEnvironment, PartyPolicy};
use std::env;
use std::time::Duration;
use url::Url;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ALLOWED_HOSTS: &[&str] = &["domaingrid.com", "www.domaingrid.com"];

#[derive(Clone)]
pub struct CheckoutConfig {
    /// Escrow API account (None = every checkout answers 500)
    pub credentials: Option<EscrowCredentials>,
    /// Production or sandbox
    pub environment: EscrowEnvironment,
    /// Create-transaction endpoint, fixed for the deployment
    pub api_url: Url,
    /// Where Escrow returns the buyer after checkout
    pub return_url: String,
    /// Buyer/seller resolution when the storefront sends no buyer email
    pub party_policy: PartyPolicy,
    /// Outbound request timeout
    pub timeout: Duration,
    /// Storefront hostnames allowed to call the checkout endpoint (lowercase)
    pub allowed_origin_hosts: Vec<String>,
    /// Server port
    pub port: u16,
    /// Bearer token required for /metrics (None = public)
    pub metrics_token: Option<String>,
}

impl std::fmt::Debug for CheckoutConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutConfig")
            .field("credentials", &self.credentials)
            .field("environment", &self.environment)
            .field("api_url", &self.api_url.as_str())
            .field("return_url", &self.return_url)
            .field("party_policy", &self.party_policy)
            .field("timeout", &self.timeout)
            .field("allowed_origin_hosts", &self.allowed_origin_hosts)
            .field("port", &self.port)
            .field(
                "metrics_token",
                &self.metrics_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl CheckoutConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        // Missing credentials are reported per request, not at start-up
        let credentials = match (var("ESCROW_EMAIL"), var("ESCROW_API_KEY")) {
            (Some(email), Some(api_key)) => Some(EscrowCredentials::new(email, api_key)),
            _ => {
                tracing::warn!(
                    "ESCROW_EMAIL / ESCROW_API_KEY not set, checkout requests will fail with 500"
                );
                None
            }
        };

        let environment = match var("ESCROW_ENVIRONMENT") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                var: "ESCROW_ENVIRONMENT",
                value,
            })?,
            None => EscrowEnvironment::default(),
        };

        let api_url_str = var("ESCROW_API_URL").unwrap_or_else(|| environment.pay_url().to_string());
        let api_url = Url::parse(&api_url_str).map_err(|_| ConfigError::InvalidUrl(api_url_str))?;

        let return_url = var("ESCROW_RETURN_URL").unwrap_or_else(|| DEFAULT_RETURN_URL.to_string());
        Url::parse(&return_url).map_err(|_| ConfigError::InvalidUrl(return_url.clone()))?;

        let party_policy = parse_party_policy(
            var("ESCROW_BUYER_POLICY").as_deref(),
            var("ESCROW_PLACEHOLDER_BUYER"),
        )?;

        let timeout = match var("ESCROW_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "ESCROW_TIMEOUT_SECS",
                        value,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let allowed_origin_hosts = match var("ALLOWED_ORIGIN_HOSTS") {
            Some(value) => parse_allowed_hosts(&value)?,
            None => DEFAULT_ALLOWED_HOSTS.iter().map(|h| h.to_string()).collect(),
        };

        let port = var("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let metrics_token = var("METRICS_TOKEN");
        if metrics_token.is_none() {
            tracing::warn!("METRICS_TOKEN not set, /metrics endpoint is publicly accessible");
        }

        Ok(Self {
            credentials,
            environment,
            api_url,
            return_url,
            party_policy,
            timeout,
            allowed_origin_hosts,
            port,
            metrics_token,
        })
    }
}

fn parse_party_policy(
    policy: Option<&str>,
    placeholder: Option<String>,
) -> Result<PartyPolicy, ConfigError> {
    match policy.map(str::to_ascii_lowercase).as_deref() {
        None | Some("self") => Ok(PartyPolicy::SelfTransaction),
        Some("require") => Ok(PartyPolicy::RequireBuyer),
        Some("placeholder") => {
            let email =
                placeholder.ok_or(ConfigError::MissingRequired("ESCROW_PLACEHOLDER_BUYER"))?;
            if !is_email_shaped(&email) {
                return Err(ConfigError::InvalidValue {
                    var: "ESCROW_PLACEHOLDER_BUYER",
                    value: email,
                });
            }
            Ok(PartyPolicy::Placeholder(email))
        }
        Some(other) => Err(ConfigError::InvalidValue {
            var: "ESCROW_BUYER_POLICY",
            value: other.to_string(),
        }),
    }
}

/// Comma-separated bare hostnames; wildcards, schemes and ports are refused.
fn parse_allowed_hosts(raw: &str) -> Result<Vec<String>, ConfigError> {
    let hosts: Vec<String> = raw
        .split(',')
        .map(|h| h.trim().to_ascii_lowercase())
        .filter(|h| !h.is_empty())
        .collect();

    if let Some(bad) = hosts
        .iter()
        .find(|h| h.contains('*') || h.contains('/') || h.contains(':'))
    {
        tracing::error!(
            "ALLOWED_ORIGIN_HOSTS takes exact storefront hostnames (e.g. domaingrid.com), got '{}'",
            bad
        );
        return Err(ConfigError::InvalidValue {
            var: "ALLOWED_ORIGIN_HOSTS",
            value: bad.clone(),
        });
    }
    if hosts.is_empty() {
        return Err(ConfigError::InvalidValue {
            var: "ALLOWED_ORIGIN_HOSTS",
            value: raw.to_string(),
        });
    }
    Ok(hosts)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),

    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<CheckoutConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CheckoutConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert!(config.credentials.is_none());
        assert_eq!(config.environment, EscrowEnvironment::Production);
        assert_eq!(
            config.api_url.as_str(),
            "https://api.escrow.com/integration/pay/2018-03-31"
        );
        assert_eq!(config.return_url, "https://domaingrid.com/thank-you");
        assert_eq!(config.party_policy, PartyPolicy::SelfTransaction);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(
            config.allowed_origin_hosts,
            vec!["domaingrid.com", "www.domaingrid.com"]
        );
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_credentials_need_both_values() {
        let config = load(&[("ESCROW_EMAIL", "seller@domaingrid.com")]).unwrap();
        assert!(config.credentials.is_none());

        let config = load(&[
            ("ESCROW_EMAIL", "seller@domaingrid.com"),
            ("ESCROW_API_KEY", "  "),
        ])
        .unwrap();
        assert!(config.credentials.is_none());

        let config = load(&[
            ("ESCROW_EMAIL", "seller@domaingrid.com"),
            ("ESCROW_API_KEY", "key"),
        ])
        .unwrap();
        let creds = config.credentials.unwrap();
        assert_eq!(creds.email, "seller@domaingrid.com");
        assert_eq!(creds.api_key, "key");
    }

    #[test]
    fn test_sandbox_selects_sandbox_url() {
        let config = load(&[("ESCROW_ENVIRONMENT", "sandbox")]).unwrap();
        assert_eq!(
            config.api_url.as_str(),
            "https://api.escrow-sandbox.com/integration/pay/2018-03-31"
        );
    }

    #[test]
    fn test_explicit_api_url_wins() {
        let config = load(&[
            ("ESCROW_ENVIRONMENT", "sandbox"),
            ("ESCROW_API_URL", "http://127.0.0.1:9000/pay"),
        ])
        .unwrap();
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:9000/pay");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            load(&[("ESCROW_ENVIRONMENT", "staging")]),
            Err(ConfigError::InvalidValue { var: "ESCROW_ENVIRONMENT", .. })
        ));
        assert!(matches!(
            load(&[("ESCROW_API_URL", "not a url")]),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            load(&[("ESCROW_TIMEOUT_SECS", "0")]),
            Err(ConfigError::InvalidValue { var: "ESCROW_TIMEOUT_SECS", .. })
        ));
    }

    #[test]
    fn test_party_policies() {
        let config = load(&[("ESCROW_BUYER_POLICY", "require")]).unwrap();
        assert_eq!(config.party_policy, PartyPolicy::RequireBuyer);

        let config = load(&[
            ("ESCROW_BUYER_POLICY", "placeholder"),
            ("ESCROW_PLACEHOLDER_BUYER", "example@domaingrid.com"),
        ])
        .unwrap();
        assert_eq!(
            config.party_policy,
            PartyPolicy::Placeholder("example@domaingrid.com".to_string())
        );

        assert!(matches!(
            load(&[("ESCROW_BUYER_POLICY", "placeholder")]),
            Err(ConfigError::MissingRequired("ESCROW_PLACEHOLDER_BUYER"))
        ));
        assert!(matches!(
            load(&[("ESCROW_BUYER_POLICY", "whoever")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_allowed_hosts_parsing() {
        let config = load(&[(
            "ALLOWED_ORIGIN_HOSTS",
            "DomainGrid.com, www.domaingrid.com ,domaingrid.webflow.io",
        )])
        .unwrap();
        assert_eq!(
            config.allowed_origin_hosts,
            vec!["domaingrid.com", "www.domaingrid.com", "domaingrid.webflow.io"]
        );

        for bad in ["*", "https://domaingrid.com", "domaingrid.com:8443", " , "] {
            assert!(
                load(&[("ALLOWED_ORIGIN_HOSTS", bad)]).is_err(),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&[
            ("ESCROW_EMAIL", "seller@domaingrid.com"),
            ("ESCROW_API_KEY", "very-secret-key"),
            ("METRICS_TOKEN", "metrics-secret"),
        ])
        .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret-key"));
        assert!(!debug.contains("metrics-secret"));
    }
}
