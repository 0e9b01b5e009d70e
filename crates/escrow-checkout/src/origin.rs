//! Origin gate for the checkout endpoint.
//!
//! The storefront calls the checkout endpoint straight from the browser, so
//! the `Origin` header is the only caller check. A fixed list of storefront
//! hostnames is matched exactly (https only, ASCII case-insensitive).

use actix_web::http::header::{self, HeaderValue};
use actix_web::{HttpRequest, HttpResponse};

const ALLOW_METHODS: &str = "POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type";
/// Preflight results may be cached for a day.
const MAX_AGE_SECS: &str = "86400";

#[derive(Debug, Clone)]
pub struct OriginGate {
    hosts: Vec<String>,
}

impl OriginGate {
    pub fn new(hosts: &[String]) -> Self {
        Self {
            hosts: hosts.iter().map(|h| h.to_ascii_lowercase()).collect(),
        }
    }

    /// `https://<host>` for a configured host; nothing else matches.
    pub fn is_allowed(&self, origin: &str) -> bool {
        let host = match origin.get(..8) {
            Some(scheme) if scheme.eq_ignore_ascii_case("https://") => &origin[8..],
            _ => return false,
        };
        !host.is_empty() && self.hosts.iter().any(|h| h.eq_ignore_ascii_case(host))
    }

    /// Decide once per request; the decision decorates whatever response
    /// the handler ends up producing.
    pub fn evaluate(&self, req: &HttpRequest) -> CorsDecision {
        let allowed_origin = req
            .headers()
            .get(header::ORIGIN)
            .filter(|value| value.to_str().is_ok_and(|origin| self.is_allowed(origin)))
            .cloned();

        if allowed_origin.is_none() {
            tracing::debug!(
                origin = ?req.headers().get(header::ORIGIN),
                "origin not in allow-list"
            );
        }

        CorsDecision { allowed_origin }
    }
}

/// Outcome of the origin check for a single request.
#[derive(Debug, Clone)]
pub struct CorsDecision {
    allowed_origin: Option<HeaderValue>,
}

impl CorsDecision {
    pub fn is_allowed(&self) -> bool {
        self.allowed_origin.is_some()
    }

    /// Attach the CORS headers when the origin is allowed; leave the
    /// response untouched otherwise.
    pub fn apply(&self, response: &mut HttpResponse) {
        let Some(origin) = &self.allowed_origin else {
            return;
        };
        let headers = response.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        headers.insert(header::VARY, HeaderValue::from_static("Origin"));
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(MAX_AGE_SECS),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn gate() -> OriginGate {
        OriginGate::new(&["domaingrid.com".to_string(), "www.domaingrid.com".to_string()])
    }

    #[test]
    fn test_exact_hosts_allowed() {
        let gate = gate();
        assert!(gate.is_allowed("https://domaingrid.com"));
        assert!(gate.is_allowed("https://www.domaingrid.com"));
        assert!(gate.is_allowed("HTTPS://WWW.DomainGrid.COM"));
    }

    #[test]
    fn test_lookalikes_rejected() {
        let gate = gate();
        for origin in [
            "",
            "null",
            "http://domaingrid.com",
            "https://domaingrid.com/",
            "https://domaingrid.com:443",
            "https://evil-domaingrid.com",
            "https://domaingrid.com.evil.io",
            "https://shop.domaingrid.com",
            "https://",
            "https:/é",
        ] {
            assert!(!gate.is_allowed(origin), "{origin} should be rejected");
        }
    }

    #[test]
    fn test_allowed_decision_sets_headers() {
        let req = TestRequest::default()
            .insert_header(("Origin", "https://domaingrid.com"))
            .to_http_request();
        let decision = gate().evaluate(&req);
        assert!(decision.is_allowed());

        let mut resp = HttpResponse::NoContent().finish();
        decision.apply(&mut resp);
        let headers = resp.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://domaingrid.com"
        );
        assert_eq!(headers.get(header::VARY).unwrap(), "Origin");
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "POST, OPTIONS"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap(),
            "Content-Type"
        );
        assert_eq!(headers.get(header::ACCESS_CONTROL_MAX_AGE).unwrap(), "86400");
    }

    #[test]
    fn test_denied_decision_leaves_response_alone() {
        let req = TestRequest::default()
            .insert_header(("Origin", "https://attacker.example"))
            .to_http_request();
        let decision = gate().evaluate(&req);
        assert!(!decision.is_allowed());

        let mut resp = HttpResponse::Forbidden().finish();
        decision.apply(&mut resp);
        assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert!(resp.headers().get(header::VARY).is_none());
    }

    #[test]
    fn test_missing_origin_is_denied() {
        let req = TestRequest::default().to_http_request();
        assert!(!gate().evaluate(&req).is_allowed());
    }
}
