//! Origin whitelist compilation and matching.
//!
//! Allowed origins are exact strings: `http://<host>`, `http://<host>:8006`,
//! `http://0.0.0.0:8006`, plus any configured extras. Anything else gets no
//! CORS grant, which browsers treat as a rejection.

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use datalogger_core::error::{DataLoggerError, Result};

/// Port the console frontend is served from.
pub const CONSOLE_PORT: u16 = 8006;

/// Hostname used when neither config nor environment provide one.
pub const DEFAULT_HOSTNAME: &str = "localhost";

/// Compiled origin whitelist.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed: Vec<HeaderValue>,
}

impl OriginPolicy {
    pub fn new(hostname: &str, extra: &[String]) -> Result<Self> {
        if hostname.is_empty() {
            return Err(DataLoggerError::Config("whitelist hostname is empty".into()));
        }

        let mut raw = vec![
            format!("http://{hostname}"),
            format!("http://{hostname}:{CONSOLE_PORT}"),
            format!("http://0.0.0.0:{CONSOLE_PORT}"),
        ];
        for o in extra {
            // format: "scheme://host[:port]" with no path
            let Some((scheme, rest)) = o.split_once("://") else {
                return Err(DataLoggerError::Config(format!(
                    "invalid extra origin: {o} (expected scheme://host[:port])"
                )));
            };
            if !matches!(scheme, "http" | "https") || rest.is_empty() || rest.contains('/') {
                return Err(DataLoggerError::Config(format!("invalid extra origin: {o}")));
            }
            raw.push(o.clone());
        }
        raw.dedup();

        let allowed = raw
            .iter()
            .map(|s| {
                HeaderValue::from_str(s)
                    .map_err(|_| DataLoggerError::Config(format!("origin is not a valid header: {s}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { allowed })
    }

    /// Hostname from `configured`, else `HOSTNAME`, else `localhost`.
    pub fn resolve_hostname(configured: Option<&str>) -> String {
        configured
            .map(str::to_string)
            .or_else(|| std::env::var("HOSTNAME").ok().filter(|h| !h.is_empty()))
            .unwrap_or_else(|| DEFAULT_HOSTNAME.to_string())
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed.iter().any(|a| a.as_bytes() == origin.as_bytes())
    }

    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().filter_map(|v| v.to_str().ok())
    }

    /// CORS middleware for the ingest endpoint.
    pub fn cors_layer(&self) -> CorsLayer {
        CorsLayer::new()
            .allow_methods([Method::POST])
            .allow_headers([header::CONTENT_TYPE])
            .allow_origin(AllowOrigin::list(self.allowed.iter().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_whitelist() {
        let p = OriginPolicy::new("console.local", &[]).unwrap();
        assert!(p.is_allowed("http://console.local"));
        assert!(p.is_allowed("http://console.local:8006"));
        assert!(p.is_allowed("http://0.0.0.0:8006"));
        assert!(!p.is_allowed("http://console.local:9000"));
        assert!(!p.is_allowed("https://console.local"));
        assert!(!p.is_allowed("http://evil.example"));
    }

    #[test]
    fn extra_origins_are_added() {
        let p = OriginPolicy::new("localhost", &["https://ops.example:8443".into()]).unwrap();
        assert!(p.is_allowed("https://ops.example:8443"));
        assert_eq!(p.origins().count(), 4);
    }

    #[test]
    fn malformed_extra_origin_fails() {
        for bad in ["ops.example", "ftp://ops.example", "http://ops.example/path"] {
            let err = OriginPolicy::new("localhost", &[bad.to_string()]).unwrap_err();
            assert_eq!(err.client_code().as_str(), "BAD_CONFIG", "origin={bad}");
        }
    }

    #[test]
    fn configured_hostname_wins() {
        assert_eq!(OriginPolicy::resolve_hostname(Some("gw-1")), "gw-1");
    }

    #[test]
    fn unconfigured_hostname_uses_env_then_localhost() {
        let expected = std::env::var("HOSTNAME")
            .ok()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOSTNAME.to_string());
        assert_eq!(OriginPolicy::resolve_hostname(None), expected);
    }
}
