use crate::config::ConfigError;
use axum::http::HeaderMap;

/// The application base URI a request was made against, used to build
/// absolute activation links. Derived from request headers on the HTTP
/// path, or supplied explicitly by operator tooling.
#[derive(Debug, Clone)]
pub struct RequestContext {
    base_uri: String,
}

impl RequestContext {
    /// Validates and normalizes an explicit base URI. A trailing slash is
    /// stripped so the activation path can be appended verbatim.
    pub fn new(base_uri: &str) -> Result<Self, ConfigError> {
        let rest = base_uri
            .strip_prefix("https://")
            .or_else(|| base_uri.strip_prefix("http://"))
            .ok_or_else(|| {
                ConfigError::Invalid(
                    "base URI",
                    format!("expected http(s) scheme, got {base_uri:?}"),
                )
            })?;

        let host = rest.split('/').next().unwrap_or_default();
        if host.is_empty() || host.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid(
                "base URI",
                format!("missing or malformed host in {base_uri:?}"),
            ));
        }

        Ok(Self {
            base_uri: base_uri.trim_end_matches('/').to_string(),
        })
    }

    /// Derives the base URI from the `Host` header, honoring
    /// `X-Forwarded-Proto` and `X-Forwarded-Prefix` set by a reverse proxy.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ConfigError> {
        let host = headers
            .get(axum::http::header::HOST)
            .ok_or(ConfigError::Missing("Host header"))?
            .to_str()
            .map_err(|e| ConfigError::Invalid("Host header", e.to_string()))?;

        let scheme = match headers.get("x-forwarded-proto") {
            Some(value) => {
                let proto = value
                    .to_str()
                    .map_err(|e| ConfigError::Invalid("X-Forwarded-Proto", e.to_string()))?;
                match proto {
                    "http" | "https" => proto,
                    other => {
                        return Err(ConfigError::Invalid(
                            "X-Forwarded-Proto",
                            other.to_string(),
                        ))
                    }
                }
            }
            None => "http",
        };

        let prefix = match headers.get("x-forwarded-prefix") {
            Some(value) => value
                .to_str()
                .map_err(|e| ConfigError::Invalid("X-Forwarded-Prefix", e.to_string()))?,
            None => "",
        };

        Self::new(&format!("{scheme}://{host}{prefix}"))
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn accepts_https_base_uri_and_strips_trailing_slash() {
        let ctx = RequestContext::new("https://example.org/app/").unwrap();
        assert_eq!(ctx.base_uri(), "https://example.org/app");
    }

    #[test]
    fn rejects_unknown_scheme() {
        assert!(RequestContext::new("ftp://example.org").is_err());
    }

    #[test]
    fn rejects_missing_host() {
        assert!(RequestContext::new("https://").is_err());
        assert!(RequestContext::new("https:///app").is_err());
    }

    #[test]
    fn derives_base_uri_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::HOST, HeaderValue::from_static("example.org"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        headers.insert("x-forwarded-prefix", HeaderValue::from_static("/app"));

        let ctx = RequestContext::from_headers(&headers).unwrap();
        assert_eq!(ctx.base_uri(), "https://example.org/app");
    }

    #[test]
    fn defaults_to_http_without_forwarded_proto() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::HOST,
            HeaderValue::from_static("localhost:3000"),
        );

        let ctx = RequestContext::from_headers(&headers).unwrap();
        assert_eq!(ctx.base_uri(), "http://localhost:3000");
    }

    #[test]
    fn missing_host_header_is_an_error() {
        let headers = HeaderMap::new();
        assert!(matches!(
            RequestContext::from_headers(&headers),
            Err(ConfigError::Missing("Host header"))
        ));
    }
}
