use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;

use crate::error::NamecardError;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// JSON-over-HTTP transport rooted at an API base URL.
///
/// Request paths are appended to the base URL, so a base of
/// `https://api.example.com/api/v1` and a path of `/user/me` resolve to
/// `https://api.example.com/api/v1/user/me`.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Create a new HTTP transport.
    ///
    /// Rejects cleartext `http://` URLs unless `allow_http` is `true`.
    pub fn new(
        base_url: &str,
        headers: &HashMap<String, String>,
        allow_http: bool,
        timeout: Option<Duration>,
    ) -> Result<Self, NamecardError> {
        let url = Url::parse(base_url)
            .map_err(|e| invalid_config(format!("Invalid base URL '{base_url}': {e}")))?;

        match url.scheme() {
            "https" => {}
            "http" if allow_http => {}
            "http" => {
                return Err(invalid_config(format!(
                    "Cleartext HTTP is not allowed for '{base_url}'. \
                     Use https:// or set \"allowHttp\": true in the profile."
                )));
            }
            scheme => {
                return Err(invalid_config(format!(
                    "Unsupported URL scheme '{scheme}' in '{base_url}'"
                )));
            }
        }

        let mut header_map = HeaderMap::new();
        header_map.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        header_map.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );

        for (key, value) in headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| invalid_config(format!("Invalid header name '{key}': {e}")))?;
            let val = HeaderValue::from_str(value)
                .map_err(|e| invalid_config(format!("Invalid header value for '{key}': {e}")))?;
            header_map.insert(name, val);
        }

        let mut builder = reqwest::Client::builder().default_headers(header_map);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| NamecardError::TransportError(Box::new(e)))?;

        Ok(Self {
            client,
            base_url: url,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Resolve a request path (or an absolute URL) plus query pairs.
    pub fn url_for(&self, path: &str, query: &[(String, String)]) -> Result<Url, NamecardError> {
        let joined = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!(
                "{}/{}",
                self.base_url.as_str().trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        };
        let mut url = Url::parse(&joined).map_err(|e| {
            NamecardError::InvalidArgument(format!("Cannot build URL for '{path}': {e}"))
        })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, NamecardError> {
        let url = self.url_for(&request.path, &request.query)?;
        tracing::debug!(method = %request.method, %url, "dispatching request");

        let mut http_req = self.client.request(request.method.clone(), url);
        for (name, value) in &request.headers {
            http_req = http_req.header(name.as_str(), value.as_str());
        }
        if let Some(ref body) = request.body {
            http_req = http_req.json(body);
        }

        let response = http_req
            .send()
            .await
            .map_err(|e| NamecardError::TransportError(Box::new(e)))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| NamecardError::TransportError(Box::new(e)))?;

        Ok(ApiResponse::new(status, parse_body(&text)))
    }
}

fn parse_body(text: &str) -> serde_json::Value {
    if text.trim().is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_string()))
}

fn invalid_config(detail: String) -> NamecardError {
    NamecardError::ConfigError {
        path: std::path::PathBuf::from("<profile>"),
        detail,
    }
}
