//! reqwest-backed transport

use super::request::ResourceRequest;
use super::transport::Transport;
use crate::error::{ResourceError, Result};
use crate::resource::{ActionDefinition, HttpMethod, ResponseType};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and drops control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|&i| body.is_char_boundary(i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Transport sending requests with a shared reqwest client
///
/// `with_credentials` is not acted on: cookies follow whatever the client
/// passed to [`ReqwestTransport::with_client`] is configured to do.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Option<Url>,
}

impl ReqwestTransport {
    /// Create a transport with a default client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("restweave/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ResourceError::transport)?;

        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client, base_url: None }
    }

    /// Base for request paths that are not absolute URLs
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    fn resolve_url(&self, path: &str) -> Result<Url> {
        match Url::parse(path) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => base.join(path).map_err(ResourceError::transport),
                None => Err(ResourceError::transport(url::ParseError::RelativeUrlWithoutBase)),
            },
            Err(err) => Err(ResourceError::transport(err)),
        }
    }

    async fn execute(&self, req: ResourceRequest) -> Result<Value> {
        let url = self.resolve_url(&req.path)?;
        tracing::debug!("{} {}", req.method, url);

        let mut request = self.client.request(to_reqwest_method(req.method), url);

        for (name, value) in &req.headers {
            request = request.header(name, value);
        }

        if let Some(body) = &req.body {
            request = request.json(body);
        }

        if req.with_credentials {
            tracing::trace!("with_credentials ignored; cookies follow the client configuration");
        }

        let response = request.send().await.map_err(ResourceError::transport)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ResourceError::Status {
                status: status.as_u16(),
                body: sanitize_for_log(&body),
            });
        }

        match req.response_type {
            ResponseType::Json => {
                let body = response.text().await.map_err(ResourceError::transport)?;
                // Handle empty response
                if body.is_empty() {
                    return Ok(Value::Null);
                }
                serde_json::from_str(&body).map_err(ResourceError::transport)
            }
            ResponseType::Text => {
                let body = response.text().await.map_err(ResourceError::transport)?;
                Ok(Value::String(body))
            }
            ResponseType::ArrayBuffer | ResponseType::Blob => {
                let bytes = response.bytes().await.map_err(ResourceError::transport)?;
                Ok(Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()))
            }
        }
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Head => reqwest::Method::HEAD,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, req: ResourceRequest) -> Result<Value> {
        self.execute(req).await
    }

    async fn post(&self, req: ResourceRequest) -> Result<Value> {
        self.execute(req).await
    }

    async fn put(&self, req: ResourceRequest) -> Result<Value> {
        self.execute(req).await
    }

    async fn delete(&self, req: ResourceRequest) -> Result<Value> {
        self.execute(req).await
    }

    async fn patch(&self, req: ResourceRequest) -> Result<Value> {
        self.execute(req).await
    }

    async fn head(&self, req: ResourceRequest) -> Result<Value> {
        self.execute(req).await
    }

    fn resolve_method(&self, action: &ActionDefinition) -> Option<HttpMethod> {
        Some(action.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.ends_with("[truncated, 500 bytes total]"));
    }

    #[test]
    fn test_sanitize_drops_control_characters() {
        assert_eq!(sanitize_for_log("a\nb\tc"), "abc");
    }

    #[test]
    fn test_relative_path_needs_base_url() {
        let transport = ReqwestTransport::with_client(Client::new());
        assert!(transport.resolve_url("/rest/test").is_err());

        let transport = transport.with_base_url(Url::parse("http://localhost:8080").unwrap());
        assert_eq!(
            transport.resolve_url("/rest/test?a=1").unwrap().as_str(),
            "http://localhost:8080/rest/test?a=1"
        );
    }

    #[test]
    fn test_absolute_path_ignores_base_url() {
        let transport = ReqwestTransport::with_client(Client::new())
            .with_base_url(Url::parse("http://localhost:8080").unwrap());
        assert_eq!(
            transport.resolve_url("https://api.example.com/x").unwrap().as_str(),
            "https://api.example.com/x"
        );
    }
}
