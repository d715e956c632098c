use super::config::ClientConfig;
use super::response::ApiResponse;
use crate::core::{ClientError, Result};
use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{HeaderName, HeaderValue};

/// A fully resolved physical attempt
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    /// Origin the URL points at, for errors and logs
    pub origin: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// The network seam under the dispatcher
///
/// `send` returns `Ok` for every response the network delivered, including
/// 3xx, 4xx and 5xx. It returns `ClientError::Transport` only when no
/// response was received.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: PreparedRequest) -> Result<ApiResponse>;
}

/// `reqwest` backed transport
///
/// Redirect following is disabled so that 307 responses reach the redirect
/// follower instead of being chased by the HTTP stack.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(config.user_agent.as_str());

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an existing client; it must not follow redirects itself
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn build(&self, request: &PreparedRequest) -> Result<reqwest::RequestBuilder> {
        let mut builder = self.client.request(request.method.clone(), request.url.as_str());

        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ClientError::InvalidRequest(format!("header '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                ClientError::InvalidRequest(format!("header '{}': {}", name.as_str(), e))
            })?;
            builder = builder.header(name, value);
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        Ok(builder)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: PreparedRequest) -> Result<ApiResponse> {
        let builder = self.build(&request)?;
        let origin = request.origin;

        let response = builder
            .send()
            .await
            .map_err(|e| classify(&origin, e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();

        // A body cut off mid-stream is not a delivered response.
        let body = response
            .bytes()
            .await
            .map_err(|e| classify(&origin, e))?
            .to_vec();

        Ok(ApiResponse::new(status, headers, body).served_by(origin))
    }
}

fn classify(origin: &str, err: reqwest::Error) -> ClientError {
    if err.is_builder() {
        return ClientError::InvalidRequest(err.to_string());
    }

    let kind = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };

    ClientError::Transport {
        origin: origin.to_string(),
        message: format!("{}: {}", kind, err),
    }
}
