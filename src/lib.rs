// ============================================================================
// Homebar API client
// ============================================================================

pub mod api;
pub mod connection;
pub mod core;

pub use crate::core::{ClientError, Result};

pub use connection::{
    ApiResponse, ClientConfig, EndpointHealth, EndpointPool, OutboundRequest, PoolSnapshot,
    RecoveryBudget, RedirectPolicy, RequestBody,
    auth::{NoToken, SharedTokenStore, StaticToken, TokenStore},
    failover::FailoverDispatcher,
    transport::{HttpTransport, Transport},
};

pub use reqwest::Method;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// High-level Client API
// ============================================================================

/// Storefront API client with endpoint failover
///
/// The recommended entry point. Callers issue logical requests; which
/// backend node ends up serving them is handled internally by rotating
/// through the configured origins on connection failures and following
/// leader redirects (HTTP 307).
///
/// Cloning is cheap and clones share the endpoint pool.
///
/// # Examples
///
/// ```no_run
/// use homebar_client::{Client, ClientConfig};
///
/// # async fn demo() -> homebar_client::Result<()> {
/// let client = Client::new(ClientConfig::new([
///     "http://localhost:9001",
///     "http://localhost:9002",
/// ]))?;
///
/// let products = client.products().list().await?;
/// println!("{}", products.text());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    dispatcher: Arc<FailoverDispatcher>,
}

impl Client {
    /// Connect with a configuration, unauthenticated
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_token_store(config, Arc::new(NoToken))
    }

    /// Connect using `HOMEBAR_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Connect with a token store supplying the bearer credential
    pub fn with_token_store(config: ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        Self::with_transport(config, transport, tokens)
    }

    /// Connect over a custom transport
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self> {
        config.validate()?;
        let pool = Arc::new(EndpointPool::new(&config.origins, &config.api_prefix)?);
        let dispatcher = FailoverDispatcher::new(pool, transport, tokens)
            .with_budget(config.recovery)
            .with_redirect_policy(config.redirect_policy);

        Ok(Self {
            dispatcher: Arc::new(dispatcher),
        })
    }

    /// Send a logical request
    ///
    /// Non-2xx responses are returned, not converted into errors; use
    /// `ApiResponse::error_for_status` for that.
    pub async fn send(&self, request: &OutboundRequest) -> Result<ApiResponse> {
        self.dispatcher.request(request).await
    }

    /// Send a logical request bounded by a deadline covering all attempts
    pub async fn send_with_deadline(
        &self,
        request: &OutboundRequest,
        deadline: Duration,
    ) -> Result<ApiResponse> {
        self.dispatcher.request_with_deadline(request, deadline).await
    }

    /// Call-shaped form of `send`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use homebar_client::Client;
    /// # use reqwest::Method;
    /// # use serde_json::json;
    /// # async fn demo(client: Client) -> homebar_client::Result<()> {
    /// let resp = client
    ///     .request(Method::PUT, "/orders/7/status", Some(json!({ "status": "ready" })), &[])
    ///     .await?;
    /// assert!(resp.is_success());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        let mut request = OutboundRequest::new(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.send(&request).await
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(&OutboundRequest::get(path)).await
    }

    pub async fn post(&self, path: &str, body: serde_json::Value) -> Result<ApiResponse> {
        self.send(&OutboundRequest::post(path).json(body)).await
    }

    pub async fn put(&self, path: &str, body: serde_json::Value) -> Result<ApiResponse> {
        self.send(&OutboundRequest::put(path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.send(&OutboundRequest::delete(path)).await
    }

    /// Probe `GET /health` on every configured origin
    pub async fn probe_health(&self) -> Vec<EndpointHealth> {
        self.dispatcher.probe_health().await
    }

    /// Endpoint pool, for diagnostics
    pub fn pool(&self) -> &EndpointPool {
        self.dispatcher.pool()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let client = Client::new(ClientConfig::default()).unwrap();
        assert_eq!(client.pool().len(), 3);
        assert_eq!(client.pool().current_base(), "http://localhost:9001/api");
    }

    #[tokio::test]
    async fn test_client_rejects_empty_pool() {
        let result = Client::new(ClientConfig::new(Vec::<String>::new()));
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_client_is_clonable() {
        let client = Client::new(ClientConfig::new(["http://a", "http://b"])).unwrap();
        let other = client.clone();
        other.pool().set_active(1);
        assert_eq!(client.pool().active_index(), 1);
    }
}
