use super::auth::{self, TokenStore};
use super::config::RecoveryBudget;
use super::pool::EndpointPool;
use super::redirect::{RedirectPolicy, RedirectTarget};
use super::request::{OutboundRequest, RequestBody};
use super::response::ApiResponse;
use super::transport::{PreparedRequest, Transport};
use crate::core::{ClientError, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Why a physical attempt is being made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptKind {
    Initial,
    /// After a transport failure moved the cursor
    Rotated,
    /// After a 307 pointed at another origin
    Redirected,
}

impl fmt::Display for AttemptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initial => "initial",
            Self::Rotated => "rotated",
            Self::Redirected => "redirected",
        };
        f.write_str(name)
    }
}

/// Reachability of one configured origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointHealth {
    pub index: usize,
    pub origin: String,
    /// `None` when no response arrived
    pub status: Option<u16>,
}

impl EndpointHealth {
    pub fn is_healthy(&self) -> bool {
        self.status.is_some_and(|s| (200..300).contains(&s))
    }
}

/// Request dispatcher with failure rotation and leader-redirect following
///
/// Every logical request is sent to the pool's current base. A transport
/// failure advances the pool cursor and re-sends the same request; a 307
/// moves the cursor to the `Location` origin and re-sends. Each kind of
/// recovery is limited by the configured `RecoveryBudget`, so the number of
/// physical attempts per call is bounded regardless of pool size.
pub struct FailoverDispatcher {
    pool: Arc<EndpointPool>,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
    budget: RecoveryBudget,
    redirect_policy: RedirectPolicy,
}

impl FailoverDispatcher {
    pub fn new(
        pool: Arc<EndpointPool>,
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            pool,
            transport,
            tokens,
            budget: RecoveryBudget::default(),
            redirect_policy: RedirectPolicy::default(),
        }
    }

    pub fn with_budget(mut self, budget: RecoveryBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_redirect_policy(mut self, policy: RedirectPolicy) -> Self {
        self.redirect_policy = policy;
        self
    }

    pub fn pool(&self) -> &Arc<EndpointPool> {
        &self.pool
    }

    pub fn budget(&self) -> RecoveryBudget {
        self.budget
    }

    /// Send one logical request
    ///
    /// Returns every delivered response unchanged, including 4xx/5xx and a
    /// 307 that could not be followed. Fails with `ClientError::Transport`
    /// only when the last permitted attempt received no response.
    pub async fn request(&self, request: &OutboundRequest) -> Result<ApiResponse> {
        request.validate()?;

        let request_id = Uuid::new_v4().to_string();
        let span = info_span!(
            "api_request",
            method = %request.method,
            path = %request.path,
            request_id = %request_id
        );

        self.run(request, &request_id).instrument(span).await
    }

    /// `request` bounded by a deadline covering every attempt
    pub async fn request_with_deadline(
        &self,
        request: &OutboundRequest,
        deadline: Duration,
    ) -> Result<ApiResponse> {
        tokio::time::timeout(deadline, self.request(request))
            .await
            .map_err(|_| ClientError::DeadlineExceeded(deadline))?
    }

    async fn run(&self, request: &OutboundRequest, request_id: &str) -> Result<ApiResponse> {
        let mut budget = self.budget;
        let mut kind = AttemptKind::Initial;

        loop {
            let base = self.pool.current_base();
            let outcome = self.dispatch(request, &base, request_id, kind).await;

            match outcome {
                Err(err) if err.is_transport() => {
                    if budget.rotations == 0 {
                        warn!(base = %base, error = %err, "transport failure, rotation budget spent");
                        return Err(err);
                    }

                    let (tried, next) = self.pool.rotate();
                    if tried == next {
                        warn!(base = %base, error = %err, "transport failure, no other origin to try");
                        return Err(err);
                    }

                    budget.rotations -= 1;
                    warn!(
                        from = %base,
                        to = %self.pool.current_base(),
                        error = %err,
                        "transport failure, rotating endpoint"
                    );
                    kind = AttemptKind::Rotated;
                }
                Err(err) => return Err(err),
                Ok(response) if response.is_leader_redirect() => {
                    if budget.redirects == 0 {
                        debug!(base = %base, "leader redirect not followed, redirect budget spent");
                        return Ok(response);
                    }

                    let target = match RedirectTarget::from_response(&response, &self.pool) {
                        Ok(target) => target,
                        Err(err) => {
                            warn!(base = %base, error = %err, "ignoring leader redirect");
                            return Ok(response);
                        }
                    };

                    if !target.apply(&self.pool, self.redirect_policy) {
                        warn!(
                            redirect_to = %target.origin(),
                            "leader redirect to unconfigured origin refused"
                        );
                        return Ok(response);
                    }

                    budget.redirects -= 1;
                    match &target {
                        RedirectTarget::Known { index, origin } => {
                            info!(index = *index, origin = %origin, "following leader redirect")
                        }
                        RedirectTarget::AdHoc { origin } => {
                            info!(origin = %origin, "following leader redirect to ad hoc origin")
                        }
                    }
                    kind = AttemptKind::Redirected;
                }
                Ok(response) => return Ok(response),
            }
        }
    }

    async fn dispatch(
        &self,
        request: &OutboundRequest,
        base: &str,
        request_id: &str,
        kind: AttemptKind,
    ) -> Result<ApiResponse> {
        let prepared = self.prepare(request, base, request_id)?;
        debug!(attempt = %kind, url = %prepared.url, "sending request");

        let response = self.transport.send(prepared).await?;
        debug!(attempt = %kind, status = response.status, "response received");
        Ok(response)
    }

    /// Resolve URL, headers and body for one attempt
    pub fn prepare(
        &self,
        request: &OutboundRequest,
        base: &str,
        request_id: &str,
    ) -> Result<PreparedRequest> {
        let mut headers = vec![(
            "Content-Type".to_string(),
            request.default_content_type().to_string(),
        )];
        if let Some(authorization) = auth::bearer(self.tokens.as_ref()) {
            headers.push(("Authorization".to_string(), authorization));
        }
        headers.push((REQUEST_ID_HEADER.to_string(), request_id.to_string()));

        for (name, value) in &request.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        let body = match &request.body {
            RequestBody::Empty => None,
            RequestBody::Json(value) => Some(serde_json::to_vec(value)?),
            RequestBody::Raw { data, .. } => Some(data.clone()),
        };

        let url = request.url(base);
        let origin = super::origin::of_url(&url).unwrap_or_else(|_| base.to_string());

        Ok(PreparedRequest {
            method: request.method.clone(),
            url,
            origin,
            headers,
            body,
        })
    }

    /// GET `<origin>/health` on every configured origin
    ///
    /// Bypasses the API prefix, rotation and redirects; the cursor is not
    /// touched.
    pub async fn probe_health(&self) -> Vec<EndpointHealth> {
        let probes = self
            .pool
            .addresses()
            .iter()
            .enumerate()
            .map(|(index, origin)| self.probe(index, origin));

        futures::future::join_all(probes).await
    }

    async fn probe(&self, index: usize, origin: &str) -> EndpointHealth {
        let request = OutboundRequest::get("/health");
        let request_id = Uuid::new_v4().to_string();

        let status = match self.prepare(&request, origin, &request_id) {
            Ok(prepared) => match self.transport.send(prepared).await {
                Ok(response) => Some(response.status),
                Err(err) => {
                    debug!(origin = %origin, error = %err, "health probe failed");
                    None
                }
            },
            Err(_) => None,
        };

        EndpointHealth {
            index,
            origin: origin.to_string(),
            status,
        }
    }
}
