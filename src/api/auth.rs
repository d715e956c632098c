use crate::{ApiResponse, Client, OutboundRequest, Result};
use serde_json::{Value, json};

/// `/auth`
pub struct AuthApi<'a> {
    client: &'a Client,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn register(&self, user: Value) -> Result<ApiResponse> {
        self.client
            .send(&OutboundRequest::post("/auth/register").json(user))
            .await
    }

    /// The response body carries the token to put into the token store.
    pub async fn login(&self, email: &str, password: &str) -> Result<ApiResponse> {
        let body = json!({ "email": email, "password": password });
        self.client
            .send(&OutboundRequest::post("/auth/login").json(body))
            .await
    }
}
