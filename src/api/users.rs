use crate::{ApiResponse, Client, Result};
use serde_json::Value;

/// `/users/me`
pub struct UsersApi<'a> {
    client: &'a Client,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn profile(&self) -> Result<ApiResponse> {
        self.client.get("/users/me").await
    }

    pub async fn update_profile(&self, profile: Value) -> Result<ApiResponse> {
        self.client.put("/users/me", profile).await
    }
}

/// `/cart`
pub struct CartApi<'a> {
    client: &'a Client,
}

impl<'a> CartApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn checkout(&self, cart: Value) -> Result<ApiResponse> {
        self.client.post("/cart/checkout", cart).await
    }
}
