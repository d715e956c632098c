use super::segment;
use crate::{ApiResponse, Client, Result};
use serde_json::{Value, json};
use std::fmt::Display;

/// `/orders`
///
/// Order creation is the call that most often meets a leader redirect: the
/// 307 keeps method and body, so the order is created on the leader.
pub struct OrdersApi<'a> {
    client: &'a Client,
}

impl<'a> OrdersApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, order: Value) -> Result<ApiResponse> {
        self.client.post("/orders", order).await
    }

    pub async fn list(&self) -> Result<ApiResponse> {
        self.client.get("/orders").await
    }

    pub async fn get(&self, id: impl Display) -> Result<ApiResponse> {
        self.client.get(&format!("/orders/{}", segment(id))).await
    }

    pub async fn update_status(&self, id: impl Display, status: &str) -> Result<ApiResponse> {
        self.client
            .put(
                &format!("/orders/{}/status", segment(id)),
                json!({ "status": status }),
            )
            .await
    }

    pub async fn update(&self, id: impl Display, order: Value) -> Result<ApiResponse> {
        self.client
            .put(&format!("/orders/{}", segment(id)), order)
            .await
    }

    pub async fn by_merchant(&self, merchant_id: impl Display) -> Result<ApiResponse> {
        self.client
            .get(&format!("/orders?merchant={}", segment(merchant_id)))
            .await
    }

    pub async fn by_customer(&self, customer_id: impl Display) -> Result<ApiResponse> {
        self.client
            .get(&format!("/orders?customer={}", segment(customer_id)))
            .await
    }
}
